//! Public portfolio page.

use askama::Template;
use askama_web::WebTemplate;
use axum::extract::State;
use tracing::instrument;

use portfolio_core::{Achievement, Certificate, Education, Listed, ProfileView};

use crate::error::AppError;
use crate::filters;
use crate::middleware::Caller;
use crate::state::AppState;

/// Everything a visitor sees, newest first.
#[derive(Template, WebTemplate)]
#[template(path = "public/index.html")]
pub struct IndexTemplate {
    pub profile: Option<ProfileView>,
    pub education: Vec<Listed<Education>>,
    pub certificates: Vec<Listed<Certificate>>,
    pub achievements: Vec<Listed<Achievement>>,
    /// Show the link to the admin panel.
    pub is_admin: bool,
}

impl IndexTemplate {
    /// Nothing has been published yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.profile.is_none()
            && self.education.is_empty()
            && self.certificates.is_empty()
            && self.achievements.is_empty()
    }
}

/// Render the portfolio.
///
/// GET /
#[instrument(skip_all)]
pub async fn index(
    State(state): State<AppState>,
    caller: Caller,
) -> Result<IndexTemplate, AppError> {
    let content = state.content();

    let (profile, education, certificates, achievements, is_admin) = tokio::try_join!(
        async { content.profile(state.profile()).await.map_err(AppError::from) },
        async { content.list::<Education, _>(state.education()).await.map_err(AppError::from) },
        async { content.list::<Certificate, _>(state.certificates()).await.map_err(AppError::from) },
        async { content.list::<Achievement, _>(state.achievements()).await.map_err(AppError::from) },
        async {
            state
                .gate()
                .validate_admin_access(caller.identity())
                .await
                .map_err(AppError::from)
        },
    )?;

    Ok(IndexTemplate {
        profile,
        education,
        certificates,
        achievements,
        is_admin,
    })
}
