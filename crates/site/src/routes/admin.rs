//! Admin panel routes.
//!
//! Server-rendered pages and plain HTML form posts. Every post redirects back
//! to `/admin` with a `success` or `error` code in the query string. File
//! inputs are handled by `static/admin.js`, which uploads the file first and
//! fills in the hidden attachment field.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    routing::post,
};
use serde::Deserialize;
use tracing::instrument;
use url::Url;

use portfolio_core::{
    Achievement, AttachmentId, Certificate, Education, Email, GateError, ImageUpdate, Listed,
    NewAchievement, NewCertificate, NewEducation, ProfileDraft, ProfileLink, ProfileView,
};

use super::Collection;
use crate::error::AppError;
use crate::filters;
use crate::middleware::Caller;
use crate::state::AppState;

// =============================================================================
// Templates
// =============================================================================

/// The admin panel.
#[derive(Template, WebTemplate)]
#[template(path = "admin/panel.html")]
pub struct PanelTemplate {
    pub admin_email: String,
    pub profile: ProfileFields,
    pub profile_image_url: Option<String>,
    pub banner_image_url: Option<String>,
    pub education: Vec<Listed<Education>>,
    pub certificates: Vec<Listed<Certificate>>,
    pub achievements: Vec<Listed<Achievement>>,
    pub max_upload_bytes: usize,
    pub success_message: Option<String>,
    pub error_message: Option<String>,
}

/// Current profile values for pre-filling the profile form.
#[derive(Debug, Default)]
pub struct ProfileFields {
    pub name: String,
    pub title: String,
    pub bio: String,
    pub email: String,
    pub phone: String,
    pub location: String,
    pub website: String,
    pub profile_image: String,
    pub banner_image: String,
    /// `Platform | URL` lines.
    pub links: String,
}

impl From<&ProfileView> for ProfileFields {
    fn from(view: &ProfileView) -> Self {
        let profile = &view.profile;
        let text = |value: Option<String>| value.unwrap_or_default();

        Self {
            name: profile.name.clone(),
            title: profile.title.clone(),
            bio: profile.bio.clone(),
            email: profile.email.to_string(),
            phone: text(profile.phone.clone()),
            location: text(profile.location.clone()),
            website: text(profile.website.as_ref().map(Url::to_string)),
            profile_image: text(profile.profile_image.map(|id| id.to_string())),
            banner_image: text(profile.banner_image.map(|id| id.to_string())),
            links: format_links(&profile.links),
        }
    }
}

/// First visit by a signed-in user before any admin is bound.
#[derive(Template, WebTemplate)]
#[template(path = "admin/setup.html")]
pub struct SetupTemplate {
    pub email: String,
    pub error_message: Option<String>,
}

/// Anonymous visitor.
#[derive(Template, WebTemplate)]
#[template(path = "admin/signin.html")]
pub struct SignInTemplate {
    pub sign_in_url: Option<String>,
    /// Which account to sign in with, once an admin is bound.
    pub admin_email: Option<String>,
}

/// Signed in, but not as the admin.
#[derive(Template, WebTemplate)]
#[template(path = "admin/denied.html")]
pub struct DeniedTemplate {
    pub email: String,
}

// =============================================================================
// Query Parameters
// =============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct MessageQuery {
    pub success: Option<String>,
    pub error: Option<String>,
}

fn success_message(code: &str) -> String {
    match code {
        "admin_configured" => "You are now the administrator of this site.".to_owned(),
        "profile_saved" => "Profile saved.".to_owned(),
        "item_added" => "Item added.".to_owned(),
        "item_deleted" => "Item deleted.".to_owned(),
        _ => "Changes saved.".to_owned(),
    }
}

fn error_message(code: &str) -> String {
    match code {
        "unauthenticated" => "Sign in to continue.".to_owned(),
        "forbidden" => "Access denied. This account is not authorized as admin.".to_owned(),
        "already_configured" => "An administrator has already been set up.".to_owned(),
        "not_found" => "That item no longer exists.".to_owned(),
        "invalid" => "Some fields are missing or malformed.".to_owned(),
        "too_large" => "The file is too large.".to_owned(),
        _ => "Something went wrong. Please try again.".to_owned(),
    }
}

fn redirect_success(code: &str) -> Redirect {
    Redirect::to(&format!("/admin?success={code}"))
}

fn redirect_error(err: &AppError) -> Redirect {
    err.report();
    Redirect::to(&format!("/admin?error={}", err.kind().code()))
}

// =============================================================================
// Forms
// =============================================================================

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}

fn parse_attachment(raw: Option<&str>) -> Result<Option<AttachmentId>, AppError> {
    AttachmentId::parse_optional(raw).map_err(|e| AppError::BadRequest(e.to_string()))
}

/// A missing image field keeps the stored image, a blank one clears it.
fn parse_image_update(raw: Option<&str>) -> Result<ImageUpdate, AppError> {
    match raw {
        None => Ok(ImageUpdate::Keep),
        Some(raw) => parse_attachment(Some(raw)).map(ImageUpdate::from),
    }
}

fn parse_optional_url(field: &str, raw: Option<String>) -> Result<Option<Url>, AppError> {
    non_blank(raw)
        .map(|raw| {
            Url::parse(&raw).map_err(|e| AppError::BadRequest(format!("{field}: {e}")))
        })
        .transpose()
}

/// Parse the profile links textarea: one `Platform | URL` per line.
///
/// # Errors
///
/// Returns `AppError::BadRequest` for a line without a separator or with an
/// invalid URL.
pub fn parse_links(raw: &str) -> Result<Vec<ProfileLink>, AppError> {
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| {
            let (platform, url) = line.split_once('|').ok_or_else(|| {
                AppError::BadRequest(format!("link must look like \"Platform | URL\": {line}"))
            })?;
            let url = Url::parse(url.trim())
                .map_err(|e| AppError::BadRequest(format!("link {}: {e}", platform.trim())))?;
            Ok(ProfileLink {
                platform: platform.trim().to_owned(),
                url,
            })
        })
        .collect()
}

/// Inverse of [`parse_links`], for pre-filling the textarea.
#[must_use]
pub fn format_links(links: &[ProfileLink]) -> String {
    links
        .iter()
        .map(|link| format!("{} | {}", link.platform, link.url))
        .collect::<Vec<_>>()
        .join("\n")
}

#[derive(Debug, Deserialize)]
pub struct EducationForm {
    #[serde(default)]
    pub school: String,
    #[serde(default)]
    pub degree: String,
    #[serde(default)]
    pub field: String,
    #[serde(default)]
    pub start_date: String,
    pub end_date: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub location: String,
    pub attachment_id: Option<String>,
}

impl TryFrom<EducationForm> for NewEducation {
    type Error = AppError;

    fn try_from(form: EducationForm) -> Result<Self, Self::Error> {
        Ok(Self {
            attachment_id: parse_attachment(form.attachment_id.as_deref())?,
            school: form.school.trim().to_owned(),
            degree: form.degree.trim().to_owned(),
            field: form.field.trim().to_owned(),
            start_date: form.start_date.trim().to_owned(),
            end_date: non_blank(form.end_date),
            description: form.description.trim().to_owned(),
            location: form.location.trim().to_owned(),
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct CertificateForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub issuer: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub description: String,
    pub url: Option<String>,
    pub attachment_id: Option<String>,
}

impl TryFrom<CertificateForm> for NewCertificate {
    type Error = AppError;

    fn try_from(form: CertificateForm) -> Result<Self, Self::Error> {
        Ok(Self {
            attachment_id: parse_attachment(form.attachment_id.as_deref())?,
            url: parse_optional_url("url", form.url)?,
            name: form.name.trim().to_owned(),
            issuer: form.issuer.trim().to_owned(),
            date: form.date.trim().to_owned(),
            description: form.description.trim().to_owned(),
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct AchievementForm {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub description: String,
    pub attachment_id: Option<String>,
}

impl TryFrom<AchievementForm> for NewAchievement {
    type Error = AppError;

    fn try_from(form: AchievementForm) -> Result<Self, Self::Error> {
        Ok(Self {
            attachment_id: parse_attachment(form.attachment_id.as_deref())?,
            title: form.title.trim().to_owned(),
            date: form.date.trim().to_owned(),
            description: form.description.trim().to_owned(),
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct ProfileForm {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub bio: String,
    #[serde(default)]
    pub email: String,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub website: Option<String>,
    pub profile_image: Option<String>,
    pub banner_image: Option<String>,
    #[serde(default)]
    pub links: String,
}

impl TryFrom<ProfileForm> for ProfileDraft {
    type Error = AppError;

    fn try_from(form: ProfileForm) -> Result<Self, Self::Error> {
        let email = Email::parse(form.email.trim())
            .map_err(|e| AppError::BadRequest(format!("email: {e}")))?;

        Ok(Self {
            email,
            website: parse_optional_url("website", form.website)?,
            profile_image: parse_image_update(form.profile_image.as_deref())?,
            banner_image: parse_image_update(form.banner_image.as_deref())?,
            links: parse_links(&form.links)?,
            name: form.name.trim().to_owned(),
            title: form.title.trim().to_owned(),
            bio: form.bio.trim().to_owned(),
            phone: non_blank(form.phone),
            location: non_blank(form.location),
        })
    }
}

// =============================================================================
// Router
// =============================================================================

/// Form posts for one collection, nested under `/admin/{collection}`.
pub fn collection_routes<K: Collection>() -> Router<AppState> {
    Router::new()
        .route("/", post(create::<K>))
        .route("/{id}/delete", post(delete::<K>))
}

// =============================================================================
// Pages
// =============================================================================

/// Render whichever admin page fits the caller.
///
/// GET /admin
#[instrument(skip_all)]
pub async fn panel(
    State(state): State<AppState>,
    caller: Caller,
    Query(params): Query<MessageQuery>,
) -> Result<Response, AppError> {
    let gate = state.gate();
    let sign_in_url = state.config().sign_in_url.as_ref().map(Url::to_string);
    let admin_email = gate.admin_email().await?;

    let Some(identity) = caller.identity() else {
        return Ok(SignInTemplate {
            sign_in_url,
            admin_email: admin_email.map(Email::into_inner),
        }
        .into_response());
    };

    let Some(admin_email) = admin_email else {
        return Ok(SetupTemplate {
            email: identity.email().to_string(),
            error_message: params.error.as_deref().map(error_message),
        }
        .into_response());
    };

    if !gate.validate_admin_access(Some(identity)).await? {
        let page = DeniedTemplate {
            email: identity.email().to_string(),
        };
        return Ok((StatusCode::FORBIDDEN, page).into_response());
    }

    let content = state.content();
    let (profile, education, certificates, achievements) = tokio::try_join!(
        content.profile(state.profile()),
        content.list::<Education, _>(state.education()),
        content.list::<Certificate, _>(state.certificates()),
        content.list::<Achievement, _>(state.achievements()),
    )?;

    Ok(PanelTemplate {
        admin_email: admin_email.into_inner(),
        profile_image_url: profile
            .as_ref()
            .and_then(|v| v.profile_image_url.as_ref().map(Url::to_string)),
        banner_image_url: profile
            .as_ref()
            .and_then(|v| v.banner_image_url.as_ref().map(Url::to_string)),
        profile: profile.as_ref().map(ProfileFields::from).unwrap_or_default(),
        education,
        certificates,
        achievements,
        max_upload_bytes: state.objects().max_upload_bytes(),
        success_message: params.success.as_deref().map(success_message),
        error_message: params.error.as_deref().map(error_message),
    }
    .into_response())
}

// =============================================================================
// Actions
// =============================================================================

/// Bind the signed-in caller as administrator.
///
/// POST /admin/setup
#[instrument(skip_all)]
pub async fn setup(State(state): State<AppState>, caller: Caller) -> Redirect {
    let Some(identity) = caller.identity() else {
        return redirect_error(&GateError::Unauthenticated.into());
    };

    match state.gate().setup_admin(identity.email()).await {
        Ok(_) => redirect_success("admin_configured"),
        Err(e) => redirect_error(&e.into()),
    }
}

/// Save the profile.
///
/// POST /admin/profile
#[instrument(skip_all)]
pub async fn save_profile(
    State(state): State<AppState>,
    caller: Caller,
    Form(form): Form<ProfileForm>,
) -> Redirect {
    let result = async {
        let draft = ProfileDraft::try_from(form)?;
        state
            .content()
            .save_profile(caller.identity(), state.profile(), &draft)
            .await?;
        Ok::<_, AppError>(())
    }
    .await;

    match result {
        Ok(()) => redirect_success("profile_saved"),
        Err(e) => redirect_error(&e),
    }
}

/// Add an item to a collection.
///
/// POST /admin/{collection}
#[instrument(skip_all, fields(collection = K::COLLECTION))]
pub async fn create<K: Collection>(
    State(state): State<AppState>,
    caller: Caller,
    Form(form): Form<K::Form>,
) -> Redirect {
    let result = async {
        let draft = K::draft_from_form(form)?;
        state
            .content()
            .add::<K, _>(caller.identity(), K::store(&state), &draft)
            .await?;
        Ok::<_, AppError>(())
    }
    .await;

    match result {
        Ok(()) => redirect_success("item_added"),
        Err(e) => redirect_error(&e),
    }
}

/// Delete an item and its attachment.
///
/// POST /admin/{collection}/{id}/delete
#[instrument(skip_all, fields(collection = K::COLLECTION, %id))]
pub async fn delete<K: Collection>(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<K::Id>,
) -> Redirect {
    match state
        .content()
        .remove::<K, _>(caller.identity(), K::store(&state), id)
        .await
    {
        Ok(_) => redirect_success("item_deleted"),
        Err(e) => redirect_error(&e.into()),
    }
}
