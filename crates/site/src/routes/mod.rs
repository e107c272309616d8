//! HTTP route handlers for the site.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                                - Public portfolio page
//!
//! # Admin panel (HTML forms, redirects back to /admin)
//! GET  /admin                           - Panel, setup, sign-in or access denied
//! POST /admin/setup                     - Bind the signed-in caller as admin
//! POST /admin/profile                   - Save the profile
//! POST /admin/{collection}              - Add an item
//! POST /admin/{collection}/{id}/delete  - Delete an item
//!
//! # Admin gate API
//! GET  /api/admin/setup                 - { isSetup }
//! POST /api/admin/setup                 - Bind the signed-in caller as admin
//! GET  /api/admin/email                 - { adminEmail }
//! GET  /api/admin/access                - { isAdmin } for the caller
//!
//! # Content API
//! GET    /api/profile                   - Profile with image URLs
//! PUT    /api/profile                   - Save the profile
//! GET    /api/{collection}              - List, latest first
//! POST   /api/{collection}              - Add an item
//! DELETE /api/{collection}/{id}         - Delete an item
//! POST   /api/uploads                   - Issue an upload URL
//!
//! # Attachments
//! POST /uploads/{token}                 - Upload an object with an issued token
//! GET  /files/{id}                      - Download an object
//! ```
//!
//! `{collection}` is one of `education`, `certificates` or `achievements`.

pub mod admin;
pub mod api;
pub mod files;
pub mod public;

use axum::{
    Router,
    routing::{get, post},
};
use serde::de::DeserializeOwned;

use portfolio_core::{Achievement, Certificate, ContentKind, ContentStore, Education};

use crate::db::{AchievementRepository, CertificateRepository, EducationRepository};
use crate::error::AppError;
use crate::state::AppState;

/// A content collection as the site exposes it.
///
/// Binds a [`ContentKind`] to its repository and to the HTML form the admin
/// panel posts for it.
pub trait Collection: ContentKind {
    type Store: ContentStore<Self> + Send + Sync + 'static;

    /// URL-encoded form submitted by the admin panel.
    type Form: DeserializeOwned + Send + 'static;

    fn store(state: &AppState) -> &Self::Store;

    /// Convert a submitted form into a draft.
    ///
    /// # Errors
    ///
    /// Returns `AppError::BadRequest` if a field cannot be parsed.
    fn draft_from_form(form: Self::Form) -> Result<Self::Draft, AppError>;
}

impl Collection for Education {
    type Store = EducationRepository;
    type Form = admin::EducationForm;

    fn store(state: &AppState) -> &EducationRepository {
        state.education()
    }

    fn draft_from_form(form: Self::Form) -> Result<Self::Draft, AppError> {
        form.try_into()
    }
}

impl Collection for Certificate {
    type Store = CertificateRepository;
    type Form = admin::CertificateForm;

    fn store(state: &AppState) -> &CertificateRepository {
        state.certificates()
    }

    fn draft_from_form(form: Self::Form) -> Result<Self::Draft, AppError> {
        form.try_into()
    }
}

impl Collection for Achievement {
    type Store = AchievementRepository;
    type Form = admin::AchievementForm;

    fn store(state: &AppState) -> &AchievementRepository {
        state.achievements()
    }

    fn draft_from_form(form: Self::Form) -> Result<Self::Draft, AppError> {
        form.try_into()
    }
}

fn collection_path<K: Collection>() -> String {
    format!("/{}", K::COLLECTION)
}

/// Create the admin panel router.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(admin::panel))
        .route("/setup", post(admin::setup))
        .route("/profile", post(admin::save_profile))
        .nest(&collection_path::<Education>(), admin::collection_routes::<Education>())
        .nest(&collection_path::<Certificate>(), admin::collection_routes::<Certificate>())
        .nest(&collection_path::<Achievement>(), admin::collection_routes::<Achievement>())
}

/// Create the JSON API router.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/admin", api::admin::routes())
        .route(
            "/profile",
            get(api::content::profile).put(api::content::save_profile),
        )
        .route("/uploads", post(api::content::upload_url))
        .nest(&collection_path::<Education>(), api::content::collection_routes::<Education>())
        .nest(&collection_path::<Certificate>(), api::content::collection_routes::<Certificate>())
        .nest(&collection_path::<Achievement>(), api::content::collection_routes::<Achievement>())
}

/// Create all routes for the site.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(public::index))
        .nest("/admin", admin_routes())
        .nest("/api", api_routes())
        .route("/uploads/{token}", post(files::upload))
        .route("/files/{id}", get(files::download))
}
