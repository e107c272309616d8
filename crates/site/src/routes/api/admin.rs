//! Admin gate API.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::get,
};
use serde::Serialize;
use tracing::instrument;

use portfolio_core::{AdminSettings, Email, GateError};

use crate::error::AppError;
use crate::middleware::Caller;
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SetupStatus {
    pub is_setup: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminEmailResponse {
    pub admin_email: Option<Email>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccessResponse {
    pub is_admin: bool,
}

/// Routes nested under `/api/admin`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/setup", get(is_setup).post(setup_admin))
        .route("/email", get(admin_email))
        .route("/access", get(validate_access))
}

/// GET /api/admin/setup
#[instrument(skip_all)]
async fn is_setup(State(state): State<AppState>) -> Result<Json<SetupStatus>, AppError> {
    let is_setup = state.gate().is_setup().await?;
    Ok(Json(SetupStatus { is_setup }))
}

/// Bind the signed-in caller as administrator. Only the first call succeeds.
///
/// POST /api/admin/setup
#[instrument(skip_all)]
async fn setup_admin(
    State(state): State<AppState>,
    caller: Caller,
) -> Result<(StatusCode, Json<AdminSettings>), AppError> {
    let identity = caller.identity().ok_or(GateError::Unauthenticated)?;
    let settings = state.gate().setup_admin(identity.email()).await?;
    Ok((StatusCode::CREATED, Json(settings)))
}

/// GET /api/admin/email
#[instrument(skip_all)]
async fn admin_email(
    State(state): State<AppState>,
) -> Result<Json<AdminEmailResponse>, AppError> {
    let admin_email = state.gate().admin_email().await?;
    Ok(Json(AdminEmailResponse { admin_email }))
}

/// Whether the caller is the administrator. Anonymous callers get `false`.
///
/// GET /api/admin/access
#[instrument(skip_all)]
async fn validate_access(
    State(state): State<AppState>,
    caller: Caller,
) -> Result<Json<AccessResponse>, AppError> {
    let is_admin = state
        .gate()
        .validate_admin_access(caller.identity())
        .await?;
    Ok(Json(AccessResponse { is_admin }))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_response_shapes() {
        let json = serde_json::to_value(SetupStatus { is_setup: true }).unwrap();
        assert_eq!(json, serde_json::json!({ "isSetup": true }));

        let json = serde_json::to_value(AdminEmailResponse { admin_email: None }).unwrap();
        assert_eq!(json, serde_json::json!({ "adminEmail": null }));

        let json = serde_json::to_value(AccessResponse { is_admin: false }).unwrap();
        assert_eq!(json, serde_json::json!({ "isAdmin": false }));
    }
}
