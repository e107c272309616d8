//! Content API.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::get,
};
use serde::Serialize;
use tracing::instrument;
use url::Url;

use portfolio_core::{Listed, Profile, ProfileDraft, ProfileView};

use crate::error::AppError;
use crate::middleware::Caller;
use crate::routes::Collection;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct Created<I> {
    pub id: I,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadUrlResponse {
    pub upload_url: Url,
}

/// Routes for one collection, nested under `/api/{collection}`.
pub fn collection_routes<K: Collection>() -> Router<AppState> {
    Router::new()
        .route("/", get(list::<K>).post(create::<K>))
        .route("/{id}", axum::routing::delete(delete::<K>))
}

/// GET /api/{collection}
#[instrument(skip_all, fields(collection = K::COLLECTION))]
pub async fn list<K: Collection>(
    State(state): State<AppState>,
) -> Result<Json<Vec<Listed<K>>>, AppError> {
    let items = state.content().list::<K, _>(K::store(&state)).await?;
    Ok(Json(items))
}

/// POST /api/{collection}
#[instrument(skip_all, fields(collection = K::COLLECTION))]
pub async fn create<K: Collection>(
    State(state): State<AppState>,
    caller: Caller,
    Json(draft): Json<K::Draft>,
) -> Result<(StatusCode, Json<Created<K::Id>>), AppError> {
    let id = state
        .content()
        .add::<K, _>(caller.identity(), K::store(&state), &draft)
        .await?;
    Ok((StatusCode::CREATED, Json(Created { id })))
}

/// DELETE /api/{collection}/{id}
#[instrument(skip_all, fields(collection = K::COLLECTION, %id))]
pub async fn delete<K: Collection>(
    State(state): State<AppState>,
    caller: Caller,
    Path(id): Path<K::Id>,
) -> Result<StatusCode, AppError> {
    state
        .content()
        .remove::<K, _>(caller.identity(), K::store(&state), id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Issue a single-use upload URL.
///
/// POST /api/uploads
#[instrument(skip_all)]
pub async fn upload_url(
    State(state): State<AppState>,
    caller: Caller,
) -> Result<Json<UploadUrlResponse>, AppError> {
    let upload_url = state.content().issue_upload_url(caller.identity()).await?;
    Ok(Json(UploadUrlResponse { upload_url }))
}

/// The profile, or `null` before one has been saved.
///
/// GET /api/profile
#[instrument(skip_all)]
pub async fn profile(
    State(state): State<AppState>,
) -> Result<Json<Option<ProfileView>>, AppError> {
    let view = state.content().profile(state.profile()).await?;
    Ok(Json(view))
}

/// PUT /api/profile
#[instrument(skip_all)]
pub async fn save_profile(
    State(state): State<AppState>,
    caller: Caller,
    Json(draft): Json<ProfileDraft>,
) -> Result<Json<Profile>, AppError> {
    let saved = state
        .content()
        .save_profile(caller.identity(), state.profile(), &draft)
        .await?;
    Ok(Json(saved))
}
