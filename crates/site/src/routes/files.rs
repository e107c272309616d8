//! Attachment upload and download.
//!
//! Uploads need no session: the single-use token in the URL, issued by
//! `POST /api/uploads` to the admin, is the credential.

use axum::{
    Json,
    body::{Body, Bytes},
    extract::{Path, State},
    http::{HeaderMap, HeaderValue, header},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tokio_util::io::ReaderStream;
use tracing::instrument;

use portfolio_core::{AttachmentId, ObjectStoreError};

use crate::error::AppError;
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub storage_id: AttachmentId,
}

/// Store the request body as a new object.
///
/// POST /uploads/{token}
#[instrument(skip_all)]
pub async fn upload(
    State(state): State<AppState>,
    Path(token): Path<String>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<UploadResponse>, AppError> {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok());

    let storage_id = state
        .objects()
        .accept_upload(&token, content_type, &body)
        .await?;

    Ok(Json(UploadResponse { storage_id }))
}

/// Stream an object with its stored content type.
///
/// GET /files/{id}
#[instrument(skip(state))]
pub async fn download(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let id: AttachmentId = id
        .parse()
        .map_err(|_| AppError::NotFound(format!("file {id}")))?;

    let (metadata, file) = match state.objects().open_object(id).await {
        Ok(found) => found,
        Err(ObjectStoreError::NotFound(_)) => {
            return Err(AppError::NotFound(format!("file {id}")));
        }
        Err(e) => return Err(e.into()),
    };

    let content_type = HeaderValue::from_str(&metadata.content_type)
        .unwrap_or_else(|_| HeaderValue::from_static("application/octet-stream"));
    let disposition = if renders_inline(&metadata.content_type) {
        "inline"
    } else {
        "attachment"
    };

    Ok((
        [
            (header::CONTENT_TYPE, content_type),
            (header::CONTENT_DISPOSITION, HeaderValue::from_static(disposition)),
            (
                header::CACHE_CONTROL,
                HeaderValue::from_static("public, max-age=31536000, immutable"),
            ),
        ],
        Body::from_stream(ReaderStream::new(file)),
    )
        .into_response())
}

/// Images and PDFs open in the browser; everything else downloads.
fn renders_inline(content_type: &str) -> bool {
    let essence = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();

    (essence.starts_with("image/") && essence != "image/svg+xml") || essence == "application/pdf"
}

#[cfg(test)]
mod tests {
    use super::renders_inline;

    #[test]
    fn test_renders_inline() {
        assert!(renders_inline("image/png"));
        assert!(renders_inline("Image/JPEG"));
        assert!(renders_inline("application/pdf; charset=binary"));
    }

    #[test]
    fn test_active_content_downloads() {
        assert!(!renders_inline("text/html"));
        assert!(!renders_inline("image/svg+xml"));
        assert!(!renders_inline("application/javascript"));
        assert!(!renders_inline(""));
    }
}
