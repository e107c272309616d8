//! Unified error handling for the site.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use portfolio_core::{ContentError, GateError, ObjectStoreError, StoreError};

use crate::storage::UploadError;

/// Application-level error type.
#[derive(Debug, Error)]
pub enum AppError {
    /// Content operation failed.
    #[error(transparent)]
    Content(#[from] ContentError),

    /// Admin gate rejected the request.
    #[error(transparent)]
    Gate(#[from] GateError),

    /// Document store failed.
    #[error("Database error: {0}")]
    Store(#[from] StoreError),

    /// Object store failed.
    #[error("Storage error: {0}")]
    Objects(#[from] ObjectStoreError),

    /// Direct upload was rejected.
    #[error(transparent)]
    Upload(#[from] UploadError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),
}

/// Coarse classification used for status codes and flash messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Unauthenticated,
    Forbidden,
    AlreadyConfigured,
    NotFound,
    Invalid,
    TooLarge,
    Internal,
    Upstream,
}

impl ErrorKind {
    #[must_use]
    pub const fn status(self) -> StatusCode {
        match self {
            Self::Unauthenticated => StatusCode::UNAUTHORIZED,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::AlreadyConfigured => StatusCode::CONFLICT,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Invalid => StatusCode::BAD_REQUEST,
            Self::TooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
            Self::Upstream => StatusCode::BAD_GATEWAY,
        }
    }

    /// Query-string code for `/admin?error=...` redirects.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::Unauthenticated => "unauthenticated",
            Self::Forbidden => "forbidden",
            Self::AlreadyConfigured => "already_configured",
            Self::NotFound => "not_found",
            Self::Invalid => "invalid",
            Self::TooLarge => "too_large",
            Self::Internal | Self::Upstream => "server",
        }
    }

    const fn is_server_error(self) -> bool {
        matches!(self, Self::Internal | Self::Upstream)
    }
}

fn gate_kind(err: &GateError) -> ErrorKind {
    match err {
        GateError::Unauthenticated => ErrorKind::Unauthenticated,
        GateError::PermissionDenied => ErrorKind::Forbidden,
        GateError::AlreadyConfigured => ErrorKind::AlreadyConfigured,
        GateError::Store(_) => ErrorKind::Internal,
    }
}

impl AppError {
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Content(ContentError::Access(gate)) | Self::Gate(gate) => gate_kind(gate),
            Self::Content(ContentError::NotFound { .. }) | Self::NotFound(_) => ErrorKind::NotFound,
            Self::Content(ContentError::Invalid(_)) | Self::BadRequest(_) => ErrorKind::Invalid,
            Self::Content(ContentError::Store(_)) | Self::Store(_) => ErrorKind::Internal,
            Self::Content(ContentError::Objects(_)) | Self::Objects(_) => ErrorKind::Upstream,
            Self::Upload(upload) => match upload {
                UploadError::InvalidToken => ErrorKind::NotFound,
                UploadError::Empty => ErrorKind::Invalid,
                UploadError::TooLarge { .. } => ErrorKind::TooLarge,
                UploadError::Store(_) => ErrorKind::Upstream,
            },
        }
    }
}

impl AppError {
    /// Send server errors to Sentry and the log. Client errors are only
    /// logged at debug level.
    pub fn report(&self) {
        if self.kind().is_server_error() {
            let event_id = sentry::capture_error(self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Site request error"
            );
        } else {
            tracing::debug!(error = %self, "Request rejected");
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let kind = self.kind();
        self.report();

        // Don't expose internal error details to clients
        let message = match kind {
            ErrorKind::Internal => "Internal server error".to_string(),
            ErrorKind::Upstream => "Storage service error".to_string(),
            _ => self.to_string(),
        };

        (kind.status(), message).into_response()
    }
}

/// Set the Sentry user context from the signed-in email.
pub fn set_sentry_user(email: &str) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            email: Some(email.to_owned()),
            ..Default::default()
        }));
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn get_status(err: AppError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("achievement 7".to_string());
        assert_eq!(err.to_string(), "Not found: achievement 7");

        let err = AppError::BadRequest("invalid input".to_string());
        assert_eq!(err.to_string(), "Bad request: invalid input");
    }

    #[test]
    fn test_gate_status_codes() {
        assert_eq!(
            get_status(GateError::Unauthenticated.into()),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            get_status(GateError::PermissionDenied.into()),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            get_status(GateError::AlreadyConfigured.into()),
            StatusCode::CONFLICT
        );
        assert_eq!(
            get_status(ContentError::Access(GateError::PermissionDenied).into()),
            StatusCode::FORBIDDEN
        );
    }

    #[test]
    fn test_content_status_codes() {
        assert_eq!(
            get_status(
                ContentError::NotFound {
                    collection: "education",
                    id: "3".to_string()
                }
                .into()
            ),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            get_status(ContentError::Invalid("title is required".to_string()).into()),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(ContentError::Store(StoreError::NotFound).into()),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            get_status(ContentError::Objects(ObjectStoreError::Backend("disk".into())).into()),
            StatusCode::BAD_GATEWAY
        );
    }

    #[test]
    fn test_upload_status_codes() {
        assert_eq!(
            get_status(UploadError::InvalidToken.into()),
            StatusCode::NOT_FOUND
        );
        assert_eq!(get_status(UploadError::Empty.into()), StatusCode::BAD_REQUEST);
        assert_eq!(
            get_status(UploadError::TooLarge { max: 1 }.into()),
            StatusCode::PAYLOAD_TOO_LARGE
        );
    }

    #[test]
    fn test_flash_codes() {
        assert_eq!(
            AppError::from(GateError::AlreadyConfigured).kind().code(),
            "already_configured"
        );
        assert_eq!(
            AppError::from(StoreError::Conflict).kind().code(),
            "server"
        );
    }
}
