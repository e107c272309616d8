//! Caller identity extractor.
//!
//! Sign-in is handled by the identity-aware proxy in front of the site. The
//! proxy strips any client-supplied copy of the identity header and sets it to
//! the verified email of the signed-in user. The site only reads it.

use std::convert::Infallible;

use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, HeaderName, request::Parts},
};
use tracing::Span;

use portfolio_core::{Email, Identity};

use crate::error::set_sentry_user;
use crate::state::AppState;

/// The signed-in caller, if any.
///
/// Never rejects: a missing, empty or malformed header yields an anonymous
/// caller and the admin gate decides what that means.
///
/// ```rust,ignore
/// async fn handler(Caller(caller): Caller) -> impl IntoResponse {
///     match caller {
///         Some(identity) => format!("Signed in as {}", identity.email()),
///         None => "Anonymous".to_string(),
///     }
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Caller(pub Option<Identity>);

impl Caller {
    #[must_use]
    pub const fn identity(&self) -> Option<&Identity> {
        self.0.as_ref()
    }
}

impl FromRequestParts<AppState> for Caller {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let identity = identity_from_headers(&parts.headers, &state.config().identity_header);

        if let Some(identity) = &identity {
            Span::current().record("user_email", identity.email().as_str());
            set_sentry_user(identity.email().as_str());
        }

        Ok(Self(identity))
    }
}

/// Read the caller's email from the trusted identity header.
#[must_use]
pub fn identity_from_headers(headers: &HeaderMap, header: &HeaderName) -> Option<Identity> {
    let raw = headers.get(header)?.to_str().ok()?.trim();
    if raw.is_empty() {
        return None;
    }

    match Email::parse(raw) {
        Ok(email) => Some(Identity::new(email)),
        Err(e) => {
            tracing::warn!(error = %e, "Ignoring malformed identity header");
            None
        }
    }
}
