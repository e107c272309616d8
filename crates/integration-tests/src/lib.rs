//! End-to-end tests for the portfolio site.
//!
//! # Running Tests
//!
//! ```bash
//! # Migrate a fresh database and start the site
//! cargo run -p portfolio-cli -- migrate
//! cargo run -p portfolio-site
//!
//! # Run the ignored end-to-end tests against it
//! SITE_TEST_ADMIN_EMAIL=owner@example.com \
//!     cargo test -p portfolio-integration-tests -- --ignored --test-threads=1
//! ```
//!
//! The site trusts the identity header, so these tests act as any user by
//! setting it directly. Never expose a site configured this way without the
//! authenticating proxy in front of it.
//!
//! # Environment Variables
//!
//! - `SITE_TEST_BASE_URL` - Site under test (default: `http://localhost:3000`)
//! - `SITE_TEST_ADMIN_EMAIL` - Email to bind or expect as admin
//!   (default: `owner@example.com`)
//! - `SITE_IDENTITY_HEADER` - Same header the site reads
//!   (default: `x-forwarded-email`)

#![allow(clippy::missing_panics_doc)]

use reqwest::{Client, RequestBuilder, StatusCode};

/// Shared handle for talking to the site under test.
#[derive(Debug, Clone)]
pub struct TestContext {
    pub client: Client,
    pub base_url: String,
    pub admin_email: String,
    pub identity_header: String,
}

impl TestContext {
    /// Build a context from environment variables.
    #[must_use]
    pub fn from_env() -> Self {
        let env_or = |name: &str, default: &str| {
            std::env::var(name).unwrap_or_else(|_| default.to_owned())
        };

        Self {
            client: Client::builder()
                .redirect(reqwest::redirect::Policy::none())
                .build()
                .expect("Failed to create HTTP client"),
            base_url: env_or("SITE_TEST_BASE_URL", "http://localhost:3000")
                .trim_end_matches('/')
                .to_owned(),
            admin_email: env_or("SITE_TEST_ADMIN_EMAIL", "owner@example.com"),
            identity_header: env_or("SITE_IDENTITY_HEADER", "x-forwarded-email"),
        }
    }

    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// Attach `email` as the signed-in identity.
    #[must_use]
    pub fn as_user(&self, request: RequestBuilder, email: &str) -> RequestBuilder {
        request.header(&self.identity_header, email)
    }

    #[must_use]
    pub fn as_admin(&self, request: RequestBuilder) -> RequestBuilder {
        self.as_user(request, &self.admin_email)
    }

    /// Make sure an admin is bound, binding the configured one if not.
    ///
    /// Panics if a different admin is already bound.
    pub async fn ensure_admin(&self) {
        let resp = self
            .as_admin(self.client.post(self.url("/api/admin/setup")))
            .send()
            .await
            .expect("setup request failed");

        assert!(
            resp.status() == StatusCode::CREATED || resp.status() == StatusCode::CONFLICT,
            "unexpected setup status {}",
            resp.status()
        );

        let email: serde_json::Value = self
            .client
            .get(self.url("/api/admin/email"))
            .send()
            .await
            .expect("email request failed")
            .json()
            .await
            .expect("email response is not JSON");

        assert_eq!(
            email["adminEmail"], self.admin_email,
            "site is bound to a different admin; point SITE_TEST_ADMIN_EMAIL at it"
        );
    }

    /// An email that is certainly not the admin's.
    #[must_use]
    pub fn stranger_email() -> String {
        format!("stranger-{}@example.com", uuid::Uuid::new_v4())
    }
}
