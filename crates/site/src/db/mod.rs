//! Database operations for the portfolio `PostgreSQL` database.
//!
//! ## Tables
//!
//! - `admin_settings` - The single admin binding (at most one row)
//! - `profile` - The single profile (at most one row)
//! - `education`, `certificate`, `achievement` - Content collections
//!
//! # Migrations
//!
//! Migrations are stored in `crates/site/migrations/` and run via:
//! ```bash
//! cargo run -p portfolio-cli -- migrate
//! ```
//!
//! Each repository owns a clone of the pool and implements one of the storage
//! traits from `portfolio-core`.

pub mod achievements;
pub mod admin_settings;
pub mod certificates;
pub mod education;
pub mod profile;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use portfolio_core::StoreError;

pub use achievements::AchievementRepository;
pub use admin_settings::AdminSettingsRepository;
pub use certificates::CertificateRepository;
pub use education::EducationRepository;
pub use profile::ProfileRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., a second admin binding).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

impl From<RepositoryError> for StoreError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::Database(sqlx::Error::Database(db_err))
                if db_err.is_unique_violation() =>
            {
                Self::Conflict
            }
            RepositoryError::Conflict(_) => Self::Conflict,
            RepositoryError::NotFound => Self::NotFound,
            RepositoryError::DataCorruption(detail) => Self::DataCorruption(detail),
            RepositoryError::Database(e) => Self::Backend(Box::new(e)),
        }
    }
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// Parse an optional stored URL column.
fn parse_stored_url(column: &str, raw: Option<String>) -> Result<Option<url::Url>, RepositoryError> {
    raw.map(|value| {
        url::Url::parse(&value).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid {column} in database: {e}"))
        })
    })
    .transpose()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_repository_error_mapping() {
        assert!(matches!(
            StoreError::from(RepositoryError::NotFound),
            StoreError::NotFound
        ));
        assert!(matches!(
            StoreError::from(RepositoryError::Conflict("admin".to_string())),
            StoreError::Conflict
        ));
        assert!(matches!(
            StoreError::from(RepositoryError::DataCorruption("bad".to_string())),
            StoreError::DataCorruption(_)
        ));
        assert!(matches!(
            StoreError::from(RepositoryError::Database(sqlx::Error::RowNotFound)),
            StoreError::Backend(_)
        ));
    }

    #[test]
    fn test_parse_stored_url() {
        assert_eq!(parse_stored_url("url", None).unwrap(), None);
        assert!(parse_stored_url("url", Some("https://example.com".into()))
            .unwrap()
            .is_some());
        assert!(matches!(
            parse_stored_url("url", Some("not a url".into())),
            Err(RepositoryError::DataCorruption(_))
        ));
    }
}
