//! CLI command implementations.

pub mod admin;
pub mod migrate;

use secrecy::SecretString;

/// Read the database URL, preferring `SITE_DATABASE_URL` over `DATABASE_URL`.
///
/// Loads `.env` first if present.
pub(crate) fn database_url() -> Result<SecretString, MissingDatabaseUrl> {
    dotenvy::dotenv().ok();

    std::env::var("SITE_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map(SecretString::from)
        .map_err(|_| MissingDatabaseUrl)
}

#[derive(Debug, thiserror::Error)]
#[error("Missing environment variable: SITE_DATABASE_URL (or DATABASE_URL)")]
pub struct MissingDatabaseUrl;
