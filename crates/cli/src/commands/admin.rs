//! Admin binding commands.
//!
//! These go through the same [`AdminGate`] as the site, so `setup` is still
//! first-writer-wins: it fails if the admin was already bound from the web.
//!
//! # Environment Variables
//!
//! - `SITE_DATABASE_URL` (or `DATABASE_URL`) - `PostgreSQL` connection string

use secrecy::ExposeSecret;
use sqlx::PgPool;
use thiserror::Error;

use portfolio_core::{AdminGate, Email, EmailError, GateError, StoreError};
use portfolio_site::db::AdminSettingsRepository;

use super::{MissingDatabaseUrl, database_url};

/// Errors that can occur during admin operations.
#[derive(Debug, Error)]
pub enum AdminError {
    #[error(transparent)]
    MissingEnvVar(#[from] MissingDatabaseUrl),

    #[error("Database connection error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    #[error(transparent)]
    Gate(#[from] GateError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

async fn gate() -> Result<AdminGate<AdminSettingsRepository>, AdminError> {
    let database_url = database_url()?;

    tracing::info!("Connecting to database...");
    let pool = PgPool::connect(database_url.expose_secret()).await?;

    Ok(AdminGate::new(AdminSettingsRepository::new(pool)))
}

/// Report whether an admin is bound.
///
/// # Errors
///
/// Returns an error if the database cannot be reached.
pub async fn status() -> Result<(), AdminError> {
    let gate = gate().await?;

    match gate.admin_email().await? {
        Some(email) => tracing::info!("Admin is set up: {}", email),
        None => tracing::info!("No admin yet. The first signed-in visitor to /admin can claim it."),
    }

    Ok(())
}

/// Bind `email` as the admin.
///
/// # Errors
///
/// Returns `AdminError::Gate(GateError::AlreadyConfigured)` if an admin is
/// already bound.
pub async fn setup(email: &str) -> Result<(), AdminError> {
    let email = Email::parse(email.trim())?;
    let gate = gate().await?;

    let settings = gate.setup_admin(&email).await?;
    tracing::info!(
        "Admin bound: {} (at {})",
        settings.admin_email,
        settings.created_at
    );

    Ok(())
}
