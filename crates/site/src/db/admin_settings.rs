//! Admin settings repository.
//!
//! The table holds at most one row. Creation relies on the singleton primary
//! key: `ON CONFLICT DO NOTHING RETURNING` yields no row when a binding already
//! exists, so concurrent setups cannot both succeed.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use portfolio_core::{AdminSettings, AdminSettingsStore, Email, StoreError};

use super::RepositoryError;

#[derive(Debug, sqlx::FromRow)]
struct AdminSettingsRow {
    is_setup: bool,
    admin_email: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<AdminSettingsRow> for AdminSettings {
    type Error = RepositoryError;

    fn try_from(row: AdminSettingsRow) -> Result<Self, Self::Error> {
        let admin_email = Email::parse(&row.admin_email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid admin email in database: {e}"))
        })?;

        Ok(Self {
            is_setup: row.is_setup,
            admin_email,
            created_at: row.created_at,
        })
    }
}

/// Repository for the admin binding.
#[derive(Debug, Clone)]
pub struct AdminSettingsRepository {
    pool: PgPool,
}

impl AdminSettingsRepository {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Load the binding, if any.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the stored email is invalid.
    pub async fn get(&self) -> Result<Option<AdminSettings>, RepositoryError> {
        let row = sqlx::query_as::<_, AdminSettingsRow>(
            r"
            SELECT is_setup, admin_email, created_at
            FROM admin_settings
            ",
        )
        .fetch_optional(&self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Insert the binding unless one exists.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if a binding already exists.
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn insert(&self, email: &Email) -> Result<AdminSettings, RepositoryError> {
        let row = sqlx::query_as::<_, AdminSettingsRow>(
            r"
            INSERT INTO admin_settings (is_setup, admin_email)
            VALUES (TRUE, $1)
            ON CONFLICT (singleton) DO NOTHING
            RETURNING is_setup, admin_email, created_at
            ",
        )
        .bind(email.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.ok_or_else(|| RepositoryError::Conflict("admin already configured".to_string()))?
            .try_into()
    }
}

impl AdminSettingsStore for AdminSettingsRepository {
    async fn load(&self) -> Result<Option<AdminSettings>, StoreError> {
        Ok(self.get().await?)
    }

    async fn create(&self, email: &Email) -> Result<AdminSettings, StoreError> {
        Ok(self.insert(email).await?)
    }
}
