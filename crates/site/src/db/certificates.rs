//! Certificate repository.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use portfolio_core::{
    AttachmentId, Certificate, CertificateId, ContentStore, NewCertificate, StoreError,
};

use super::{RepositoryError, parse_stored_url};

#[derive(Debug, sqlx::FromRow)]
struct CertificateRow {
    id: i32,
    name: String,
    issuer: String,
    date: String,
    description: String,
    url: Option<String>,
    attachment_id: Option<Uuid>,
    created_at: DateTime<Utc>,
}

impl TryFrom<CertificateRow> for Certificate {
    type Error = RepositoryError;

    fn try_from(row: CertificateRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: CertificateId::new(row.id),
            name: row.name,
            issuer: row.issuer,
            date: row.date,
            description: row.description,
            url: parse_stored_url("certificate url", row.url)?,
            attachment_id: row.attachment_id.map(AttachmentId::from_uuid),
            created_at: row.created_at,
        })
    }
}

/// Repository for certificates.
#[derive(Debug, Clone)]
pub struct CertificateRepository {
    pool: PgPool,
}

impl CertificateRepository {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// List certificates, latest date first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if a stored URL is invalid.
    pub async fn list(&self) -> Result<Vec<Certificate>, RepositoryError> {
        let rows = sqlx::query_as::<_, CertificateRow>(
            r"
            SELECT id, name, issuer, date, description, url, attachment_id, created_at
            FROM certificate
            ORDER BY date DESC, id DESC
            ",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// Get a certificate by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the stored URL is invalid.
    pub async fn get_by_id(
        &self,
        id: CertificateId,
    ) -> Result<Option<Certificate>, RepositoryError> {
        let row = sqlx::query_as::<_, CertificateRow>(
            r"
            SELECT id, name, issuer, date, description, url, attachment_id, created_at
            FROM certificate
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Insert a certificate.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn create(&self, draft: &NewCertificate) -> Result<CertificateId, RepositoryError> {
        let id: i32 = sqlx::query_scalar(
            r"
            INSERT INTO certificate (name, issuer, date, description, url, attachment_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id
            ",
        )
        .bind(&draft.name)
        .bind(&draft.issuer)
        .bind(&draft.date)
        .bind(&draft.description)
        .bind(draft.url.as_ref().map(url::Url::as_str))
        .bind(draft.attachment_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(CertificateId::new(id))
    }

    /// Delete a certificate. Returns `false` if it did not exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete_by_id(&self, id: CertificateId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM certificate WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

impl ContentStore<Certificate> for CertificateRepository {
    async fn list_newest_first(&self) -> Result<Vec<Certificate>, StoreError> {
        Ok(self.list().await?)
    }

    async fn insert(&self, draft: &NewCertificate) -> Result<CertificateId, StoreError> {
        Ok(self.create(draft).await?)
    }

    async fn get(&self, id: CertificateId) -> Result<Option<Certificate>, StoreError> {
        Ok(self.get_by_id(id).await?)
    }

    async fn delete(&self, id: CertificateId) -> Result<bool, StoreError> {
        Ok(self.delete_by_id(id).await?)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn row(url: Option<&str>) -> CertificateRow {
        CertificateRow {
            id: 4,
            name: "Rust Fundamentals".to_string(),
            issuer: "Example Academy".to_string(),
            date: "2024-03".to_string(),
            description: String::new(),
            url: url.map(String::from),
            attachment_id: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_row_conversion() {
        let cert = Certificate::try_from(row(Some("https://verify.example.com/abc"))).unwrap();
        assert_eq!(cert.id, CertificateId::new(4));
        assert_eq!(
            cert.url.unwrap().as_str(),
            "https://verify.example.com/abc"
        );
    }

    #[test]
    fn test_row_with_corrupt_url() {
        assert!(matches!(
            Certificate::try_from(row(Some("::nope"))),
            Err(RepositoryError::DataCorruption(_))
        ));
    }
}
