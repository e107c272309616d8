//! Education repository.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use portfolio_core::{
    AttachmentId, ContentStore, Education, EducationId, NewEducation, StoreError,
};

use super::RepositoryError;

#[derive(Debug, sqlx::FromRow)]
struct EducationRow {
    id: i32,
    school: String,
    degree: String,
    field: String,
    start_date: String,
    end_date: Option<String>,
    description: String,
    location: String,
    attachment_id: Option<Uuid>,
    created_at: DateTime<Utc>,
}

impl From<EducationRow> for Education {
    fn from(row: EducationRow) -> Self {
        Self {
            id: EducationId::new(row.id),
            school: row.school,
            degree: row.degree,
            field: row.field,
            start_date: row.start_date,
            end_date: row.end_date,
            description: row.description,
            location: row.location,
            attachment_id: row.attachment_id.map(AttachmentId::from_uuid),
            created_at: row.created_at,
        }
    }
}

/// Repository for education entries.
#[derive(Debug, Clone)]
pub struct EducationRepository {
    pool: PgPool,
}

impl EducationRepository {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// List entries, latest start date first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<Education>, RepositoryError> {
        let rows = sqlx::query_as::<_, EducationRow>(
            r"
            SELECT id, school, degree, field, start_date, end_date,
                   description, location, attachment_id, created_at
            FROM education
            ORDER BY start_date DESC, id DESC
            ",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Get an entry by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(&self, id: EducationId) -> Result<Option<Education>, RepositoryError> {
        let row = sqlx::query_as::<_, EducationRow>(
            r"
            SELECT id, school, degree, field, start_date, end_date,
                   description, location, attachment_id, created_at
            FROM education
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    /// Insert an entry.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn create(&self, draft: &NewEducation) -> Result<EducationId, RepositoryError> {
        let id: i32 = sqlx::query_scalar(
            r"
            INSERT INTO education
                (school, degree, field, start_date, end_date, description, location, attachment_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING id
            ",
        )
        .bind(&draft.school)
        .bind(&draft.degree)
        .bind(&draft.field)
        .bind(&draft.start_date)
        .bind(draft.end_date.as_deref())
        .bind(&draft.description)
        .bind(&draft.location)
        .bind(draft.attachment_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(EducationId::new(id))
    }

    /// Delete an entry. Returns `false` if it did not exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete_by_id(&self, id: EducationId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM education WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

impl ContentStore<Education> for EducationRepository {
    async fn list_newest_first(&self) -> Result<Vec<Education>, StoreError> {
        Ok(self.list().await?)
    }

    async fn insert(&self, draft: &NewEducation) -> Result<EducationId, StoreError> {
        Ok(self.create(draft).await?)
    }

    async fn get(&self, id: EducationId) -> Result<Option<Education>, StoreError> {
        Ok(self.get_by_id(id).await?)
    }

    async fn delete(&self, id: EducationId) -> Result<bool, StoreError> {
        Ok(self.delete_by_id(id).await?)
    }
}
