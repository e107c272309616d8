//! Achievement repository.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use portfolio_core::{
    Achievement, AchievementId, AttachmentId, ContentStore, NewAchievement, StoreError,
};

use super::RepositoryError;

#[derive(Debug, sqlx::FromRow)]
struct AchievementRow {
    id: i32,
    title: String,
    date: String,
    description: String,
    attachment_id: Option<Uuid>,
    created_at: DateTime<Utc>,
}

impl From<AchievementRow> for Achievement {
    fn from(row: AchievementRow) -> Self {
        Self {
            id: AchievementId::new(row.id),
            title: row.title,
            date: row.date,
            description: row.description,
            attachment_id: row.attachment_id.map(AttachmentId::from_uuid),
            created_at: row.created_at,
        }
    }
}

/// Repository for achievements.
#[derive(Debug, Clone)]
pub struct AchievementRepository {
    pool: PgPool,
}

impl AchievementRepository {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// List achievements, latest date first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list(&self) -> Result<Vec<Achievement>, RepositoryError> {
        let rows = sqlx::query_as::<_, AchievementRow>(
            r"
            SELECT id, title, date, description, attachment_id, created_at
            FROM achievement
            ORDER BY date DESC, id DESC
            ",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Get an achievement by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_by_id(
        &self,
        id: AchievementId,
    ) -> Result<Option<Achievement>, RepositoryError> {
        let row = sqlx::query_as::<_, AchievementRow>(
            r"
            SELECT id, title, date, description, attachment_id, created_at
            FROM achievement
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    /// Insert an achievement.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn create(&self, draft: &NewAchievement) -> Result<AchievementId, RepositoryError> {
        let id: i32 = sqlx::query_scalar(
            r"
            INSERT INTO achievement (title, date, description, attachment_id)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            ",
        )
        .bind(&draft.title)
        .bind(&draft.date)
        .bind(&draft.description)
        .bind(draft.attachment_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(AchievementId::new(id))
    }

    /// Delete an achievement. Returns `false` if it did not exist.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn delete_by_id(&self, id: AchievementId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM achievement WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

impl ContentStore<Achievement> for AchievementRepository {
    async fn list_newest_first(&self) -> Result<Vec<Achievement>, StoreError> {
        Ok(self.list().await?)
    }

    async fn insert(&self, draft: &NewAchievement) -> Result<AchievementId, StoreError> {
        Ok(self.create(draft).await?)
    }

    async fn get(&self, id: AchievementId) -> Result<Option<Achievement>, StoreError> {
        Ok(self.get_by_id(id).await?)
    }

    async fn delete(&self, id: AchievementId) -> Result<bool, StoreError> {
        Ok(self.delete_by_id(id).await?)
    }
}
