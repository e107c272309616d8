//! Profile repository.
//!
//! The profile is a single row. Image slots are resolved by the caller, so
//! every save writes the whole row.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use sqlx::types::Json;
use uuid::Uuid;

use portfolio_core::{
    AttachmentId, Email, Profile, ProfileDraft, ProfileImages, ProfileLink, ProfileStore,
    StoreError,
};

use super::{RepositoryError, parse_stored_url};

#[derive(Debug, sqlx::FromRow)]
struct ProfileRow {
    name: String,
    title: String,
    bio: String,
    email: String,
    phone: Option<String>,
    location: Option<String>,
    website: Option<String>,
    profile_image: Option<Uuid>,
    banner_image: Option<Uuid>,
    links: Json<Vec<ProfileLink>>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<ProfileRow> for Profile {
    type Error = RepositoryError;

    fn try_from(row: ProfileRow) -> Result<Self, Self::Error> {
        let email = Email::parse(&row.email).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid profile email in database: {e}"))
        })?;

        Ok(Self {
            name: row.name,
            title: row.title,
            bio: row.bio,
            email,
            phone: row.phone,
            location: row.location,
            website: parse_stored_url("profile website", row.website)?,
            profile_image: row.profile_image.map(AttachmentId::from_uuid),
            banner_image: row.banner_image.map(AttachmentId::from_uuid),
            links: row.links.0,
            updated_at: row.updated_at,
        })
    }
}

/// Repository for the profile.
#[derive(Debug, Clone)]
pub struct ProfileRepository {
    pool: PgPool,
}

impl ProfileRepository {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Load the profile.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the stored row is invalid.
    pub async fn load(&self) -> Result<Option<Profile>, RepositoryError> {
        let row = sqlx::query_as::<_, ProfileRow>(
            r"
            SELECT name, title, bio, email, phone, location, website,
                   profile_image, banner_image, links, updated_at
            FROM profile
            ",
        )
        .fetch_optional(&self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Create or replace the profile.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn upsert(
        &self,
        draft: &ProfileDraft,
        images: ProfileImages,
    ) -> Result<Profile, RepositoryError> {
        let row = sqlx::query_as::<_, ProfileRow>(
            r"
            INSERT INTO profile
                (name, title, bio, email, phone, location, website,
                 profile_image, banner_image, links)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            ON CONFLICT (singleton) DO UPDATE SET
                name = EXCLUDED.name,
                title = EXCLUDED.title,
                bio = EXCLUDED.bio,
                email = EXCLUDED.email,
                phone = EXCLUDED.phone,
                location = EXCLUDED.location,
                website = EXCLUDED.website,
                profile_image = EXCLUDED.profile_image,
                banner_image = EXCLUDED.banner_image,
                links = EXCLUDED.links,
                updated_at = NOW()
            RETURNING name, title, bio, email, phone, location, website,
                      profile_image, banner_image, links, updated_at
            ",
        )
        .bind(&draft.name)
        .bind(&draft.title)
        .bind(&draft.bio)
        .bind(draft.email.as_str())
        .bind(draft.phone.as_deref())
        .bind(draft.location.as_deref())
        .bind(draft.website.as_ref().map(url::Url::as_str))
        .bind(images.profile_image)
        .bind(images.banner_image)
        .bind(Json(&draft.links))
        .fetch_one(&self.pool)
        .await?;

        row.try_into()
    }
}

impl ProfileStore for ProfileRepository {
    async fn get(&self) -> Result<Option<Profile>, StoreError> {
        Ok(self.load().await?)
    }

    async fn save(
        &self,
        draft: &ProfileDraft,
        images: ProfileImages,
    ) -> Result<Profile, StoreError> {
        Ok(self.upsert(draft, images).await?)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn row() -> ProfileRow {
        ProfileRow {
            name: "Ada".to_string(),
            title: "Engineer".to_string(),
            bio: "Builds things.".to_string(),
            email: "ada@example.com".to_string(),
            phone: None,
            location: Some("London".to_string()),
            website: Some("https://ada.example.com".to_string()),
            profile_image: Some(Uuid::new_v4()),
            banner_image: None,
            links: Json(vec![ProfileLink {
                platform: "GitHub".to_string(),
                url: "https://github.com/ada".parse().unwrap(),
            }]),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_row_conversion() {
        let profile = Profile::try_from(row()).unwrap();
        assert_eq!(profile.email.as_str(), "ada@example.com");
        assert_eq!(profile.links.len(), 1);
        assert!(profile.profile_image.is_some());
        assert!(profile.website.is_some());
    }

    #[test]
    fn test_row_with_corrupt_email() {
        let mut bad = row();
        bad.email = "ada".to_string();
        assert!(matches!(
            Profile::try_from(bad),
            Err(RepositoryError::DataCorruption(_))
        ));
    }
}
