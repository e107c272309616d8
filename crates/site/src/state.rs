//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use portfolio_core::{AdminGate, ContentService, ObjectStoreError};

use crate::config::SiteConfig;
use crate::db::{
    AchievementRepository, AdminSettingsRepository, CertificateRepository, EducationRepository,
    ProfileRepository,
};
use crate::storage::LocalObjectStore;

/// Content service as wired for the site.
pub type SiteContent = ContentService<AdminSettingsRepository, LocalObjectStore>;

/// Application state shared across all handlers.
///
/// This struct is cheaply cloneable via `Arc` and provides access to
/// shared resources like database connections and configuration.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: SiteConfig,
    pool: PgPool,
    content: SiteContent,
    objects: LocalObjectStore,
    profile: ProfileRepository,
    education: EducationRepository,
    certificates: CertificateRepository,
    achievements: AchievementRepository,
}

impl AppState {
    /// Create a new application state.
    ///
    /// # Arguments
    ///
    /// * `config` - Site configuration
    /// * `pool` - `PostgreSQL` connection pool
    ///
    /// # Errors
    ///
    /// Returns an error if the attachment directory cannot be created.
    pub async fn new(config: SiteConfig, pool: PgPool) -> Result<Self, ObjectStoreError> {
        let objects = LocalObjectStore::open(&config.storage, config.base_url.clone()).await?;
        let gate = AdminGate::new(AdminSettingsRepository::new(pool.clone()));
        let content = ContentService::new(gate, objects.clone());

        Ok(Self {
            inner: Arc::new(AppStateInner {
                profile: ProfileRepository::new(pool.clone()),
                education: EducationRepository::new(pool.clone()),
                certificates: CertificateRepository::new(pool.clone()),
                achievements: AchievementRepository::new(pool.clone()),
                config,
                pool,
                content,
                objects,
            }),
        })
    }

    /// Get a reference to the site configuration.
    #[must_use]
    pub fn config(&self) -> &SiteConfig {
        &self.inner.config
    }

    /// Get a reference to the database connection pool.
    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Content service, including the admin gate.
    #[must_use]
    pub fn content(&self) -> &SiteContent {
        &self.inner.content
    }

    /// The admin authorization gate.
    #[must_use]
    pub fn gate(&self) -> &AdminGate<AdminSettingsRepository> {
        self.inner.content.gate()
    }

    /// Attachment storage.
    #[must_use]
    pub fn objects(&self) -> &LocalObjectStore {
        &self.inner.objects
    }

    #[must_use]
    pub fn profile(&self) -> &ProfileRepository {
        &self.inner.profile
    }

    #[must_use]
    pub fn education(&self) -> &EducationRepository {
        &self.inner.education
    }

    #[must_use]
    pub fn certificates(&self) -> &CertificateRepository {
        &self.inner.certificates
    }

    #[must_use]
    pub fn achievements(&self) -> &AchievementRepository {
        &self.inner.achievements
    }
}
