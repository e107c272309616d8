//! Storage contracts.
//!
//! The site implements these with `PostgreSQL` (documents) and the local
//! filesystem (objects). Tests implement them in memory. All methods return
//! `Send` futures so implementations can be shared across request handlers.

use std::future::Future;

use url::Url;

use crate::admin::AdminSettings;
use crate::content::{ContentKind, Profile, ProfileDraft, ProfileImages};
use crate::types::{AttachmentId, Email};

/// Boxed error from a storage backend.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors reported by document stores.
#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    /// A uniqueness invariant rejected the write.
    #[error("record already exists")]
    Conflict,

    /// The record addressed by the operation does not exist.
    #[error("record not found")]
    NotFound,

    /// A stored value could not be turned back into a domain type.
    #[error("stored data is corrupt: {0}")]
    DataCorruption(String),

    /// The backend failed.
    #[error("storage backend error: {0}")]
    Backend(#[source] BoxError),
}

/// Errors reported by object stores.
#[derive(thiserror::Error, Debug)]
pub enum ObjectStoreError {
    /// No object with this id exists.
    #[error("object {0} not found")]
    NotFound(AttachmentId),

    /// Filesystem access failed.
    #[error("object store I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The backend failed for another reason.
    #[error("object store error: {0}")]
    Backend(String),
}

/// Persistence for the singleton admin settings record.
pub trait AdminSettingsStore: Send + Sync {
    /// Load the record, if one has been created.
    fn load(&self) -> impl Future<Output = Result<Option<AdminSettings>, StoreError>> + Send;

    /// Create the record binding `email` as the administrator.
    ///
    /// Must be atomic: when two calls race, exactly one succeeds and every
    /// other call fails with [`StoreError::Conflict`]. Implementations must
    /// not check-then-insert.
    fn create(
        &self,
        email: &Email,
    ) -> impl Future<Output = Result<AdminSettings, StoreError>> + Send;
}

/// Persistence for one content collection.
pub trait ContentStore<K: ContentKind>: Send + Sync {
    /// All items. Items sharing a date must come most recently inserted
    /// first; stores may also pre-sort by date.
    fn list_newest_first(&self) -> impl Future<Output = Result<Vec<K>, StoreError>> + Send;

    /// Insert a new item and return its id.
    fn insert(&self, draft: &K::Draft) -> impl Future<Output = Result<K::Id, StoreError>> + Send;

    /// Fetch one item.
    fn get(&self, id: K::Id) -> impl Future<Output = Result<Option<K>, StoreError>> + Send;

    /// Delete one item. Returns `false` if it did not exist.
    fn delete(&self, id: K::Id) -> impl Future<Output = Result<bool, StoreError>> + Send;
}

/// Persistence for the singleton profile.
pub trait ProfileStore: Send + Sync {
    /// The profile, if it has ever been saved.
    fn get(&self) -> impl Future<Output = Result<Option<Profile>, StoreError>> + Send;

    /// Write the draft's text fields together with the resolved image slots.
    fn save(
        &self,
        draft: &ProfileDraft,
        images: ProfileImages,
    ) -> impl Future<Output = Result<Profile, StoreError>> + Send;
}

/// Binary object storage for attachments.
pub trait ObjectStore: Send + Sync {
    /// Issue a single-use, short-lived URL the client can upload one object to.
    fn generate_upload_url(&self) -> impl Future<Output = Result<Url, ObjectStoreError>> + Send;

    /// Resolve a download URL, or `None` if the object does not exist.
    fn get_url(
        &self,
        id: AttachmentId,
    ) -> impl Future<Output = Result<Option<Url>, ObjectStoreError>> + Send;

    /// Delete an object. Fails with [`ObjectStoreError::NotFound`] if it is
    /// already gone.
    fn delete(&self, id: AttachmentId) -> impl Future<Output = Result<(), ObjectStoreError>> + Send;
}
