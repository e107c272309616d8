//! Filesystem object store.
//!
//! Layout under the storage root:
//!
//! ```text
//! <root>/<uuid>        object bytes
//! <root>/<uuid>.json   metadata (content type, size, upload time)
//! ```
//!
//! Upload tokens live in a `moka` cache with a time-to-live. A token is
//! removed from the cache when an upload consumes it, so each URL accepts at
//! most one object.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::{DateTime, Utc};
use moka::future::Cache;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use tokio::io::AsyncWriteExt;
use url::Url;
use uuid::Uuid;

use portfolio_core::{AttachmentId, ObjectStore, ObjectStoreError};

use crate::config::StorageConfig;

const TOKEN_BYTES: usize = 32;
const MAX_PENDING_UPLOADS: u64 = 10_000;
const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Errors from accepting an upload.
#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("upload URL is invalid, expired or already used")]
    InvalidToken,

    #[error("upload body is empty")]
    Empty,

    #[error("upload exceeds {max} bytes")]
    TooLarge { max: usize },

    #[error(transparent)]
    Store(#[from] ObjectStoreError),
}

/// Sidecar metadata stored next to each object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectMetadata {
    pub content_type: String,
    pub size: u64,
    pub uploaded_at: DateTime<Utc>,
}

/// Object store backed by a local directory.
///
/// Cheaply cloneable.
#[derive(Clone)]
pub struct LocalObjectStore {
    inner: Arc<Inner>,
}

struct Inner {
    root: PathBuf,
    base_url: Url,
    max_upload_bytes: usize,
    tokens: Cache<String, ()>,
}

impl std::fmt::Debug for LocalObjectStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LocalObjectStore")
            .field("root", &self.inner.root)
            .field("base_url", &self.inner.base_url.as_str())
            .field("pending_uploads", &self.inner.tokens.entry_count())
            .finish()
    }
}

impl LocalObjectStore {
    /// Open the store, creating the root directory if needed.
    ///
    /// `base_url` must end with `/`; upload and file URLs are joined onto it.
    ///
    /// # Errors
    ///
    /// Returns an error if the root directory cannot be created.
    pub async fn open(config: &StorageConfig, base_url: Url) -> Result<Self, ObjectStoreError> {
        tokio::fs::create_dir_all(&config.root).await?;

        let tokens = Cache::builder()
            .max_capacity(MAX_PENDING_UPLOADS)
            .time_to_live(config.upload_ttl)
            .build();

        tracing::info!(root = %config.root.display(), "Object store opened");

        Ok(Self {
            inner: Arc::new(Inner {
                root: config.root.clone(),
                base_url,
                max_upload_bytes: config.max_upload_bytes,
                tokens,
            }),
        })
    }

    /// Largest accepted upload, in bytes.
    #[must_use]
    pub fn max_upload_bytes(&self) -> usize {
        self.inner.max_upload_bytes
    }

    /// Store `body` under a fresh id, consuming the upload token.
    ///
    /// The token is only consumed once the body has been checked, so a
    /// rejected body does not burn the URL.
    ///
    /// # Errors
    ///
    /// - [`UploadError::InvalidToken`] if the token is unknown, expired or used
    /// - [`UploadError::Empty`] / [`UploadError::TooLarge`] for bad bodies
    /// - [`UploadError::Store`] if writing fails
    pub async fn accept_upload(
        &self,
        token: &str,
        content_type: Option<&str>,
        body: &[u8],
    ) -> Result<AttachmentId, UploadError> {
        if !self.inner.tokens.contains_key(token) {
            return Err(UploadError::InvalidToken);
        }
        if body.is_empty() {
            return Err(UploadError::Empty);
        }
        if body.len() > self.inner.max_upload_bytes {
            return Err(UploadError::TooLarge {
                max: self.inner.max_upload_bytes,
            });
        }
        if self.inner.tokens.remove(token).await.is_none() {
            return Err(UploadError::InvalidToken);
        }

        let id = AttachmentId::generate();
        let metadata = ObjectMetadata {
            content_type: content_type
                .map(str::trim)
                .filter(|ct| !ct.is_empty())
                .unwrap_or(DEFAULT_CONTENT_TYPE)
                .to_owned(),
            size: body.len() as u64,
            uploaded_at: Utc::now(),
        };

        let meta_json = serde_json::to_vec(&metadata)
            .map_err(|e| ObjectStoreError::Backend(format!("encode metadata: {e}")))?;
        write_atomic(&self.meta_path(id), &meta_json).await?;
        write_atomic(&self.object_path(id), body).await?;

        tracing::info!(attachment = %id, size = metadata.size, content_type = %metadata.content_type, "Upload stored");
        Ok(id)
    }

    /// Open an object for streaming, along with its metadata.
    ///
    /// # Errors
    ///
    /// Returns [`ObjectStoreError::NotFound`] if the object does not exist.
    pub async fn open_object(
        &self,
        id: AttachmentId,
    ) -> Result<(ObjectMetadata, tokio::fs::File), ObjectStoreError> {
        let meta_bytes = tokio::fs::read(self.meta_path(id))
            .await
            .map_err(|e| not_found_or(e, id))?;
        let metadata = serde_json::from_slice(&meta_bytes)
            .map_err(|e| ObjectStoreError::Backend(format!("corrupt metadata for {id}: {e}")))?;
        let file = tokio::fs::File::open(self.object_path(id))
            .await
            .map_err(|e| not_found_or(e, id))?;

        Ok((metadata, file))
    }

    fn issue_token(&self) -> String {
        let mut bytes = [0u8; TOKEN_BYTES];
        rand::rng().fill_bytes(&mut bytes);
        URL_SAFE_NO_PAD.encode(bytes)
    }

    fn object_path(&self, id: AttachmentId) -> PathBuf {
        self.inner.root.join(id.to_string())
    }

    fn meta_path(&self, id: AttachmentId) -> PathBuf {
        self.inner.root.join(format!("{id}.json"))
    }

    fn join(&self, path: &str) -> Result<Url, ObjectStoreError> {
        self.inner
            .base_url
            .join(path)
            .map_err(|e| ObjectStoreError::Backend(format!("build URL: {e}")))
    }
}

impl ObjectStore for LocalObjectStore {
    async fn generate_upload_url(&self) -> Result<Url, ObjectStoreError> {
        let token = self.issue_token();
        let url = self.join(&format!("uploads/{token}"))?;
        self.inner.tokens.insert(token, ()).await;
        Ok(url)
    }

    async fn get_url(&self, id: AttachmentId) -> Result<Option<Url>, ObjectStoreError> {
        if tokio::fs::try_exists(self.object_path(id)).await? {
            self.join(&format!("files/{id}")).map(Some)
        } else {
            Ok(None)
        }
    }

    async fn delete(&self, id: AttachmentId) -> Result<(), ObjectStoreError> {
        tokio::fs::remove_file(self.object_path(id))
            .await
            .map_err(|e| not_found_or(e, id))?;

        if let Err(e) = tokio::fs::remove_file(self.meta_path(id)).await {
            if e.kind() != ErrorKind::NotFound {
                return Err(e.into());
            }
        }

        tracing::info!(attachment = %id, "Object deleted");
        Ok(())
    }
}

fn not_found_or(err: std::io::Error, id: AttachmentId) -> ObjectStoreError {
    if err.kind() == ErrorKind::NotFound {
        ObjectStoreError::NotFound(id)
    } else {
        ObjectStoreError::Io(err)
    }
}

/// Write through a uniquely named temporary file, synced before the rename,
/// so readers never see a partial object.
async fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), ObjectStoreError> {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(format!(".tmp.{}", Uuid::new_v4()));
    let tmp = PathBuf::from(tmp);
    {
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(bytes).await?;
        file.sync_all().await?;
    }
    tokio::fs::rename(&tmp, path).await?;
    Ok(())
}
