//! Portfolio content and the service that manages it.
//!
//! Three collections (education, certificates, achievements) share one set of
//! operations through the [`ContentKind`] trait. The profile is a singleton
//! with its own pair of operations. Reads are public; every write passes the
//! [`AdminGate`] first.

use core::fmt;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::admin::{AdminGate, GateError, Identity};
use crate::store::{
    AdminSettingsStore, ContentStore, ObjectStore, ObjectStoreError, ProfileStore, StoreError,
};
use crate::types::{AchievementId, AttachmentId, CertificateId, Email, EducationId};

// =============================================================================
// Errors
// =============================================================================

/// Errors from [`ContentService`].
#[derive(thiserror::Error, Debug)]
pub enum ContentError {
    #[error(transparent)]
    Access(#[from] GateError),

    #[error("{collection} item {id} not found")]
    NotFound {
        collection: &'static str,
        id: String,
    },

    /// The submitted draft is malformed.
    #[error("invalid input: {0}")]
    Invalid(String),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Objects(#[from] ObjectStoreError),
}

fn require(field: &str, value: &str) -> Result<(), ContentError> {
    if value.trim().is_empty() {
        Err(ContentError::Invalid(format!("{field} is required")))
    } else {
        Ok(())
    }
}

// =============================================================================
// Kinds
// =============================================================================

/// A content collection.
pub trait ContentKind: Clone + fmt::Debug + Serialize + Send + Sync + 'static {
    type Id: Copy
        + Eq
        + fmt::Debug
        + fmt::Display
        + From<i32>
        + Serialize
        + DeserializeOwned
        + Send
        + Sync
        + 'static;

    type Draft: Draft;

    /// Collection name as it appears in URLs and logs.
    const COLLECTION: &'static str;

    fn id(&self) -> Self::Id;

    /// The date field the collection is ordered by.
    fn date(&self) -> &str;

    fn attachment(&self) -> Option<AttachmentId>;
}

/// Input for creating an item of some [`ContentKind`].
pub trait Draft: fmt::Debug + DeserializeOwned + Send + Sync {
    /// Check required fields.
    ///
    /// # Errors
    ///
    /// Returns [`ContentError::Invalid`] naming the first missing field.
    fn validate(&self) -> Result<(), ContentError>;

    fn attachment(&self) -> Option<AttachmentId>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Education {
    pub id: EducationId,
    pub school: String,
    pub degree: String,
    pub field: String,
    pub start_date: String,
    pub end_date: Option<String>,
    pub description: String,
    pub location: String,
    pub attachment_id: Option<AttachmentId>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewEducation {
    pub school: String,
    pub degree: String,
    pub field: String,
    pub start_date: String,
    #[serde(default)]
    pub end_date: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub attachment_id: Option<AttachmentId>,
}

impl ContentKind for Education {
    type Id = EducationId;
    type Draft = NewEducation;

    const COLLECTION: &'static str = "education";

    fn id(&self) -> EducationId {
        self.id
    }

    fn date(&self) -> &str {
        &self.start_date
    }

    fn attachment(&self) -> Option<AttachmentId> {
        self.attachment_id
    }
}

impl Draft for NewEducation {
    fn validate(&self) -> Result<(), ContentError> {
        require("school", &self.school)?;
        require("degree", &self.degree)?;
        require("field", &self.field)?;
        require("startDate", &self.start_date)
    }

    fn attachment(&self) -> Option<AttachmentId> {
        self.attachment_id
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Certificate {
    pub id: CertificateId,
    pub name: String,
    pub issuer: String,
    pub date: String,
    pub description: String,
    /// Public verification link.
    pub url: Option<Url>,
    pub attachment_id: Option<AttachmentId>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCertificate {
    pub name: String,
    pub issuer: String,
    pub date: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub url: Option<Url>,
    #[serde(default)]
    pub attachment_id: Option<AttachmentId>,
}

impl ContentKind for Certificate {
    type Id = CertificateId;
    type Draft = NewCertificate;

    const COLLECTION: &'static str = "certificates";

    fn id(&self) -> CertificateId {
        self.id
    }

    fn date(&self) -> &str {
        &self.date
    }

    fn attachment(&self) -> Option<AttachmentId> {
        self.attachment_id
    }
}

impl Draft for NewCertificate {
    fn validate(&self) -> Result<(), ContentError> {
        require("name", &self.name)?;
        require("issuer", &self.issuer)?;
        require("date", &self.date)
    }

    fn attachment(&self) -> Option<AttachmentId> {
        self.attachment_id
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Achievement {
    pub id: AchievementId,
    pub title: String,
    pub date: String,
    pub description: String,
    pub attachment_id: Option<AttachmentId>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAchievement {
    pub title: String,
    pub date: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub attachment_id: Option<AttachmentId>,
}

impl ContentKind for Achievement {
    type Id = AchievementId;
    type Draft = NewAchievement;

    const COLLECTION: &'static str = "achievements";

    fn id(&self) -> AchievementId {
        self.id
    }

    fn date(&self) -> &str {
        &self.date
    }

    fn attachment(&self) -> Option<AttachmentId> {
        self.attachment_id
    }
}

impl Draft for NewAchievement {
    fn validate(&self) -> Result<(), ContentError> {
        require("title", &self.title)?;
        require("date", &self.date)
    }

    fn attachment(&self) -> Option<AttachmentId> {
        self.attachment_id
    }
}

// =============================================================================
// Profile
// =============================================================================

/// A link to the owner's presence elsewhere (`GitHub`, `LinkedIn`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileLink {
    pub platform: String,
    pub url: Url,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub name: String,
    pub title: String,
    pub bio: String,
    pub email: Email,
    pub phone: Option<String>,
    pub location: Option<String>,
    pub website: Option<Url>,
    pub profile_image: Option<AttachmentId>,
    pub banner_image: Option<AttachmentId>,
    pub links: Vec<ProfileLink>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileDraft {
    pub name: String,
    pub title: String,
    #[serde(default)]
    pub bio: String,
    pub email: Email,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub website: Option<Url>,
    #[serde(default, skip_serializing_if = "ImageUpdate::is_keep")]
    pub profile_image: ImageUpdate,
    #[serde(default, skip_serializing_if = "ImageUpdate::is_keep")]
    pub banner_image: ImageUpdate,
    #[serde(default)]
    pub links: Vec<ProfileLink>,
}

impl ProfileDraft {
    /// Check required fields.
    ///
    /// # Errors
    ///
    /// Returns [`ContentError::Invalid`] naming the first problem found.
    pub fn validate(&self) -> Result<(), ContentError> {
        require("name", &self.name)?;
        require("title", &self.title)?;
        for link in &self.links {
            require("link platform", &link.platform)?;
        }
        Ok(())
    }

    /// Newly referenced images, which must already be uploaded.
    fn uploaded_images(&self) -> impl Iterator<Item = AttachmentId> {
        [self.profile_image, self.banner_image]
            .into_iter()
            .filter_map(ImageUpdate::uploaded)
    }

    /// The images the profile holds once this draft is applied over `current`.
    #[must_use]
    pub fn images_over(&self, current: Option<&Profile>) -> ProfileImages {
        let current = current.map(Profile::images).unwrap_or_default();
        ProfileImages {
            profile_image: self.profile_image.apply(current.profile_image),
            banner_image: self.banner_image.apply(current.banner_image),
        }
    }
}

impl Profile {
    #[must_use]
    pub const fn images(&self) -> ProfileImages {
        ProfileImages {
            profile_image: self.profile_image,
            banner_image: self.banner_image,
        }
    }
}

/// Image references written with a profile.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProfileImages {
    pub profile_image: Option<AttachmentId>,
    pub banner_image: Option<AttachmentId>,
}

impl ProfileImages {
    fn iter(self) -> impl Iterator<Item = AttachmentId> {
        [self.profile_image, self.banner_image].into_iter().flatten()
    }

    fn contains(self, id: AttachmentId) -> bool {
        self.iter().any(|held| held == id)
    }
}

/// What a profile save does to one image slot.
///
/// In JSON an absent field keeps the current image, `null` clears it and an
/// id replaces it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ImageUpdate {
    #[default]
    Keep,
    Clear,
    Set(AttachmentId),
}

impl ImageUpdate {
    #[must_use]
    #[allow(clippy::trivially_copy_pass_by_ref)]
    pub const fn is_keep(&self) -> bool {
        matches!(self, Self::Keep)
    }

    #[must_use]
    pub const fn apply(self, current: Option<AttachmentId>) -> Option<AttachmentId> {
        match self {
            Self::Keep => current,
            Self::Clear => None,
            Self::Set(id) => Some(id),
        }
    }

    const fn uploaded(self) -> Option<AttachmentId> {
        match self {
            Self::Set(id) => Some(id),
            Self::Keep | Self::Clear => None,
        }
    }
}

impl From<Option<AttachmentId>> for ImageUpdate {
    fn from(value: Option<AttachmentId>) -> Self {
        value.map_or(Self::Clear, Self::Set)
    }
}

impl Serialize for ImageUpdate {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.uploaded().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for ImageUpdate {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Option::<AttachmentId>::deserialize(deserializer).map(Self::from)
    }
}

/// The profile with its image references resolved to URLs.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileView {
    #[serde(flatten)]
    pub profile: Profile,
    pub profile_image_url: Option<Url>,
    pub banner_image_url: Option<Url>,
}

/// A collection item with its attachment resolved to a URL.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Listed<K> {
    #[serde(flatten)]
    pub item: K,
    pub attachment_url: Option<Url>,
}

// =============================================================================
// Service
// =============================================================================

/// Reads and gated writes over every content collection.
///
/// Collection stores are passed per call so one service handles all kinds.
#[derive(Debug, Clone)]
pub struct ContentService<A, O> {
    gate: AdminGate<A>,
    objects: O,
}

impl<A, O> ContentService<A, O>
where
    A: AdminSettingsStore,
    O: ObjectStore,
{
    pub const fn new(gate: AdminGate<A>, objects: O) -> Self {
        Self { gate, objects }
    }

    pub const fn gate(&self) -> &AdminGate<A> {
        &self.gate
    }

    /// All items of a collection, latest date first.
    ///
    /// Items sharing a date keep the store's order, so the most recently
    /// inserted comes first.
    ///
    /// # Errors
    ///
    /// Returns an error if either store fails.
    pub async fn list<K, S>(&self, store: &S) -> Result<Vec<Listed<K>>, ContentError>
    where
        K: ContentKind,
        S: ContentStore<K>,
    {
        let mut items = store.list_newest_first().await?;
        items.sort_by(|a, b| b.date().cmp(a.date()));

        let mut listed = Vec::with_capacity(items.len());
        for item in items {
            let attachment_url = self.resolve(item.attachment()).await?;
            listed.push(Listed {
                item,
                attachment_url,
            });
        }
        Ok(listed)
    }

    /// Create an item.
    ///
    /// # Errors
    ///
    /// Fails if the caller is not the administrator, the draft is invalid,
    /// the referenced attachment does not exist, or a store fails.
    #[tracing::instrument(skip_all, fields(collection = K::COLLECTION))]
    pub async fn add<K, S>(
        &self,
        caller: Option<&Identity>,
        store: &S,
        draft: &K::Draft,
    ) -> Result<K::Id, ContentError>
    where
        K: ContentKind,
        S: ContentStore<K>,
    {
        self.gate.authorize(caller).await?;
        draft.validate()?;
        self.ensure_exists(draft.attachment()).await?;

        let id = store.insert(draft).await?;
        tracing::info!(%id, "Content item added");
        Ok(id)
    }

    /// Delete an item and release its attachment.
    ///
    /// The record goes first. If the attachment release then fails the
    /// object is orphaned but no record points at a missing object.
    ///
    /// # Errors
    ///
    /// Fails if the caller is not the administrator, the item does not exist,
    /// or the content store fails. Attachment release never fails the call.
    #[tracing::instrument(skip_all, fields(collection = K::COLLECTION, %id))]
    pub async fn remove<K, S>(
        &self,
        caller: Option<&Identity>,
        store: &S,
        id: K::Id,
    ) -> Result<K, ContentError>
    where
        K: ContentKind,
        S: ContentStore<K>,
    {
        self.gate.authorize(caller).await?;

        let not_found = || ContentError::NotFound {
            collection: K::COLLECTION,
            id: id.to_string(),
        };

        let item = store.get(id).await?.ok_or_else(not_found)?;
        if !store.delete(id).await? {
            return Err(not_found());
        }
        tracing::info!("Content item removed");

        if let Some(attachment) = item.attachment() {
            self.release(attachment).await;
        }

        Ok(item)
    }

    /// Issue a single-use upload URL for a new attachment.
    ///
    /// # Errors
    ///
    /// Fails if the caller is not the administrator or the object store fails.
    pub async fn issue_upload_url(&self, caller: Option<&Identity>) -> Result<Url, ContentError> {
        self.gate.authorize(caller).await?;
        Ok(self.objects.generate_upload_url().await?)
    }

    /// The profile with resolved image URLs.
    ///
    /// # Errors
    ///
    /// Returns an error if either store fails.
    pub async fn profile<P: ProfileStore>(
        &self,
        store: &P,
    ) -> Result<Option<ProfileView>, ContentError> {
        let Some(profile) = store.get().await? else {
            return Ok(None);
        };

        let profile_image_url = self.resolve(profile.profile_image).await?;
        let banner_image_url = self.resolve(profile.banner_image).await?;

        Ok(Some(ProfileView {
            profile,
            profile_image_url,
            banner_image_url,
        }))
    }

    /// Create or update the profile.
    ///
    /// Text fields are replaced. Image slots follow their [`ImageUpdate`], so
    /// an omitted image keeps its current value. Images that were replaced or
    /// cleared are released after the write.
    ///
    /// # Errors
    ///
    /// Fails if the caller is not the administrator, the draft is invalid, a
    /// new image does not exist, or a store fails. A failed release is logged
    /// and does not fail the save.
    #[tracing::instrument(skip_all)]
    pub async fn save_profile<P: ProfileStore>(
        &self,
        caller: Option<&Identity>,
        store: &P,
        draft: &ProfileDraft,
    ) -> Result<Profile, ContentError> {
        self.gate.authorize(caller).await?;
        draft.validate()?;
        for image in draft.uploaded_images() {
            self.ensure_exists(Some(image)).await?;
        }

        let previous = store.get().await?;
        let images = draft.images_over(previous.as_ref());
        let saved = store.save(draft, images).await?;
        tracing::info!("Profile saved");

        let kept = saved.images();
        for old in previous.iter().flat_map(|p| p.images().iter()) {
            if !kept.contains(old) {
                self.release(old).await;
            }
        }

        Ok(saved)
    }

    async fn resolve(&self, id: Option<AttachmentId>) -> Result<Option<Url>, ObjectStoreError> {
        match id {
            Some(id) => self.objects.get_url(id).await,
            None => Ok(None),
        }
    }

    async fn ensure_exists(&self, id: Option<AttachmentId>) -> Result<(), ContentError> {
        match id {
            Some(id) if self.objects.get_url(id).await?.is_none() => Err(ContentError::Invalid(
                format!("attachment {id} has not been uploaded"),
            )),
            _ => Ok(()),
        }
    }

    /// Delete an object no record points at any more.
    ///
    /// Runs after the record write has committed, so a failure only orphans
    /// the object and is logged rather than returned.
    async fn release(&self, id: AttachmentId) {
        match self.objects.delete(id).await {
            Ok(()) => tracing::debug!(attachment = %id, "Attachment released"),
            Err(ObjectStoreError::NotFound(_)) => {
                tracing::debug!(attachment = %id, "Attachment already gone");
            }
            Err(e) => {
                tracing::error!(attachment = %id, error = %e, "Failed to release attachment");
            }
        }
    }
}
