//! In-memory store implementations for unit tests.

#![allow(clippy::unwrap_used)]

use std::collections::HashSet;
use std::marker::PhantomData;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use chrono::Utc;
use url::Url;

use crate::admin::AdminSettings;
use crate::content::{
    Achievement, Certificate, ContentKind, Education, NewAchievement, NewCertificate,
    NewEducation, Profile, ProfileDraft, ProfileImages,
};
use crate::store::{
    AdminSettingsStore, ContentStore, ObjectStore, ObjectStoreError, ProfileStore, StoreError,
};
use crate::types::{AttachmentId, Email};

#[derive(Debug, Clone, Default)]
pub struct MemorySettings {
    record: Arc<Mutex<Option<AdminSettings>>>,
    broken: bool,
}

impl MemorySettings {
    /// A store whose every call fails.
    pub fn failing() -> Self {
        Self {
            broken: true,
            ..Self::default()
        }
    }

    fn check(&self) -> Result<(), StoreError> {
        if self.broken {
            Err(StoreError::Backend("connection refused".into()))
        } else {
            Ok(())
        }
    }
}

impl AdminSettingsStore for MemorySettings {
    async fn load(&self) -> Result<Option<AdminSettings>, StoreError> {
        self.check()?;
        Ok(self.record.lock().unwrap().clone())
    }

    async fn create(&self, email: &Email) -> Result<AdminSettings, StoreError> {
        self.check()?;
        tokio::task::yield_now().await;

        let mut record = self.record.lock().unwrap();
        if record.is_some() {
            return Err(StoreError::Conflict);
        }
        let settings = AdminSettings {
            is_setup: true,
            admin_email: email.clone(),
            created_at: Utc::now(),
        };
        *record = Some(settings.clone());
        Ok(settings)
    }
}

/// Builds a stored item from its draft.
pub trait Materialize: ContentKind {
    fn materialize(id: Self::Id, draft: &Self::Draft) -> Self;
}

impl Materialize for Education {
    fn materialize(id: Self::Id, draft: &NewEducation) -> Self {
        Self {
            id,
            school: draft.school.clone(),
            degree: draft.degree.clone(),
            field: draft.field.clone(),
            start_date: draft.start_date.clone(),
            end_date: draft.end_date.clone(),
            description: draft.description.clone(),
            location: draft.location.clone(),
            attachment_id: draft.attachment_id,
            created_at: Utc::now(),
        }
    }
}

impl Materialize for Certificate {
    fn materialize(id: Self::Id, draft: &NewCertificate) -> Self {
        Self {
            id,
            name: draft.name.clone(),
            issuer: draft.issuer.clone(),
            date: draft.date.clone(),
            description: draft.description.clone(),
            url: draft.url.clone(),
            attachment_id: draft.attachment_id,
            created_at: Utc::now(),
        }
    }
}

impl Materialize for Achievement {
    fn materialize(id: Self::Id, draft: &NewAchievement) -> Self {
        Self {
            id,
            title: draft.title.clone(),
            date: draft.date.clone(),
            description: draft.description.clone(),
            attachment_id: draft.attachment_id,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug)]
struct Rows<K> {
    next_id: i32,
    items: Vec<K>,
}

#[derive(Debug, Clone)]
pub struct MemoryContent<K> {
    rows: Arc<Mutex<Rows<K>>>,
    kind: PhantomData<K>,
}

impl<K> Default for MemoryContent<K> {
    fn default() -> Self {
        Self {
            rows: Arc::new(Mutex::new(Rows {
                next_id: 1,
                items: Vec::new(),
            })),
            kind: PhantomData,
        }
    }
}

impl<K> MemoryContent<K> {
    pub fn is_empty(&self) -> bool {
        self.rows.lock().unwrap().items.is_empty()
    }
}

impl<K: Materialize> ContentStore<K> for MemoryContent<K> {
    async fn list_newest_first(&self) -> Result<Vec<K>, StoreError> {
        Ok(self.rows.lock().unwrap().items.iter().rev().cloned().collect())
    }

    async fn insert(&self, draft: &K::Draft) -> Result<K::Id, StoreError> {
        let mut rows = self.rows.lock().unwrap();
        let id = K::Id::from(rows.next_id);
        rows.next_id += 1;
        rows.items.push(K::materialize(id, draft));
        Ok(id)
    }

    async fn get(&self, id: K::Id) -> Result<Option<K>, StoreError> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .items
            .iter()
            .find(|item| item.id() == id)
            .cloned())
    }

    async fn delete(&self, id: K::Id) -> Result<bool, StoreError> {
        let mut rows = self.rows.lock().unwrap();
        let before = rows.items.len();
        rows.items.retain(|item| item.id() != id);
        Ok(rows.items.len() < before)
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryProfile {
    profile: Arc<Mutex<Option<Profile>>>,
}

impl ProfileStore for MemoryProfile {
    async fn get(&self) -> Result<Option<Profile>, StoreError> {
        Ok(self.profile.lock().unwrap().clone())
    }

    async fn save(
        &self,
        draft: &ProfileDraft,
        images: ProfileImages,
    ) -> Result<Profile, StoreError> {
        let profile = Profile {
            name: draft.name.clone(),
            title: draft.title.clone(),
            bio: draft.bio.clone(),
            email: draft.email.clone(),
            phone: draft.phone.clone(),
            location: draft.location.clone(),
            website: draft.website.clone(),
            profile_image: images.profile_image,
            banner_image: images.banner_image,
            links: draft.links.clone(),
            updated_at: Utc::now(),
        };
        *self.profile.lock().unwrap() = Some(profile.clone());
        Ok(profile)
    }
}

/// Object store that tracks ids only and records every delete call.
#[derive(Debug, Clone, Default)]
pub struct MemoryObjects {
    objects: Arc<Mutex<HashSet<AttachmentId>>>,
    deleted: Arc<Mutex<Vec<AttachmentId>>>,
    fail_deletes: Arc<AtomicBool>,
}

impl MemoryObjects {
    /// Store a new object and return its id.
    pub fn put(&self) -> AttachmentId {
        let id = AttachmentId::generate();
        self.objects.lock().unwrap().insert(id);
        id
    }

    /// Drop an object behind the service's back.
    pub fn forget(&self, id: AttachmentId) {
        self.objects.lock().unwrap().remove(&id);
    }

    pub fn fail_deletes(&self) {
        self.fail_deletes.store(true, Ordering::SeqCst);
    }

    pub fn deleted(&self) -> Vec<AttachmentId> {
        self.deleted.lock().unwrap().clone()
    }
}

impl ObjectStore for MemoryObjects {
    async fn generate_upload_url(&self) -> Result<Url, ObjectStoreError> {
        Ok(Url::parse("http://localhost/uploads/test-token").unwrap())
    }

    async fn get_url(&self, id: AttachmentId) -> Result<Option<Url>, ObjectStoreError> {
        if self.objects.lock().unwrap().contains(&id) {
            Ok(Some(
                Url::parse(&format!("http://localhost/files/{id}")).unwrap(),
            ))
        } else {
            Ok(None)
        }
    }

    async fn delete(&self, id: AttachmentId) -> Result<(), ObjectStoreError> {
        self.deleted.lock().unwrap().push(id);
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(ObjectStoreError::Backend("disk unavailable".to_owned()));
        }
        if self.objects.lock().unwrap().remove(&id) {
            Ok(())
        } else {
            Err(ObjectStoreError::NotFound(id))
        }
    }
}
