//! Portfolio Core - Shared types and storage-agnostic logic.
//!
//! This crate is used by every portfolio component:
//! - `site` - Public portfolio view, admin panel and JSON API
//! - `cli` - Command-line tools for migrations and admin bootstrap
//!
//! # Architecture
//!
//! The core crate contains types, traits and the policy logic that sits on top
//! of them. It performs no I/O of its own: the document store and the object
//! store are reached only through the traits in [`store`], which the site
//! implements with `PostgreSQL` and the local filesystem.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for emails, ids and attachment references
//! - [`admin`] - The admin authorization gate
//! - [`content`] - Content kinds and the content service
//! - [`store`] - Storage contracts and their error types

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod admin;
pub mod content;
pub mod store;
pub mod types;

#[cfg(test)]
mod memory;

pub use admin::{AdminGate, AdminSettings, AuthorizedAdmin, GateError, Identity};
pub use content::{
    Achievement, Certificate, ContentError, ContentKind, ContentService, Draft, Education,
    ImageUpdate, Listed, NewAchievement, NewCertificate, NewEducation, Profile, ProfileDraft,
    ProfileImages, ProfileLink, ProfileView,
};
pub use store::{
    AdminSettingsStore, ContentStore, ObjectStore, ObjectStoreError, ProfileStore, StoreError,
};
pub use types::*;
