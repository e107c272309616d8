//! Attachment storage.
//!
//! [`LocalObjectStore`] keeps objects on the local filesystem and hands out
//! single-use upload URLs that point back at this server's `/uploads/{token}`
//! route.

pub mod local;

pub use local::{LocalObjectStore, ObjectMetadata, UploadError};
