//! Core types for the portfolio site.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod attachment;
pub mod email;
pub mod id;

pub use attachment::{AttachmentId, AttachmentIdError};
pub use email::{Email, EmailError};
pub use id::*;
