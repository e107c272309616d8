//! JSON API.
//!
//! Errors are returned as plain-text bodies with the matching status code.

pub mod admin;
pub mod content;
