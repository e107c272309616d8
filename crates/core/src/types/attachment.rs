//! Attachment references into the object store.

use core::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Error parsing an [`AttachmentId`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid attachment id: {0}")]
pub struct AttachmentIdError(String);

/// Opaque identifier of a binary object held in the object store.
///
/// Issued by the store when an upload completes (the `storageId` returned to
/// the uploader) and recorded on content items that reference the object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AttachmentId(Uuid);

impl AttachmentId {
    /// Generate a fresh random id.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap an existing UUID.
    #[must_use]
    pub const fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Get the underlying UUID.
    #[must_use]
    pub const fn as_uuid(&self) -> Uuid {
        self.0
    }

    /// Parse an optional form value, treating blank input as "no attachment".
    ///
    /// # Errors
    ///
    /// Returns an error if the value is non-blank and not a UUID.
    pub fn parse_optional(raw: Option<&str>) -> Result<Option<Self>, AttachmentIdError> {
        match raw.map(str::trim) {
            None | Some("") => Ok(None),
            Some(value) => value.parse().map(Some),
        }
    }
}

impl fmt::Display for AttachmentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for AttachmentId {
    type Err = AttachmentIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s)
            .map(Self)
            .map_err(|_| AttachmentIdError(s.to_owned()))
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for AttachmentId {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <Uuid as sqlx::Type<sqlx::Postgres>>::type_info()
    }

    fn compatible(ty: &sqlx::postgres::PgTypeInfo) -> bool {
        <Uuid as sqlx::Type<sqlx::Postgres>>::compatible(ty)
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for AttachmentId {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        <Uuid as sqlx::Decode<sqlx::Postgres>>::decode(value).map(Self)
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for AttachmentId {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <Uuid as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_optional_blank_is_none() {
        assert_eq!(AttachmentId::parse_optional(None).unwrap(), None);
        assert_eq!(AttachmentId::parse_optional(Some("  ")).unwrap(), None);
    }

    #[test]
    fn test_parse_optional_value() {
        let id = AttachmentId::generate();
        let text = id.to_string();
        assert_eq!(
            AttachmentId::parse_optional(Some(&text)).unwrap(),
            Some(id)
        );
        assert!(AttachmentId::parse_optional(Some("../etc/passwd")).is_err());
    }
}
