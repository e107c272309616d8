//! Admin authorization gate.
//!
//! The site has exactly one administrator. The binding between that role and
//! an email address is created once, by the first successful
//! [`AdminGate::setup_admin`] call, and is never changed afterwards. Every
//! content mutation goes through [`AdminGate::authorize`], which compares the
//! caller's email with the bound email exactly.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::store::{AdminSettingsStore, StoreError};
use crate::types::Email;

/// The authenticated principal behind a request, as resolved by the identity
/// provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    email: Email,
}

impl Identity {
    /// Create an identity for a signed-in user.
    #[must_use]
    pub const fn new(email: Email) -> Self {
        Self { email }
    }

    /// The signed-in user's email.
    #[must_use]
    pub const fn email(&self) -> &Email {
        &self.email
    }
}

/// The persisted admin binding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminSettings {
    pub is_setup: bool,
    pub admin_email: Email,
    pub created_at: DateTime<Utc>,
}

/// Errors from the gate.
#[derive(thiserror::Error, Debug)]
pub enum GateError {
    /// No identity could be resolved for the caller.
    #[error("not authenticated")]
    Unauthenticated,

    /// The caller is signed in but is not the administrator, or no
    /// administrator has been bound yet.
    #[error("permission denied")]
    PermissionDenied,

    /// An administrator is already bound.
    #[error("admin already configured")]
    AlreadyConfigured,

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Proof that the caller passed [`AdminGate::authorize`].
///
/// Cannot be constructed outside this module.
#[derive(Debug, Clone)]
pub struct AuthorizedAdmin {
    email: Email,
}

impl AuthorizedAdmin {
    #[must_use]
    pub const fn email(&self) -> &Email {
        &self.email
    }
}

/// Single source of truth for who the administrator is.
#[derive(Debug, Clone)]
pub struct AdminGate<S> {
    settings: S,
}

impl<S: AdminSettingsStore> AdminGate<S> {
    pub const fn new(settings: S) -> Self {
        Self { settings }
    }

    /// Whether an administrator has been bound.
    ///
    /// # Errors
    ///
    /// Returns an error only if the store fails.
    pub async fn is_setup(&self) -> Result<bool, StoreError> {
        Ok(self
            .settings
            .load()
            .await?
            .is_some_and(|settings| settings.is_setup))
    }

    /// The bound administrator's email.
    ///
    /// Available without authentication so the sign-in page can tell a
    /// visitor which account to use.
    ///
    /// # Errors
    ///
    /// Returns an error only if the store fails.
    pub async fn admin_email(&self) -> Result<Option<Email>, StoreError> {
        Ok(self
            .settings
            .load()
            .await?
            .filter(|settings| settings.is_setup)
            .map(|settings| settings.admin_email))
    }

    /// Bind `email` as the administrator.
    ///
    /// # Errors
    ///
    /// Returns [`GateError::AlreadyConfigured`] if an administrator is already
    /// bound, whether by an earlier call or by a concurrent one that won.
    #[tracing::instrument(skip(self), fields(admin_email = %email))]
    pub async fn setup_admin(&self, email: &Email) -> Result<AdminSettings, GateError> {
        match self.settings.create(email).await {
            Ok(settings) => {
                tracing::info!("Admin bound");
                Ok(settings)
            }
            Err(StoreError::Conflict) => {
                tracing::warn!("Rejected admin setup, already configured");
                Err(GateError::AlreadyConfigured)
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Whether `caller` is the administrator.
    ///
    /// False for anonymous callers, when no administrator is bound, and when
    /// the emails differ in any way (including case).
    ///
    /// # Errors
    ///
    /// Returns an error only if the store fails.
    pub async fn validate_admin_access(
        &self,
        caller: Option<&Identity>,
    ) -> Result<bool, StoreError> {
        let Some(caller) = caller else {
            return Ok(false);
        };

        Ok(self
            .admin_email()
            .await?
            .is_some_and(|admin| admin == *caller.email()))
    }

    /// Guard for mutations.
    ///
    /// # Errors
    ///
    /// - [`GateError::Unauthenticated`] if there is no caller
    /// - [`GateError::PermissionDenied`] if the caller is not the administrator
    pub async fn authorize(&self, caller: Option<&Identity>) -> Result<AuthorizedAdmin, GateError> {
        let Some(identity) = caller else {
            return Err(GateError::Unauthenticated);
        };

        if self.validate_admin_access(Some(identity)).await? {
            Ok(AuthorizedAdmin {
                email: identity.email().clone(),
            })
        } else {
            tracing::warn!(caller = %identity.email(), "Denied admin access");
            Err(GateError::PermissionDenied)
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::memory::MemorySettings;

    fn email(raw: &str) -> Email {
        Email::parse(raw).unwrap()
    }

    fn identity(raw: &str) -> Identity {
        Identity::new(email(raw))
    }

    #[tokio::test]
    async fn test_bootstrap_scenario() {
        let gate = AdminGate::new(MemorySettings::default());

        assert!(!gate.is_setup().await.unwrap());
        assert_eq!(gate.admin_email().await.unwrap(), None);

        gate.setup_admin(&email("a@x.com")).await.unwrap();
        assert!(gate.is_setup().await.unwrap());

        let second = gate.setup_admin(&email("b@y.com")).await;
        assert!(matches!(second, Err(GateError::AlreadyConfigured)));

        assert_eq!(gate.admin_email().await.unwrap(), Some(email("a@x.com")));
    }

    #[tokio::test]
    async fn test_anonymous_caller_never_validates() {
        let gate = AdminGate::new(MemorySettings::default());
        assert!(!gate.validate_admin_access(None).await.unwrap());

        gate.setup_admin(&email("a@x.com")).await.unwrap();
        assert!(!gate.validate_admin_access(None).await.unwrap());
    }

    #[tokio::test]
    async fn test_unconfigured_denies_everyone() {
        let gate = AdminGate::new(MemorySettings::default());
        let caller = identity("a@x.com");

        assert!(!gate.validate_admin_access(Some(&caller)).await.unwrap());
        assert!(matches!(
            gate.authorize(Some(&caller)).await,
            Err(GateError::PermissionDenied)
        ));
    }

    #[tokio::test]
    async fn test_exact_match_only() {
        let gate = AdminGate::new(MemorySettings::default());
        gate.setup_admin(&email("owner@example.com")).await.unwrap();

        let admin = identity("owner@example.com");
        let shouting = identity("Owner@Example.com");
        let stranger = identity("someone@example.com");

        assert!(gate.validate_admin_access(Some(&admin)).await.unwrap());
        assert!(!gate.validate_admin_access(Some(&shouting)).await.unwrap());
        assert!(!gate.validate_admin_access(Some(&stranger)).await.unwrap());
    }

    #[tokio::test]
    async fn test_authorize_outcomes() {
        let gate = AdminGate::new(MemorySettings::default());
        gate.setup_admin(&email("owner@example.com")).await.unwrap();

        assert!(matches!(
            gate.authorize(None).await,
            Err(GateError::Unauthenticated)
        ));
        assert!(matches!(
            gate.authorize(Some(&identity("someone@example.com"))).await,
            Err(GateError::PermissionDenied)
        ));

        let proof = gate
            .authorize(Some(&identity("owner@example.com")))
            .await
            .unwrap();
        assert_eq!(proof.email().as_str(), "owner@example.com");
    }

    #[tokio::test]
    async fn test_concurrent_setup_has_one_winner() {
        let store = MemorySettings::default();
        let mut tasks = tokio::task::JoinSet::new();

        for n in 0..16 {
            let gate = AdminGate::new(store.clone());
            tasks.spawn(async move {
                let candidate = Email::parse(&format!("admin{n}@example.com")).unwrap();
                gate.setup_admin(&candidate).await.map(|s| s.admin_email)
            });
        }

        let mut winners = Vec::new();
        while let Some(result) = tasks.join_next().await {
            match result.unwrap() {
                Ok(winner) => winners.push(winner),
                Err(GateError::AlreadyConfigured) => {}
                Err(other) => panic!("unexpected error: {other}"),
            }
        }

        assert_eq!(winners.len(), 1);
        let gate = AdminGate::new(store);
        assert_eq!(gate.admin_email().await.unwrap(), winners.pop());
    }

    #[tokio::test]
    async fn test_store_failure_is_not_access_denied() {
        let gate = AdminGate::new(MemorySettings::failing());
        let result = gate.authorize(Some(&identity("owner@example.com"))).await;
        assert!(matches!(result, Err(GateError::Store(_))));
    }
}
