//! Startup identity provisioning.
//!
//! Runs once per process start, and concurrently across HA replicas sharing
//! one persistence backend. Creation is therefore "upsert with conflict is
//! success": no lock is held across the fetch-then-write sequence, and a
//! peer winning the race is the desired outcome, not an error. A failure on
//! one identity is logged and never aborts the remaining names.

use std::sync::Arc;

use tracing::{debug, error};

use crate::error::AppResult;
use crate::identity::model::{AuthMechanism, AuthProviderKind, Identity, ServiceClientConfig, SsoBootstrapConfig, TokenExpiry};
use crate::identity::notifier::Notifier;
use crate::identity::resolver::{MechanismResolver, ResolveContext};
use crate::identity::store::{FIELD_AUTH_MECHANISM, IdentityStore, StoreError};
use crate::identity::token::TokenIssuer;

/// Reserved name credential notifications are sent from.
pub const BOOTSTRAP_ADMIN_NAME: &str = "admin";

#[derive(Clone)]
pub struct IdentityBootstrapper {
    store: Arc<dyn IdentityStore>,
    issuer: Arc<dyn TokenIssuer>,
    notifier: Arc<dyn Notifier>,
    sso: Option<SsoBootstrapConfig>,
}

impl IdentityBootstrapper {
    pub fn new(store: Arc<dyn IdentityStore>, issuer: Arc<dyn TokenIssuer>, notifier: Arc<dyn Notifier>) -> Self {
        Self { store, issuer, notifier, sso: None }
    }

    /// Supply explicit SSO provider credentials for mechanism resolution.
    pub fn with_sso(mut self, sso: SsoBootstrapConfig) -> Self {
        self.sso = Some(sso);
        self
    }

    /// Provision every configured name independently. Partial-failure
    /// tolerant: a bad name is logged and the loop continues.
    pub fn provision_identities(&self, provider: AuthProviderKind, names: &[String], domain: &str, is_admin: bool) {
        for name in names {
            if let Err(e) = self.create_or_update(provider, name, domain, is_admin) {
                error!(user = %name, error = %e, "identity bootstrap failed; continuing with remaining identities");
            }
        }
    }

    fn create_or_update(&self, provider: AuthProviderKind, name: &str, domain: &str, is_admin: bool) -> AppResult<Option<Identity>> {
        let (mut identity, existing) = match self.store.find_by_name(name, &[FIELD_AUTH_MECHANISM]) {
            Ok(found) => {
                let existing = found.authentication_mechanism.clone();
                let mut patched = found;
                // Only the admin flag and email are patched on an existing record.
                patched.is_admin = is_admin;
                patched.email = format!("{}@{}", name, domain);
                patched.touch(BOOTSTRAP_ADMIN_NAME);
                (patched, existing)
            }
            Err(StoreError::NotFound { .. }) => {
                let mut fresh = Identity::new(name, domain, name);
                fresh.is_admin = is_admin;
                fresh.is_email_verified = true;
                (fresh, None)
            }
            Err(e) => return Err(e.into()),
        };

        let resolver = MechanismResolver::new(self.issuer.as_ref(), self.notifier.as_ref());
        let ctx = ResolveContext {
            provider,
            identity: &identity,
            existing: existing.as_ref(),
            sso: self.sso.as_ref(),
        };
        let mechanism = resolver.resolve(&ctx)?;
        identity.authentication_mechanism = Some(mechanism);
        self.add_or_update_identity(identity)
    }

    /// Provision a service (bot) identity. The stored record is consulted
    /// only for a current mechanism; if none is set, a token configured on
    /// the client takes precedence over minting a fresh unlimited JWT.
    /// Returns `None` when the upsert lost the benign already-exists race.
    pub fn provision_service_identity(&self, mut identity: Identity, client: &ServiceClientConfig) -> AppResult<Option<Identity>> {
        let existing = match self.store.find_by_name(&identity.name, &[FIELD_AUTH_MECHANISM]) {
            Ok(stored) => stored.authentication_mechanism,
            Err(StoreError::NotFound { .. }) => {
                debug!(bot = %identity.name, "service identity does not exist yet");
                None
            }
            Err(e) => {
                debug!(bot = %identity.name, error = %e, "could not retrieve stored mechanism");
                None
            }
        };
        let mechanism = match existing {
            Some(mechanism) => mechanism,
            None => match client.configured_token() {
                Some(token) => AuthMechanism::Jwt { token: token.to_string(), expiry: TokenExpiry::Unlimited },
                None => {
                    let token = self.issuer.generate_token(&identity, TokenExpiry::Unlimited)?;
                    AuthMechanism::Jwt { token, expiry: TokenExpiry::Unlimited }
                }
            },
        };
        identity.is_bot = true;
        identity.authentication_mechanism = Some(mechanism);
        self.add_or_update_identity(identity)
    }

    /// Idempotent upsert. A conflict means an HA peer already created the
    /// identity between our read and write; that is success, reported as
    /// `None`. The in-memory mechanism is dropped before logging so no
    /// credential material can reach a log line.
    pub fn add_or_update_identity(&self, mut identity: Identity) -> AppResult<Option<Identity>> {
        match self.store.upsert(&identity) {
            Ok(stored) => {
                debug!(user = %stored.name, "stored identity entry");
                Ok(Some(stored))
            }
            Err(StoreError::Conflict { .. }) => {
                identity.authentication_mechanism = None;
                debug!(user = %identity.name, "identity entry already exists");
                Ok(None)
            }
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
#[path = "bootstrap_tests.rs"]
mod bootstrap_tests;
