//! Core identity records and authentication mechanism variants.
//!
//! An `Identity` is a user or service (bot) account. Its `name` is the
//! natural key: unique and immutable once created. The attached
//! `AuthMechanism` is exactly one of password-hash, JWT, or SSO; absence is
//! modeled as `None` and drives the bootstrap create path.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Identity {
    pub id: Uuid,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    pub email: String,
    pub is_admin: bool,
    pub is_bot: bool,
    pub is_email_verified: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authentication_mechanism: Option<AuthMechanism>,
    pub updated_by: String,
    /// Epoch milliseconds of the last write.
    pub updated_at: i64,
}

impl Identity {
    /// Fresh identity with a synthesized `name@domain` email. Callers flip
    /// `is_admin`/`is_bot` as needed before persisting.
    pub fn new(name: &str, domain: &str, updated_by: &str) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.to_string(),
            display_name: None,
            email: format!("{}@{}", name, domain),
            is_admin: false,
            is_bot: false,
            is_email_verified: false,
            authentication_mechanism: None,
            updated_by: updated_by.to_string(),
            updated_at: Utc::now().timestamp_millis(),
        }
    }

    /// Fresh bot identity; bots are never admins.
    pub fn bot(name: &str, domain: &str) -> Self {
        let mut id = Self::new(name, domain, name);
        id.is_bot = true;
        id
    }

    pub fn has_mechanism(&self) -> bool {
        self.authentication_mechanism.is_some()
    }

    pub fn touch(&mut self, updated_by: &str) {
        self.updated_by = updated_by.to_string();
        self.updated_at = Utc::now().timestamp_millis();
    }
}

/// Credential scheme attached to an identity. Exactly one variant is active;
/// a missing mechanism is `Option::None` on the identity.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "auth_type", rename_all = "snake_case")]
pub enum AuthMechanism {
    /// One-way Argon2 PHC hash; never a plaintext password.
    Basic { hashed_password: String },
    Jwt { token: String, expiry: TokenExpiry },
    Sso { provider: AuthProviderKind, config: serde_json::Value },
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TokenExpiry {
    Unlimited,
    Days(u32),
}

/// Active authentication provider for the deployment, as configured by the
/// embedding server.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum AuthProviderKind {
    Basic,
    Ldap,
    Google,
    Okta,
    Auth0,
    Azure,
    CustomOidc,
    Saml,
}

impl AuthProviderKind {
    pub fn is_basic(&self) -> bool {
        matches!(self, AuthProviderKind::Basic)
    }
}

/// Pointer to another stored entity (role, team), resolved by collaborators.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EntityReference {
    pub id: Uuid,
    pub name: String,
    pub entity_type: String,
}

/// Connection settings the pipeline service client was configured with.
/// A pre-issued token here takes precedence over generating a fresh one for
/// the service identity.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServiceClientConfig {
    pub api_endpoint: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jwt_token: Option<String>,
}

impl ServiceClientConfig {
    pub fn configured_token(&self) -> Option<&str> {
        self.jwt_token.as_deref().filter(|t| !t.is_empty())
    }
}

/// Explicit SSO bootstrap settings; only present when the deployment was
/// configured with provider credentials.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SsoBootstrapConfig {
    pub provider: AuthProviderKind,
    pub config: serde_json::Value,
}
