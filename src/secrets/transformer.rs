//! Per-type secret transformation.
//!
//! A connection config crosses the storage boundary as JSON. Each config
//! type declares which of its fields are secrets (JSON-pointer paths); the
//! default trait machinery masks them into `secret://` references on the way
//! in and resolves the references on the way out. Both directions return a
//! new value and leave the input untouched. Fields that are absent, or
//! already in the opposite form, are skipped rather than treated as errors.

use serde_json::Value;

use crate::secrets::vault::{SecretError, SecretVault};

pub const SECRET_SCHEME: &str = "secret://";

/// Stable config type tags used as registry keys.
pub mod tags {
    pub const DATABASE_CONNECTION: &str = "database-connection";
    pub const DASHBOARD_CONNECTION: &str = "dashboard-connection";
    pub const PIPELINE_CONNECTION: &str = "pipeline-connection";
    pub const STORAGE_CONNECTION: &str = "storage-connection";
    pub const SSO_AUTH: &str = "sso-auth";
}

fn secret_reference(tag: &str, scope: &str, pointer: &str) -> String {
    // pointer carries its leading slash: secret://<tag>/<scope>/<field path>
    format!("{}{}/{}{}", SECRET_SCHEME, tag, scope, pointer)
}

pub trait SecretTransformer: Send + Sync {
    fn config_tag(&self) -> &'static str;

    /// JSON-pointer paths of the fields this config type declares secret.
    fn secret_paths(&self) -> &'static [&'static str] {
        &[]
    }

    /// Persist-safe form: each declared secret field is written to the vault
    /// and replaced by its reference. `scope` is the owning entity's name so
    /// two instances of the same config type cannot collide.
    fn to_storage_form(&self, scope: &str, config: &Value, vault: &dyn SecretVault) -> Result<Value, SecretError> {
        let mut out = config.clone();
        for pointer in self.secret_paths() {
            let Some(slot) = out.pointer_mut(pointer) else { continue };
            let Some(plain) = slot.as_str() else { continue };
            if plain.starts_with(SECRET_SCHEME) {
                continue;
            }
            let reference = secret_reference(self.config_tag(), scope, pointer);
            vault.put(&reference, plain)?;
            *slot = Value::String(reference);
        }
        Ok(out)
    }

    /// Runtime form: references resolve back to usable plaintext. Fails when
    /// the backing secret is missing or the vault is unreachable.
    fn to_runtime_form(&self, config: &Value, vault: &dyn SecretVault) -> Result<Value, SecretError> {
        let mut out = config.clone();
        for pointer in self.secret_paths() {
            let Some(slot) = out.pointer_mut(pointer) else { continue };
            let Some(stored) = slot.as_str() else { continue };
            if !stored.starts_with(SECRET_SCHEME) {
                continue;
            }
            let plain = vault.resolve(stored)?;
            *slot = Value::String(plain);
        }
        Ok(out)
    }
}

/// Identity transformer for config types with no declared secrets; the
/// registry hands this out for every unregistered tag.
pub struct PassthroughTransformer;

impl SecretTransformer for PassthroughTransformer {
    fn config_tag(&self) -> &'static str {
        "passthrough"
    }
}

pub struct DatabaseConnectionTransformer;

impl SecretTransformer for DatabaseConnectionTransformer {
    fn config_tag(&self) -> &'static str {
        tags::DATABASE_CONNECTION
    }
    fn secret_paths(&self) -> &'static [&'static str] {
        &["/password"]
    }
}

pub struct DashboardConnectionTransformer;

impl SecretTransformer for DashboardConnectionTransformer {
    fn config_tag(&self) -> &'static str {
        tags::DASHBOARD_CONNECTION
    }
    fn secret_paths(&self) -> &'static [&'static str] {
        &["/password", "/api_key"]
    }
}

pub struct PipelineConnectionTransformer;

impl SecretTransformer for PipelineConnectionTransformer {
    fn config_tag(&self) -> &'static str {
        tags::PIPELINE_CONNECTION
    }
    fn secret_paths(&self) -> &'static [&'static str] {
        &["/password", "/client/jwt_token"]
    }
}

pub struct StorageConnectionTransformer;

impl SecretTransformer for StorageConnectionTransformer {
    fn config_tag(&self) -> &'static str {
        tags::STORAGE_CONNECTION
    }
    fn secret_paths(&self) -> &'static [&'static str] {
        &["/credentials/private_key"]
    }
}

pub struct SsoAuthTransformer;

impl SecretTransformer for SsoAuthTransformer {
    fn config_tag(&self) -> &'static str {
        tags::SSO_AUTH
    }
    fn secret_paths(&self) -> &'static [&'static str] {
        &["/client_secret"]
    }
}
