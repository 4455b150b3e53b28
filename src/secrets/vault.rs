//! Secret storage seam.
//!
//! The storage-form pass deposits plaintext under an opaque reference; the
//! runtime-form pass resolves it back. Deployments back this with their
//! secret manager of choice; the in-memory vault serves tests and
//! single-node development.

use std::collections::HashMap;

use parking_lot::Mutex;
use thiserror::Error;

use crate::error::AppError;

#[derive(Debug, Error)]
pub enum SecretError {
    #[error("missing secret: {reference}")]
    Missing { reference: String },
    #[error("secret store unavailable: {0}")]
    Unavailable(String),
}

impl From<SecretError> for AppError {
    fn from(err: SecretError) -> Self {
        match err {
            SecretError::Missing { ref reference } => AppError::secret("missing_secret", format!("missing secret: {}", reference)),
            SecretError::Unavailable(msg) => AppError::secret("secret_store_unavailable", msg),
        }
    }
}

pub trait SecretVault: Send + Sync {
    fn put(&self, reference: &str, value: &str) -> Result<(), SecretError>;
    fn resolve(&self, reference: &str) -> Result<String, SecretError>;
}

/// Map-backed vault for tests and embedded use.
#[derive(Default)]
pub struct InMemoryVault {
    inner: Mutex<HashMap<String, String>>,
}

impl InMemoryVault {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }
}

impl SecretVault for InMemoryVault {
    fn put(&self, reference: &str, value: &str) -> Result<(), SecretError> {
        self.inner.lock().insert(reference.to_string(), value.to_string());
        Ok(())
    }

    fn resolve(&self, reference: &str) -> Result<String, SecretError> {
        self.inner
            .lock()
            .get(reference)
            .cloned()
            .ok_or_else(|| SecretError::Missing { reference: reference.to_string() })
    }
}
