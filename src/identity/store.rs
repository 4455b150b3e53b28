//! Persistence seam for identities.
//!
//! The real deployment backs this with the platform's SQL repository; the
//! in-memory implementation here serves tests and single-node development.
//! Upserts are atomic from the caller's perspective: bootstrap never holds a
//! lock across its fetch-then-write sequence and instead tolerates the
//! concurrent-create race by treating `Conflict` as success.

use std::collections::HashMap;

use parking_lot::Mutex;
use thiserror::Error;

use crate::error::AppError;
use crate::identity::model::Identity;

/// Field projections callers may request on lookup. The authentication
/// mechanism is sensitive and only returned when asked for by name.
pub const FIELD_AUTH_MECHANISM: &str = "authentication_mechanism";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("identity not found: {name}")]
    NotFound { name: String },
    #[error("identity already exists: {name}")]
    Conflict { name: String },
    #[error("identity store i/o: {0}")]
    Io(String),
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { ref name } => AppError::not_found("identity_not_found", format!("identity not found: {}", name)),
            StoreError::Conflict { ref name } => AppError::conflict("identity_exists", format!("identity already exists: {}", name)),
            StoreError::Io(msg) => AppError::io("identity_store_io", msg),
        }
    }
}

pub trait IdentityStore: Send + Sync {
    /// Fetch by natural key. `fields` is the projection: fields outside the
    /// identity's always-present core are stripped unless requested.
    fn find_by_name(&self, name: &str, fields: &[&str]) -> Result<Identity, StoreError>;

    /// Create-or-update keyed by name, returning the stored row. A unique-key
    /// violation from a concurrently-inserting peer surfaces as `Conflict`.
    fn upsert(&self, identity: &Identity) -> Result<Identity, StoreError>;
}

/// Map-backed store for tests and embedded use.
#[derive(Default)]
pub struct InMemoryIdentityStore {
    inner: Mutex<HashMap<String, Identity>>,
}

impl InMemoryIdentityStore {
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

impl IdentityStore for InMemoryIdentityStore {
    fn find_by_name(&self, name: &str, fields: &[&str]) -> Result<Identity, StoreError> {
        let map = self.inner.lock();
        let mut found = map
            .get(name)
            .cloned()
            .ok_or_else(|| StoreError::NotFound { name: name.to_string() })?;
        if !fields.contains(&FIELD_AUTH_MECHANISM) {
            found.authentication_mechanism = None;
        }
        Ok(found)
    }

    fn upsert(&self, identity: &Identity) -> Result<Identity, StoreError> {
        let mut map = self.inner.lock();
        let mut stored = identity.clone();
        if let Some(current) = map.get(&identity.name) {
            // Name is the natural key; the stored id survives updates.
            stored.id = current.id;
        }
        map.insert(stored.name.clone(), stored.clone());
        Ok(stored)
    }
}
