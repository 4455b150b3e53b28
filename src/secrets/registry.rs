//! Config-type-to-transformer registry.
//!
//! Built once before the server starts taking traffic and read-only from
//! then on, so lookups need no synchronization. Lookup is total: a tag with
//! no registered transformer resolves to the pass-through transformer, which
//! is the deliberate default for config types that carry no secrets.

use std::collections::HashMap;
use std::sync::Arc;

use once_cell::sync::OnceCell;

use crate::error::{AppError, AppResult};
use crate::secrets::transformer::{
    DashboardConnectionTransformer, DatabaseConnectionTransformer, PassthroughTransformer,
    PipelineConnectionTransformer, SecretTransformer, SsoAuthTransformer, StorageConnectionTransformer,
};
use crate::secrets::vault::{SecretError, SecretVault};
use serde_json::Value;

pub struct TransformerRegistry {
    by_tag: HashMap<&'static str, Arc<dyn SecretTransformer>>,
    passthrough: Arc<dyn SecretTransformer>,
}

impl TransformerRegistry {
    pub fn new() -> Self {
        Self { by_tag: HashMap::new(), passthrough: Arc::new(PassthroughTransformer) }
    }

    /// Register a transformer under its config tag. A duplicate tag is a
    /// wiring mistake in process initialization and fails loudly rather than
    /// silently replacing the earlier registration.
    pub fn register(&mut self, transformer: Arc<dyn SecretTransformer>) -> AppResult<()> {
        let tag = transformer.config_tag();
        if self.by_tag.contains_key(tag) {
            return Err(AppError::conflict("duplicate_transformer", format!("transformer already registered for tag {}", tag)));
        }
        self.by_tag.insert(tag, transformer);
        Ok(())
    }

    /// Total lookup: never fails, unknown tags get the pass-through.
    pub fn lookup(&self, tag: &str) -> Arc<dyn SecretTransformer> {
        self.by_tag.get(tag).cloned().unwrap_or_else(|| self.passthrough.clone())
    }

    pub fn registered_tags(&self) -> Vec<&'static str> {
        let mut tags: Vec<&'static str> = self.by_tag.keys().copied().collect();
        tags.sort_unstable();
        tags
    }
}

impl Default for TransformerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

static REGISTRY: OnceCell<TransformerRegistry> = OnceCell::new();

fn built_in_registry() -> TransformerRegistry {
    let mut reg = TransformerRegistry::new();
    let transformers: Vec<Arc<dyn SecretTransformer>> = vec![
        Arc::new(DatabaseConnectionTransformer),
        Arc::new(DashboardConnectionTransformer),
        Arc::new(PipelineConnectionTransformer),
        Arc::new(StorageConnectionTransformer),
        Arc::new(SsoAuthTransformer),
    ];
    for t in transformers {
        reg.register(t).expect("duplicate transformer registration during startup");
    }
    reg
}

/// Process-wide registry, populated with the built-in transformers on first
/// access and immutable afterwards.
pub fn global() -> &'static TransformerRegistry {
    REGISTRY.get_or_init(built_in_registry)
}

/// Convenience entry points used at every persistence-boundary crossing.
pub fn to_storage_form(tag: &str, scope: &str, config: &Value, vault: &dyn SecretVault) -> Result<Value, SecretError> {
    global().lookup(tag).to_storage_form(scope, config, vault)
}

pub fn to_runtime_form(tag: &str, config: &Value, vault: &dyn SecretVault) -> Result<Value, SecretError> {
    global().lookup(tag).to_runtime_form(config, vault)
}
