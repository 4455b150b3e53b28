//! Secret-safe transformation of connection configs at the storage boundary.
//! On write a config's declared secret fields become opaque vault references;
//! on read they resolve back. Keep the public surface thin and split
//! implementation across sub-modules.

mod registry;
mod transformer;
mod vault;

pub use registry::{TransformerRegistry, global, to_runtime_form, to_storage_form};
pub use transformer::{
    DashboardConnectionTransformer, DatabaseConnectionTransformer, PassthroughTransformer,
    PipelineConnectionTransformer, SECRET_SCHEME, SecretTransformer, SsoAuthTransformer,
    StorageConnectionTransformer, tags,
};
pub use vault::{InMemoryVault, SecretError, SecretVault};

#[cfg(test)]
#[path = "secrets_tests.rs"]
mod secrets_tests;
