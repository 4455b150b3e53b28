//! Identity provisioning: records, authentication mechanisms, and the
//! startup bootstrap that seeds admin and bot accounts.
//! Keep the public surface thin and split implementation across sub-modules.

mod bootstrap;
mod model;
mod notifier;
mod resolver;
mod roles;
mod store;
mod token;

pub use bootstrap::{BOOTSTRAP_ADMIN_NAME, IdentityBootstrapper};
pub use model::{AuthMechanism, AuthProviderKind, EntityReference, Identity, ServiceClientConfig, SsoBootstrapConfig, TokenExpiry};
pub use notifier::{LogNotifier, Notifier};
pub use resolver::{MechanismResolver, MechanismRule, ResolveContext, select_rule};
pub use roles::{INGESTION_BOT, PROFILER_BOT, QUALITY_BOT, RoleLookup, resolve_bot_role_name, role_for_bot};
pub use store::{FIELD_AUTH_MECHANISM, IdentityStore, InMemoryIdentityStore, StoreError};
pub use token::{HmacTokenIssuer, TokenIssuer};
