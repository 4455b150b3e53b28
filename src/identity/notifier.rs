//! Credential notification seam. Delivery is best-effort: implementations
//! log failures instead of propagating them, so a broken mail subsystem can
//! never abort bootstrap.

use anyhow::Result;
use tracing::info;

use crate::identity::model::Identity;

pub trait Notifier: Send + Sync {
    /// Cheap reachability probe. Bootstrap only generates a random one-time
    /// password when the invite carrying it can actually be delivered.
    fn test_connection(&self) -> Result<()> {
        Ok(())
    }

    /// Queue a welcome/credentials notification for the identity. The
    /// plaintext credential never crosses this interface.
    fn send_credential_email(&self, identity: &Identity, from_name: &str);
}

/// Logging stand-in used when no mail transport is configured.
#[derive(Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn send_credential_email(&self, identity: &Identity, from_name: &str) {
        info!(user = %identity.name, from = %from_name, "credential notification queued");
    }
}
