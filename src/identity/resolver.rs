//! Authentication mechanism resolution.
//!
//! One pass per identity per bootstrap. The rules form an ordered decision
//! table; the first rule whose condition holds builds the mechanism:
//!
//! 1. `KeepExisting`: a stored or caller-supplied mechanism is authoritative
//!    and never rotated on restart.
//! 2. `BasicInvite`: local/basic provider. Hash a freshly generated random
//!    password and queue the one-time credentials notification.
//! 3. `SsoConfigured`: explicit SSO provider credentials were supplied.
//! 4. `JwtFallback`: terminal rule for every other provider and for bots,
//!    JWT with unlimited expiry. Must stay last; it always applies.

use anyhow::{Result, bail};
use tracing::{debug, warn};

use crate::identity::bootstrap::BOOTSTRAP_ADMIN_NAME;
use crate::identity::model::{AuthMechanism, AuthProviderKind, Identity, SsoBootstrapConfig, TokenExpiry};
use crate::identity::notifier::Notifier;
use crate::identity::token::TokenIssuer;
use crate::security;

/// Inputs for one resolution pass.
pub struct ResolveContext<'a> {
    pub provider: AuthProviderKind,
    /// Identity being provisioned, already patched for this pass.
    pub identity: &'a Identity,
    /// Mechanism found on the stored record, if any.
    pub existing: Option<&'a AuthMechanism>,
    /// Explicit SSO bootstrap settings, if the deployment supplied them.
    pub sso: Option<&'a SsoBootstrapConfig>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MechanismRule {
    KeepExisting,
    BasicInvite,
    SsoConfigured,
    JwtFallback,
}

const RULES: &[MechanismRule] = &[
    MechanismRule::KeepExisting,
    MechanismRule::BasicInvite,
    MechanismRule::SsoConfigured,
    MechanismRule::JwtFallback,
];

impl MechanismRule {
    pub fn applies(&self, ctx: &ResolveContext) -> bool {
        match self {
            MechanismRule::KeepExisting => ctx.existing.is_some(),
            MechanismRule::BasicInvite => ctx.provider.is_basic(),
            MechanismRule::SsoConfigured => ctx.sso.is_some(),
            MechanismRule::JwtFallback => true,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            MechanismRule::KeepExisting => "keep-existing",
            MechanismRule::BasicInvite => "basic-invite",
            MechanismRule::SsoConfigured => "sso-configured",
            MechanismRule::JwtFallback => "jwt-fallback",
        }
    }
}

/// First matching rule in table order. Total: the terminal rule always applies.
pub fn select_rule(ctx: &ResolveContext) -> MechanismRule {
    RULES
        .iter()
        .copied()
        .find(|r| r.applies(ctx))
        .unwrap_or(MechanismRule::JwtFallback)
}

pub struct MechanismResolver<'a> {
    issuer: &'a dyn TokenIssuer,
    notifier: &'a dyn Notifier,
}

impl<'a> MechanismResolver<'a> {
    pub fn new(issuer: &'a dyn TokenIssuer, notifier: &'a dyn Notifier) -> Self {
        Self { issuer, notifier }
    }

    pub fn resolve(&self, ctx: &ResolveContext) -> Result<AuthMechanism> {
        let rule = select_rule(ctx);
        debug!(user = %ctx.identity.name, rule = rule.name(), "auth mechanism rule selected");
        match rule {
            MechanismRule::KeepExisting => match ctx.existing {
                Some(mechanism) => Ok(mechanism.clone()),
                None => bail!("keep-existing selected without a stored mechanism"),
            },
            MechanismRule::BasicInvite => {
                let password = self.bootstrap_password();
                let hashed = security::hash_password(&password)?;
                // One-time invite: this rule only runs when no mechanism existed.
                self.notifier.send_credential_email(ctx.identity, BOOTSTRAP_ADMIN_NAME);
                Ok(AuthMechanism::Basic { hashed_password: hashed })
            }
            MechanismRule::SsoConfigured => match ctx.sso {
                Some(sso) => Ok(AuthMechanism::Sso { provider: sso.provider, config: sso.config.clone() }),
                None => bail!("sso-configured selected without sso settings"),
            },
            MechanismRule::JwtFallback => {
                let token = self.issuer.generate_token(ctx.identity, TokenExpiry::Unlimited)?;
                Ok(AuthMechanism::Jwt { token, expiry: TokenExpiry::Unlimited })
            }
        }
    }

    /// Random one-time password when the invite can be delivered, otherwise
    /// the well-known default so startup is never blocked on the mail path.
    fn bootstrap_password(&self) -> String {
        let generated = self
            .notifier
            .test_connection()
            .and_then(|_| security::generate_random_password());
        match generated {
            Ok(password) => password,
            Err(e) => {
                warn!(error = %e, "password generation degraded; falling back to default administrative password");
                security::DEFAULT_ADMIN_PASSWORD.to_string()
            }
        }
    }
}
