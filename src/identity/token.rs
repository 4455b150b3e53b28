//! Service token issuing.
//!
//! Bootstrap only needs a narrow seam: given an identity and an expiry, hand
//! back a signed bearer token. The HS256 issuer below is the embedded
//! default; deployments with an external token service implement the trait
//! over their own signer.

use anyhow::{Result, anyhow};
use base64::Engine;
use chrono::Utc;
use hmac::{Hmac, Mac};
use serde_json::json;
use sha2::Sha256;

use crate::identity::model::{Identity, TokenExpiry};

type HmacSha256 = Hmac<Sha256>;

pub trait TokenIssuer: Send + Sync {
    fn generate_token(&self, identity: &Identity, expiry: TokenExpiry) -> Result<String>;
}

/// HS256 JWT issuer with a process-local signing key.
pub struct HmacTokenIssuer {
    key: Vec<u8>,
    issuer: String,
}

impl HmacTokenIssuer {
    pub fn new(key: impl Into<Vec<u8>>, issuer: impl Into<String>) -> Self {
        Self { key: key.into(), issuer: issuer.into() }
    }

    /// Issuer with a random 256-bit key. Tokens do not survive a restart;
    /// bootstrap re-reads stored mechanisms before minting new ones, so an
    /// ephemeral key only affects first-time provisioning.
    pub fn ephemeral(issuer: impl Into<String>) -> Result<Self> {
        let mut key = [0u8; 32];
        getrandom::getrandom(&mut key).map_err(|e| anyhow!(e.to_string()))?;
        Ok(Self::new(key.to_vec(), issuer))
    }
}

fn b64(bytes: &[u8]) -> String {
    base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(bytes)
}

impl TokenIssuer for HmacTokenIssuer {
    fn generate_token(&self, identity: &Identity, expiry: TokenExpiry) -> Result<String> {
        let iat = Utc::now().timestamp();
        let exp = match expiry {
            TokenExpiry::Unlimited => serde_json::Value::Null,
            TokenExpiry::Days(days) => json!(iat + i64::from(days) * 86_400),
        };
        let header = json!({ "alg": "HS256", "typ": "JWT" });
        let claims = json!({
            "sub": identity.name,
            "email": identity.email,
            "isBot": identity.is_bot,
            "iss": self.issuer,
            "iat": iat,
            "exp": exp,
        });
        let signing_input = format!(
            "{}.{}",
            b64(serde_json::to_vec(&header)?.as_slice()),
            b64(serde_json::to_vec(&claims)?.as_slice())
        );
        let mut mac = HmacSha256::new_from_slice(&self.key).map_err(|e| anyhow!(e.to_string()))?;
        mac.update(signing_input.as_bytes());
        let signature = mac.finalize().into_bytes();
        Ok(format!("{}.{}", signing_input, b64(&signature)))
    }
}
