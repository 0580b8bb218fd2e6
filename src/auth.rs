//! Shared-passphrase login and signed bearer tokens.
//!
//! Tokens are `base64url(claims_json) + "." + hex(sha256(secret.payload))`.
//! The core treats this as an opaque issue/verify capability; handlers only
//! require that a verified claim set is present before touching data.

use crate::config::Auth;
use crate::error::CrmError;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use chrono::{Duration, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    pub sub: String,
    pub role: String,
    /// Expiry as unix seconds.
    pub exp: i64,
}

#[derive(Debug, Clone)]
pub struct TokenSigner {
    secret: String,
    ttl_days: i64,
}

impl TokenSigner {
    pub fn new(secret: impl Into<String>, ttl_days: i64) -> Self {
        TokenSigner {
            secret: secret.into(),
            ttl_days,
        }
    }

    pub fn from_config(auth: &Auth) -> Self {
        Self::new(auth.token_secret.clone(), auth.token_ttl_days)
    }

    pub fn ttl_seconds(&self) -> i64 {
        self.ttl_days * 86_400
    }

    /// Issue a token for the given subject/role, expiring after the
    /// configured TTL.
    pub fn issue(&self, sub: &str, role: &str) -> String {
        let claims = Claims {
            sub: sub.to_string(),
            role: role.to_string(),
            exp: (Utc::now() + Duration::days(self.ttl_days)).timestamp(),
        };
        self.encode(&claims)
    }

    fn encode(&self, claims: &Claims) -> String {
        let payload =
            URL_SAFE_NO_PAD.encode(serde_json::to_vec(claims).expect("claims serialize"));
        format!("{}.{}", payload, self.sign(&payload))
    }

    fn sign(&self, payload: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(self.secret.as_bytes());
        hasher.update(b".");
        hasher.update(payload.as_bytes());
        hex::encode(hasher.finalize())
    }

    /// Verify signature and expiry, returning the embedded claims.
    pub fn verify(&self, token: &str) -> Result<Claims, CrmError> {
        let (payload, sig) = token
            .rsplit_once('.')
            .ok_or_else(|| CrmError::NotAuthenticated("malformed token".into()))?;
        if self.sign(payload) != sig {
            return Err(CrmError::NotAuthenticated("invalid token".into()));
        }
        let raw = URL_SAFE_NO_PAD
            .decode(payload)
            .map_err(|_| CrmError::NotAuthenticated("malformed token".into()))?;
        let claims: Claims = serde_json::from_slice(&raw)
            .map_err(|_| CrmError::NotAuthenticated("malformed token".into()))?;
        if claims.exp <= Utc::now().timestamp() {
            return Err(CrmError::NotAuthenticated("token expired".into()));
        }
        Ok(claims)
    }
}

/// Check a login passphrase against the configured SHA-256 digest.
pub fn verify_passphrase(passphrase: &str, stored_hex_digest: &str) -> bool {
    let digest = hex::encode(Sha256::digest(passphrase.as_bytes()));
    digest == stored_hex_digest.trim().to_lowercase()
}
