//! Keyed hashing of CSRF tokens
//!
//! Tokens are never compared directly. Both sides are first run through
//! HMAC-SHA256 keyed with the process-wide secret, and the digests are
//! compared in constant time.

use hmac::{Hmac, Mac};
use serde::{Deserialize, Deserializer};
use sha2::Sha256;
use subtle::{Choice, ConstantTimeEq};

use crate::{
    error::{CsrfError, CsrfResult},
    token::CsrfToken,
};

type HmacSha256 = Hmac<Sha256>;

const DIGEST_LENGTH: usize = 32;

/// Server-side secret used to key the token hasher.
#[derive(Clone)]
pub struct SecretKey(String);

impl std::fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("SecretKey").field(&"***").finish()
    }
}

impl std::fmt::Display for SecretKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "***")
    }
}

impl SecretKey {
    /// Wrap a configured secret. Empty or blank secrets are rejected.
    pub fn new<S: Into<String>>(secret: S) -> CsrfResult<Self> {
        let secret = secret.into();
        if secret.trim().is_empty() {
            return Err(CsrfError::MissingSecret);
        }
        Ok(Self(secret))
    }

    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'de> Deserialize<'de> for SecretKey {
    fn deserialize<D>(deserializer: D) -> Result<SecretKey, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        SecretKey::new(s).map_err(serde::de::Error::custom)
    }
}

/// HMAC output for a single token.
///
/// Only comparable through [`ConstantTimeEq`].
#[derive(Clone, Copy)]
pub struct TokenDigest([u8; DIGEST_LENGTH]);

impl TokenDigest {
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl ConstantTimeEq for TokenDigest {
    fn ct_eq(&self, other: &Self) -> Choice {
        self.0[..].ct_eq(&other.0[..])
    }
}

impl std::fmt::Debug for TokenDigest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("TokenDigest").field(&hex::encode(self.0)).finish()
    }
}

/// Secret-keyed token hasher, keyed once at startup.
#[derive(Clone)]
pub struct TokenHasher {
    mac: HmacSha256,
}

impl std::fmt::Debug for TokenHasher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenHasher").finish_non_exhaustive()
    }
}

impl TokenHasher {
    pub fn new(secret: &SecretKey) -> CsrfResult<Self> {
        let mac = HmacSha256::new_from_slice(secret.as_bytes())
            .map_err(|e| CsrfError::InvalidSecret(e.to_string()))?;
        Ok(Self { mac })
    }

    /// Hash a token. Same token and secret always give the same digest.
    pub fn hash(&self, token: &CsrfToken) -> TokenDigest {
        let mut mac = self.mac.clone();
        mac.update(token.value().as_bytes());

        let mut digest = [0u8; DIGEST_LENGTH];
        digest.copy_from_slice(&mac.finalize().into_bytes());
        TokenDigest(digest)
    }
}
