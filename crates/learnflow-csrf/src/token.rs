//! CSRF token generation
//!
//! Tokens are 32 bytes from the operating system CSPRNG, hex encoded.

use rand::{rngs::OsRng, TryRngCore};

use crate::error::{CsrfError, CsrfResult};

const CSRF_TOKEN_LENGTH: usize = 32;

/// Length of a token in its hex-encoded form
pub const CSRF_TOKEN_HEX_LENGTH: usize = CSRF_TOKEN_LENGTH * 2;

/// Opaque CSRF token
#[derive(Clone, PartialEq, Eq)]
pub struct CsrfToken(String);

impl std::fmt::Debug for CsrfToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("CsrfToken").field(&"***").finish()
    }
}

impl CsrfToken {
    /// Generate a new random CSRF token
    ///
    /// Fails with [`CsrfError::Entropy`] if the OS random source is
    /// unavailable. There is no fallback generator.
    pub fn generate() -> CsrfResult<Self> {
        let mut bytes = [0u8; CSRF_TOKEN_LENGTH];
        OsRng
            .try_fill_bytes(&mut bytes)
            .map_err(|e| CsrfError::Entropy(e.to_string()))?;
        Ok(CsrfToken(hex::encode(bytes)))
    }

    /// Parse a token received from a client
    pub fn parse(value: &str) -> CsrfResult<Self> {
        if value.len() != CSRF_TOKEN_HEX_LENGTH || !value.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(CsrfError::MalformedToken);
        }
        Ok(CsrfToken(value.to_string()))
    }

    /// Get the token value
    pub fn value(&self) -> &str {
        &self.0
    }
}
