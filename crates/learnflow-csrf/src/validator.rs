//! Double-submit token validation

use subtle::ConstantTimeEq;
use tracing::debug;

use crate::{hasher::TokenHasher, token::CsrfToken};

#[derive(Debug, Clone)]
pub struct Validator {
    hasher: TokenHasher,
}

impl Validator {
    pub fn new(hasher: TokenHasher) -> Self {
        Self { hasher }
    }

    /// Check a header token against the cookie token.
    ///
    /// Both tokens are hashed with the server secret and the digests compared
    /// in constant time. A missing or malformed token on either side fails.
    pub fn validate(&self, cookie_token: Option<&str>, header_token: Option<&str>) -> bool {
        let Some(header_token) = header_token else {
            debug!("CSRF validation failed: no header token");
            return false;
        };
        let Some(cookie_token) = cookie_token else {
            debug!("CSRF validation failed: no cookie token");
            return false;
        };

        let (header_token, cookie_token) =
            match (CsrfToken::parse(header_token), CsrfToken::parse(cookie_token)) {
                (Ok(header), Ok(cookie)) => (header, cookie),
                (Err(e), _) | (_, Err(e)) => {
                    debug!("CSRF validation failed: {}", e);
                    return false;
                }
            };

        let header_digest = self.hasher.hash(&header_token);
        let cookie_digest = self.hasher.hash(&cookie_token);

        header_digest.ct_eq(&cookie_digest).into()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hasher::SecretKey;

    fn validator() -> Validator {
        Validator::new(TokenHasher::new(&SecretKey::new("test-secret").unwrap()).unwrap())
    }

    #[test]
    fn test_round_trip() {
        let validator = validator();
        let token = CsrfToken::generate().unwrap();
        assert!(validator.validate(Some(token.value()), Some(token.value())));
    }

    #[test]
    fn test_tamper_detection() {
        let validator = validator();
        let cookie = CsrfToken::generate().unwrap();
        let header = CsrfToken::generate().unwrap();
        assert!(!validator.validate(Some(cookie.value()), Some(header.value())));

        // Single flipped character at either end
        let value = cookie.value();
        let last = if value.ends_with('0') { "1" } else { "0" };
        let tampered_tail = format!("{}{}", &value[..63], last);
        assert!(!validator.validate(Some(value), Some(&tampered_tail)));

        let first = if value.starts_with('0') { "1" } else { "0" };
        let tampered_head = format!("{}{}", first, &value[1..]);
        assert!(!validator.validate(Some(value), Some(&tampered_head)));
    }

    #[test]
    fn test_missing_tokens() {
        let validator = validator();
        let token = CsrfToken::generate().unwrap();
        assert!(!validator.validate(None, Some(token.value())));
        assert!(!validator.validate(Some(token.value()), None));
        assert!(!validator.validate(None, None));
    }

    #[test]
    fn test_malformed_tokens() {
        let validator = validator();
        assert!(!validator.validate(Some("not-a-token"), Some("not-a-token")));
        assert!(!validator.validate(Some(""), Some("")));

        // Hex case is part of the token: uppercase copies are not equal
        let token = CsrfToken::generate().unwrap();
        let upper = token.value().to_uppercase();
        if upper != token.value() {
            assert!(!validator.validate(Some(token.value()), Some(&upper)));
        }
    }

    #[test]
    fn test_different_secrets_agree_on_equality() {
        let other =
            Validator::new(TokenHasher::new(&SecretKey::new("other-secret").unwrap()).unwrap());
        let token = CsrfToken::generate().unwrap();
        assert!(validator().validate(Some(token.value()), Some(token.value())));
        assert!(other.validate(Some(token.value()), Some(token.value())));
    }
}
