use time::Duration;

use crate::hasher::SecretKey;

pub const DEFAULT_PATH_PREFIX: &str = "/api";

/// 24 hours
pub const DEFAULT_MAX_AGE: Duration = Duration::seconds(60 * 60 * 24);

/// Settings for the CSRF middleware
#[derive(Debug, Clone)]
pub struct CsrfConfig {
    /// Key for the token hasher
    pub secret: SecretKey,
    /// Requests outside this prefix bypass the middleware
    pub path_prefix: String,
    /// Set the `Secure` attribute on the token cookie
    pub secure_cookie: bool,
    /// Lifetime of the token cookie
    pub max_age: Duration,
}

impl CsrfConfig {
    pub fn new(secret: SecretKey) -> Self {
        Self {
            secret,
            path_prefix: DEFAULT_PATH_PREFIX.to_string(),
            secure_cookie: false,
            max_age: DEFAULT_MAX_AGE,
        }
    }

    pub fn with_path_prefix<S: Into<String>>(mut self, prefix: S) -> Self {
        self.path_prefix = normalize_prefix(&prefix.into());
        self
    }

    pub fn with_secure_cookie(mut self, secure: bool) -> Self {
        self.secure_cookie = secure;
        self
    }

    pub fn with_max_age(mut self, max_age: Duration) -> Self {
        self.max_age = max_age;
        self
    }

    /// Whether `path` falls under the protected prefix.
    ///
    /// Matching is per path segment: `/api` covers `/api` and `/api/groups`
    /// but not `/apiary`.
    pub fn protects(&self, path: &str) -> bool {
        let prefix = self.path_prefix.as_str();
        if prefix == "/" {
            return true;
        }
        match path.strip_prefix(prefix) {
            Some(rest) => rest.is_empty() || rest.starts_with('/'),
            None => false,
        }
    }
}

// "/api/", "api" and "/api" all normalize to "/api"; "" and "/" to "/".
fn normalize_prefix(prefix: &str) -> String {
    let trimmed = prefix.trim().trim_matches('/');
    if trimmed.is_empty() {
        "/".to_string()
    } else {
        format!("/{trimmed}")
    }
}
