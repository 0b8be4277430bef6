//! Reading and writing the CSRF token cookie

use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use time::Duration;

use crate::{config::CsrfConfig, error::CsrfResult, token::CsrfToken};

/// Cookie name for CSRF token storage
pub const CSRF_COOKIE_NAME: &str = "csrf_token";

#[derive(Debug, Clone)]
pub struct CookieStore {
    secure: bool,
    max_age: Duration,
}

impl CookieStore {
    pub fn new(secure: bool, max_age: Duration) -> Self {
        Self { secure, max_age }
    }

    pub fn from_config(config: &CsrfConfig) -> Self {
        Self::new(config.secure_cookie, config.max_age)
    }

    /// Generate a fresh token and write it into the outgoing cookie jar.
    ///
    /// Any token cookie already in the jar is overwritten.
    pub fn issue(&self, jar: CookieJar) -> CsrfResult<(CookieJar, CsrfToken)> {
        let token = CsrfToken::generate()?;
        let jar = jar.add(self.build_cookie(&token));
        Ok((jar, token))
    }

    /// Current token cookie value, if the client sent one.
    pub fn read(&self, jar: &CookieJar) -> Option<String> {
        jar.get(CSRF_COOKIE_NAME)
            .map(|cookie| cookie.value().to_string())
            .filter(|value| !value.is_empty())
    }

    fn build_cookie(&self, token: &CsrfToken) -> Cookie<'static> {
        Cookie::build((CSRF_COOKIE_NAME, token.value().to_string()))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Strict)
            .secure(self.secure)
            .max_age(self.max_age)
            .build()
    }
}
