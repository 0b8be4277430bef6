use axum::{extract::FromRequestParts, http::request::Parts};

use crate::{error::CsrfError, token::CsrfToken};

/// Extractor for the token the middleware issued for the current request.
///
/// Lets handlers return the token in a body while the cookie and response
/// header carry the same value.
#[derive(Clone, Debug)]
pub struct IssuedToken(pub CsrfToken);

impl IssuedToken {
    pub fn value(&self) -> &str {
        self.0.value()
    }
}

impl<S> FromRequestParts<S> for IssuedToken
where
    S: Send + Sync,
{
    type Rejection = CsrfError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<IssuedToken>()
            .cloned()
            .ok_or(CsrfError::NotIssued)
    }
}
