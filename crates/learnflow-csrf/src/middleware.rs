//! Request middleware tying the CSRF pieces together
//!
//! Every request under the protected prefix gets a fresh token: GET and HEAD
//! simply receive one, any other method must first echo the current cookie
//! token in the `X-CSRF-Token` header.

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{HeaderName, HeaderValue, Method},
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::extract::CookieJar;
use tracing::{trace, warn};

use crate::{
    config::CsrfConfig,
    cookie_store::CookieStore,
    error::{CsrfError, CsrfResult},
    extract::IssuedToken,
    hasher::TokenHasher,
    validator::Validator,
};

/// Header carrying the token in both directions
pub static CSRF_HEADER_NAME: HeaderName = HeaderName::from_static("x-csrf-token");

/// Shared CSRF state, built once at startup and handed to the middleware.
#[derive(Debug, Clone)]
pub struct CsrfProtection {
    inner: Arc<Inner>,
}

#[derive(Debug)]
struct Inner {
    config: CsrfConfig,
    validator: Validator,
    cookie_store: CookieStore,
}

impl CsrfProtection {
    /// Build the subsystem from configuration.
    ///
    /// Fails if the secret cannot key the hasher.
    pub fn new(config: CsrfConfig) -> CsrfResult<Self> {
        let hasher = TokenHasher::new(&config.secret)?;
        let cookie_store = CookieStore::from_config(&config);

        Ok(Self {
            inner: Arc::new(Inner {
                validator: Validator::new(hasher),
                cookie_store,
                config,
            }),
        })
    }

    pub fn config(&self) -> &CsrfConfig {
        &self.inner.config
    }

    pub fn validator(&self) -> &Validator {
        &self.inner.validator
    }

    pub fn cookie_store(&self) -> &CookieStore {
        &self.inner.cookie_store
    }
}

/// GET and HEAD only receive a token, everything else is validated.
pub fn is_safe_method(method: &Method) -> bool {
    matches!(*method, Method::GET | Method::HEAD)
}

/// CSRF middleware, for use with [`axum::middleware::from_fn_with_state`].
pub async fn csrf_protect(
    State(csrf): State<CsrfProtection>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, CsrfError> {
    if !csrf.config().protects(request.uri().path()) {
        return Ok(next.run(request).await);
    }

    if !is_safe_method(request.method()) {
        let header_token = request
            .headers()
            .get(&CSRF_HEADER_NAME)
            .and_then(|v| v.to_str().ok());
        let cookie_token = csrf.cookie_store().read(&jar);

        if !csrf
            .validator()
            .validate(cookie_token.as_deref(), header_token)
        {
            warn!(
                method = %request.method(),
                path = %request.uri().path(),
                "Rejected request with invalid CSRF token"
            );
            return Err(CsrfError::ValidationFailed);
        }
    }

    // Rotate on every request, including validated ones
    let (jar, token) = csrf.cookie_store().issue(jar)?;
    let header_value = HeaderValue::from_str(token.value())?;
    trace!(
        "Issued CSRF token for {} {}",
        request.method(),
        request.uri().path()
    );
    request.extensions_mut().insert(IssuedToken(token));

    let response = next.run(request).await;

    let mut response = (jar, response).into_response();
    response
        .headers_mut()
        .insert(CSRF_HEADER_NAME.clone(), header_value);
    Ok(response)
}
