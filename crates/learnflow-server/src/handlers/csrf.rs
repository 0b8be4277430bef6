//! Token endpoints used by the client to obtain a CSRF token
//!
//! The middleware has already issued the token by the time these run; the
//! handlers only make sure it happened and, for `init`, echo it in the body.

use axum::{http::StatusCode, Json};
use learnflow_csrf::IssuedToken;
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
}

/// GET /api/csrf/refresh: empty body, token in the `X-CSRF-Token` header
pub async fn refresh(_: IssuedToken) -> StatusCode {
    StatusCode::OK
}

/// GET /api/csrf/init: token in the body as well as the header
pub async fn init(token: IssuedToken) -> Json<TokenResponse> {
    Json(TokenResponse {
        token: token.value().to_string(),
    })
}
