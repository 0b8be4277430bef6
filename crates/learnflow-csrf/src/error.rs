//! Error types for the CSRF subsystem
//!
//! Every way a request can fail the CSRF check collapses into
//! [`CsrfError::ValidationFailed`], so clients never learn which half of the
//! double-submit check was wrong.

use axum::{
    http::{HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use tracing::error;

/// Response header set on CSRF rejections so clients can tell them apart
/// from other 403 responses and refresh their token.
pub static CSRF_ERROR_HEADER: HeaderName = HeaderName::from_static("x-csrf-error");

/// Message returned to the client on a rejected request.
pub const VALIDATION_FAILED_MESSAGE: &str = "CSRF token validation failed";

#[derive(Debug, thiserror::Error)]
pub enum CsrfError {
    /// No secret key was configured
    #[error("CSRF secret key is not configured")]
    MissingSecret,

    /// The keyed-hash primitive rejected the secret key
    #[error("Invalid CSRF secret key: {0}")]
    InvalidSecret(String),

    /// The operating system random source failed
    #[error("Secure random source unavailable: {0}")]
    Entropy(String),

    /// A token was not 64 hex characters
    #[error("Malformed CSRF token")]
    MalformedToken,

    /// The header token and cookie token did not match
    #[error("CSRF token validation failed")]
    ValidationFailed,

    /// A token could not be encoded as a header value
    #[error("Invalid header value: {0}")]
    InvalidHeaderValue(#[from] axum::http::header::InvalidHeaderValue),

    /// A handler asked for the issued token but the middleware did not run
    #[error("No CSRF token was issued for this request")]
    NotIssued,
}

/// Error response body for JSON responses
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

impl IntoResponse for CsrfError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            CsrfError::ValidationFailed | CsrfError::MalformedToken => {
                (StatusCode::FORBIDDEN, VALIDATION_FAILED_MESSAGE)
            }
            CsrfError::Entropy(e) => {
                error!("Failed to generate CSRF token: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
            other => {
                error!("CSRF subsystem error: {}", other);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
        };

        let body = Json(ErrorResponse {
            error: message.to_string(),
        });

        let mut response = (status, body).into_response();
        if status == StatusCode::FORBIDDEN {
            response
                .headers_mut()
                .insert(CSRF_ERROR_HEADER.clone(), HeaderValue::from_static("true"));
        }
        response
    }
}

pub type CsrfResult<T> = Result<T, CsrfError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_status_codes() {
        assert_eq!(
            CsrfError::ValidationFailed.into_response().status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            CsrfError::MalformedToken.into_response().status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            CsrfError::Entropy("no entropy".to_string())
                .into_response()
                .status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            CsrfError::NotIssued.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_rejection_carries_error_marker() {
        let response = CsrfError::ValidationFailed.into_response();
        assert_eq!(
            response.headers().get(&CSRF_ERROR_HEADER).unwrap(),
            "true"
        );

        let response = CsrfError::NotIssued.into_response();
        assert!(response.headers().get(&CSRF_ERROR_HEADER).is_none());
    }
}
