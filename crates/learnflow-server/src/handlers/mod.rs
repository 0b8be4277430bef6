pub mod csrf;
pub mod system;

use axum::{extract::OriginalUri, routing::get, Router};

use crate::{error::AppError, AppState};

/// Routes mounted under the protected API prefix
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/csrf/refresh", get(csrf::refresh))
        .route("/csrf/init", get(csrf::init))
        .route("/health", get(system::health))
        .fallback(api_not_found)
}

async fn api_not_found(OriginalUri(uri): OriginalUri) -> AppError {
    AppError::NotFound(uri.path().to_string())
}
