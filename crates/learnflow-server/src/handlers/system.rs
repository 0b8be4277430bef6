use axum::{extract::State, Json};
use serde::Serialize;

use crate::{config::RuntimeEnvironment, AppState};

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub environment: RuntimeEnvironment,
}

pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        environment: state.config.environment,
    })
}
