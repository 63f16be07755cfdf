//! Health and readiness handlers.

use std::sync::Arc;

use axum::{extract::Extension, http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
}

#[derive(Serialize)]
pub struct ReadyResponse {
    pub ready: bool,
    pub database: String,
}

/// GET /health - Basic health check
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        service: "weather-api".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

/// GET /ready - Readiness check (verifies storage connectivity)
pub async fn ready_handler(Extension(state): Extension<Arc<AppState>>) -> impl IntoResponse {
    let (ready, database) = match state.repo.ping().await {
        Ok(()) => (true, "ok".to_string()),
        Err(e) => (false, format!("error: {}", e)),
    };

    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status, Json(ReadyResponse { ready, database }))
}
