//! Health check endpoint.

use axum::{extract::State, routing::get, Json, Router};
use serde_json::json;

use crate::json::HealthResponse;
use crate::AppState;

/// Health check routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}

/// Health check handler.
async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    // Probe the data backend with a trivial query
    let backend_connected = state
        .backend
        .query("query Ping { __typename }", json!({}))
        .await
        .is_ok();

    Json(HealthResponse {
        status: if backend_connected { "healthy" } else { "degraded" }.to_string(),
        name: env!("CARGO_PKG_NAME").to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        backend_connected,
        cache: state.cache.stats(),
    })
}
