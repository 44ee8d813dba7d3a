// src/routes/health.rs
//! API health check endpoint.
//!
//! Reports liveness plus the current timeline revision, so a probe can tell
//! a running-but-empty service (revision 0) from one that has received data.

use axum::{extract::State, routing::get, Json, Router};
use serde::Serialize;

use crate::state::AppState;

/// JSON response body for the `/health` endpoint.
#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    revision: u64,
}

/// Handle `GET /health`. Never touches the timeline lock.
async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        revision: state.revision(),
    })
}

pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health))
}
