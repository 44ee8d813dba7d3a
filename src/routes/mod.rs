//! HTTP gateway: merges every subrouter and attaches the shared state.

use axum::{http::StatusCode, response::IntoResponse, Json, Router};
use serde_json::json;

use crate::filter::{FilterCriteria, FilterQuery};
use crate::state::AppState;

mod export;
mod health;
mod readings;
mod summary;

// ---

pub fn router(state: AppState) -> Router {
    // ---
    Router::new()
        .merge(readings::router())
        .merge(summary::router())
        .merge(export::router())
        .merge(health::router())
        .with_state(state)
}

/// Resolve query-string filters, or a ready-made 400 response.
fn criteria(query: FilterQuery, state: &AppState) -> Result<FilterCriteria, axum::response::Response> {
    // ---
    query.into_criteria(state.scale()).map_err(|e| {
        tracing::debug!("Rejecting filter: {}", e);
        (StatusCode::BAD_REQUEST, Json(json!({ "error": e.to_string() }))).into_response()
    })
}
