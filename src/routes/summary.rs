//! `GET /summary`: every dashboard projection over the filtered set.

use axum::{
    extract::{Query, State},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use chrono::Utc;
use tracing::debug;

use crate::filter::FilterQuery;
use crate::state::AppState;

// ---

pub fn router() -> Router<AppState> {
    Router::new().route("/summary", get(handler))
}

async fn handler(Query(params): Query<FilterQuery>, State(state): State<AppState>) -> impl IntoResponse {
    // ---
    debug!("GET /summary {:?}", params);
    let criteria = match super::criteria(params, &state) {
        Ok(c) => c,
        Err(rejection) => return rejection,
    };

    let summary = state.summary(&criteria, Utc::now()).await;
    debug!(
        "GET /summary - {} readings, {} alerts",
        summary.total_readings, summary.counts.total_alerts
    );
    Json(summary).into_response()
}
