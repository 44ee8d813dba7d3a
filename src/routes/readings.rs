//! `GET /readings` (filtered timeline) and `POST /readings` (ingest one).

use axum::{
    extract::{Query, State},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::Serialize;
use tracing::{debug, info};

use crate::filter::FilterQuery;
use crate::models::Reading;
use crate::state::AppState;
use crate::timeline::IngestOutcome;

// ---

pub fn router() -> Router<AppState> {
    // ---
    Router::new().route("/readings", get(list).post(ingest))
}

async fn list(Query(params): Query<FilterQuery>, State(state): State<AppState>) -> impl IntoResponse {
    // ---
    debug!("GET /readings {:?}", params);
    let criteria = match super::criteria(params, &state) {
        Ok(c) => c,
        Err(rejection) => return rejection,
    };

    let readings = state.view(&criteria).await;
    debug!("GET /readings - returning {} readings", readings.len());
    Json(readings).into_response()
}

#[derive(Serialize)]
struct IngestResponse {
    outcome: IngestOutcome,
    revision: u64,
}

async fn ingest(State(state): State<AppState>, Json(reading): Json<Reading>) -> Json<IngestResponse> {
    // ---
    let timestamp_id = reading.timestamp_id.clone();
    let outcome = state.ingest(reading).await;
    info!("POST /readings - {} {:?}", timestamp_id, outcome);
    Json(IngestResponse {
        outcome,
        revision: state.revision(),
    })
}
