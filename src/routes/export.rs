//! `GET /export.csv`: the filtered set as a CSV download.

use axum::{
    extract::{Query, State},
    http::header,
    response::IntoResponse,
    routing::get,
    Router,
};
use tracing::info;

use crate::export::{to_csv, CSV_FILE_NAME};
use crate::filter::FilterQuery;
use crate::state::AppState;

// ---

pub fn router() -> Router<AppState> {
    Router::new().route("/export.csv", get(handler))
}

async fn handler(Query(params): Query<FilterQuery>, State(state): State<AppState>) -> impl IntoResponse {
    // ---
    let criteria = match super::criteria(params, &state) {
        Ok(c) => c,
        Err(rejection) => return rejection,
    };

    let readings = state.view(&criteria).await;
    info!("GET /export.csv - exporting {} readings", readings.len());

    (
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{CSV_FILE_NAME}\""),
            ),
        ],
        to_csv(&readings),
    )
        .into_response()
}
