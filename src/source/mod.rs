//! Producers feeding the timeline: the bulk snapshot and the live stream.
//!
//! Transport policy (retries, reconnects, heartbeats) is deliberately thin
//! here; a failure leaves the store at its last known state.

pub mod bulk;
pub mod stream;

use tokio::net::TcpStream;
use tracing::{info, warn};

use crate::state::AppState;

// ---

/// Load the bulk snapshot, then follow the live stream until it closes.
///
/// The stream is only opened once the snapshot has landed. Readings POSTed
/// while the fetch is in flight are replayed by [`AppState::load`].
pub async fn run_feed(
    state: AppState,
    client: reqwest::Client,
    api_url: String,
    stream_addr: Option<String>,
) {
    // ---
    match bulk::fetch_bulk(&client, &api_url).await {
        Ok(readings) => state.load(readings).await,
        Err(e) => {
            warn!("Bulk fetch failed, starting with no data: {:#}", e);
            state.skip_snapshot().await;
        }
    }

    let Some(addr) = stream_addr else {
        info!("No live stream configured");
        return;
    };

    let socket = match TcpStream::connect(&addr).await {
        Ok(socket) => socket,
        Err(e) => {
            warn!("Could not connect to live stream {}: {}", addr, e);
            return;
        }
    };
    info!("Connected to live stream {}", addr);

    let mut readings = stream::spawn(socket, &addr);
    while let Some(reading) = readings.recv().await {
        state.ingest(reading).await;
    }
    warn!("Live stream {} ended; keeping last known state", addr);
}
