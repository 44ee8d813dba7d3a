//! Live-stream reader.
//!
//! Receives one JSON-encoded reading per line from an async byte stream (TCP
//! in production) or per frame from a bytes channel. Messages that do not
//! decode are dropped and logged; the stream keeps going. Lines longer than
//! [`MAX_MESSAGE_BYTES`] are dropped the same way without being buffered.

use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncReadExt, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::error::DecodeError;
use crate::models::Reading;

// ---

/// Largest message accepted from a stream, excluding the line terminator.
pub const MAX_MESSAGE_BYTES: usize = 64 * 1024;

/// Counters for one stream session.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct StreamStats {
    pub received: u64,
    pub dropped: u64,
}

/// Decode a single stream message.
pub fn decode_message(bytes: &[u8]) -> Result<Reading, DecodeError> {
    // ---
    let trimmed = bytes.trim_ascii();
    if trimmed.is_empty() {
        return Err(DecodeError::Empty);
    }
    if trimmed.len() > MAX_MESSAGE_BYTES {
        return Err(DecodeError::TooLarge {
            len: trimmed.len(),
            max: MAX_MESSAGE_BYTES,
        });
    }
    Ok(serde_json::from_slice(trimmed)?)
}

/// Read newline-delimited readings from `reader` into `tx` until EOF, a read
/// error, or the receiver going away.
pub async fn pump<R>(reader: R, tx: mpsc::Sender<Reading>, description: &str) -> StreamStats
where
    R: AsyncRead + Unpin,
{
    pump_bounded(reader, tx, description, MAX_MESSAGE_BYTES).await
}

/// [`pump`] with an explicit line-length cap. At most `max_line + 1` bytes of
/// a line are held at once; longer lines count as dropped.
pub async fn pump_bounded<R>(
    reader: R,
    tx: mpsc::Sender<Reading>,
    description: &str,
    max_line: usize,
) -> StreamStats
where
    R: AsyncRead + Unpin,
{
    // ---
    let mut reader = BufReader::new(reader);
    let mut line = Vec::new();
    let mut stats = StreamStats::default();
    let limit = u64::try_from(max_line).unwrap_or(u64::MAX).saturating_add(1);

    // Skipping the rest of an oversized line
    let mut discarding = false;

    loop {
        line.clear();
        match (&mut reader).take(limit).read_until(b'\n', &mut line).await {
            Ok(0) => {
                info!("Stream {} closed", description);
                break;
            }
            Ok(_) => {
                let complete = line.ends_with(b"\n");
                if discarding {
                    discarding = !complete;
                    continue;
                }
                if line.len() - usize::from(complete) > max_line {
                    stats.dropped += 1;
                    warn!(
                        "Stream {}: dropping message longer than {} bytes",
                        description, max_line
                    );
                    discarding = !complete;
                    continue;
                }
                if line.trim_ascii().is_empty() {
                    continue;
                }
                match decode_message(&line) {
                    Ok(reading) => {
                        stats.received += 1;
                        debug!("Stream {} reading {}", description, reading.timestamp_id);
                        if tx.send(reading).await.is_err() {
                            // Receiver dropped
                            break;
                        }
                    }
                    Err(e) => {
                        stats.dropped += 1;
                        warn!("Stream {}: dropping message: {}", description, e);
                    }
                }
            }
            Err(e) => {
                warn!("Stream {} read error: {}", description, e);
                break;
            }
        }
    }

    stats
}

/// Spawn a background task reading from `reader`; readings arrive on the
/// returned channel.
pub fn spawn<R>(reader: R, description: &str) -> mpsc::Receiver<Reading>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    let (tx, rx) = mpsc::channel(64);
    let desc = description.to_string();
    tokio::spawn(async move {
        let stats = pump(reader, tx, &desc).await;
        info!(
            "Stream {} finished: {} received, {} dropped",
            desc, stats.received, stats.dropped
        );
    });
    rx
}

/// Decode raw message frames pushed from another transport.
pub fn from_bytes_channel(mut rx: mpsc::Receiver<Vec<u8>>, description: &str) -> mpsc::Receiver<Reading> {
    // ---
    let (tx, reading_rx) = mpsc::channel(64);
    let desc = description.to_string();

    tokio::spawn(async move {
        while let Some(bytes) = rx.recv().await {
            match decode_message(&bytes) {
                Ok(reading) => {
                    if tx.send(reading).await.is_err() {
                        break;
                    }
                }
                Err(e) => {
                    warn!("Stream {}: dropping message: {}", desc, e);
                }
            }
        }
    });

    reading_rx
}
