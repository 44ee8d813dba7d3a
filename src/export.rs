//! CSV export of a filtered set.
//!
//! Only the message column is quoted. Quote characters inside a message are
//! written as-is, matching the files the dashboard has always produced.

use crate::models::Reading;

// ---

pub const CSV_HEADER: &str = "sensor_id,lectura,mensaje,timestamp_id";

/// Suggested file name for downloads.
pub const CSV_FILE_NAME: &str = "alertas_filtradas.csv";

/// Serialize readings to `\n`-separated CSV with a header row.
pub fn to_csv(readings: &[Reading]) -> String {
    // ---
    let mut out = String::from(CSV_HEADER);
    for r in readings {
        out.push('\n');
        out.push_str(&csv_row(r));
    }
    out
}

fn csv_row(reading: &Reading) -> String {
    format!(
        "{},{},\"{}\",{}",
        reading.sensor_id,
        reading.value,
        reading.message.as_deref().unwrap_or(""),
        reading.timestamp_id
    )
}
