//! One-shot bulk snapshot fetch.
//!
//! The endpoint returns a JSON array of readings. Items are decoded one by
//! one so a single bad record does not cost the whole snapshot.

use anyhow::{anyhow, Result};
use tracing::{debug, info};

use crate::models::Reading;

// ---

/// Fetch the bulk snapshot from `url`.
pub async fn fetch_bulk(client: &reqwest::Client, url: &str) -> Result<Vec<Reading>> {
    // ---
    debug!("Fetching bulk snapshot from: {}", url);

    let response: serde_json::Value = client
        .get(url)
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;

    let readings = decode_bulk(response)?;
    info!("Fetched {} readings from bulk snapshot", readings.len());
    Ok(readings)
}

/// Decode a bulk payload, skipping (and logging) items that are not readings.
pub fn decode_bulk(payload: serde_json::Value) -> Result<Vec<Reading>> {
    // ---
    let serde_json::Value::Array(items) = payload else {
        return Err(anyhow!("Bulk snapshot is not a JSON array"));
    };

    let total = items.len();
    let mut readings = Vec::with_capacity(total);
    for (i, item) in items.into_iter().enumerate() {
        match serde_json::from_value::<Reading>(item) {
            Ok(reading) => readings.push(reading),
            Err(e) => {
                debug!("Skipping bulk item {}: {}", i, e);
            }
        }
    }

    if readings.len() < total {
        info!(
            "Bulk snapshot: kept {} of {} items",
            readings.len(),
            total
        );
    }
    Ok(readings)
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_skips_bad_items() {
        // ---
        let payload = json!([
            {"sensor_id": "S1", "lectura": 650, "timestamp_id": "2024-01-01T10:00:00"},
            {"sensor_id": "S1", "lectura": 700},
            "garbage",
            {"sensor_id": "S1", "lectura": "750", "mensaje": "Alto", "timestamp_id": "2024-01-01T11:00:00"}
        ]);

        let readings = decode_bulk(payload).unwrap();
        assert_eq!(readings.len(), 2);
        assert_eq!(readings[1].message.as_deref(), Some("Alto"));
    }

    #[test]
    fn test_decode_keeps_alerts_without_numeric_value() {
        // ---
        let payload = json!([
            {"sensor_id": "S1", "lectura": null, "mensaje": "Sensor caído", "timestamp_id": "2024-01-01T10:00:00"},
            {"sensor_id": "S1", "mensaje": "Sin lectura", "timestamp_id": "2024-01-01T10:30:00"},
            {"sensor_id": "S1", "lectura": 750, "mensaje": "Alto", "timestamp_id": "2024-01-01T11:00:00"}
        ]);

        let readings = decode_bulk(payload).unwrap();
        assert_eq!(readings.len(), 3);
        assert_eq!(readings[0].numeric_value(), None);
        assert_eq!(crate::aggregate::alert_counts(&readings).total_alerts, 3);
    }

    #[test]
    fn test_decode_rejects_non_array() {
        // ---
        assert!(decode_bulk(json!({"results": []})).is_err());
    }
}
