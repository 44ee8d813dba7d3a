//! Data model for sensor readings flowing through the pipeline.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

// ---

/// Raw measurement as delivered by the feed: either a JSON number or a string.
///
/// Kept in its received form so exports reproduce it verbatim; numeric work
/// goes through [`ReadingValue::as_f64`]. Anything else the feed sends
/// (`null`, booleans, a missing field) lands in `Other` and never coerces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ReadingValue {
    Number(serde_json::Number),
    Text(String),
    Other(serde_json::Value),
}

impl Default for ReadingValue {
    fn default() -> Self {
        ReadingValue::Other(serde_json::Value::Null)
    }
}

impl ReadingValue {
    // ---
    /// Coerce to a finite number.
    ///
    /// Blank or unparsable text and non-finite results are coercion failures
    /// and yield `None`; they are never treated as zero.
    pub fn as_f64(&self) -> Option<f64> {
        // ---
        let value = match self {
            ReadingValue::Number(n) => n.as_f64()?,
            ReadingValue::Text(s) => s.trim().parse::<f64>().ok()?,
            ReadingValue::Other(_) => return None,
        };
        value.is_finite().then_some(value)
    }
}

impl std::fmt::Display for ReadingValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReadingValue::Number(n) => write!(f, "{n}"),
            ReadingValue::Text(s) => f.write_str(s),
            ReadingValue::Other(serde_json::Value::Null) => Ok(()),
            ReadingValue::Other(v) => write!(f, "{v}"),
        }
    }
}

impl From<f64> for ReadingValue {
    fn from(value: f64) -> Self {
        serde_json::Number::from_f64(value)
            .map(ReadingValue::Number)
            .unwrap_or_else(|| ReadingValue::Text(value.to_string()))
    }
}

impl From<i64> for ReadingValue {
    fn from(value: i64) -> Self {
        ReadingValue::Number(value.into())
    }
}

impl From<i32> for ReadingValue {
    fn from(value: i32) -> Self {
        ReadingValue::Number(value.into())
    }
}

impl From<&str> for ReadingValue {
    fn from(value: &str) -> Self {
        ReadingValue::Text(value.to_string())
    }
}

/// One sensor observation, as produced by both the bulk API and the live stream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reading {
    // ---
    pub sensor_id: String,

    #[serde(rename = "lectura", default)]
    pub value: ReadingValue,

    #[serde(rename = "mensaje", default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    /// Unique position in time, `YYYY-MM-DDTHH:MM:SS...`.
    pub timestamp_id: String,
}

impl Reading {
    // ---
    pub fn new(
        sensor_id: impl Into<String>,
        value: impl Into<ReadingValue>,
        message: Option<&str>,
        timestamp_id: impl Into<String>,
    ) -> Self {
        Reading {
            sensor_id: sensor_id.into(),
            value: value.into(),
            message: message.map(str::to_string),
            timestamp_id: timestamp_id.into(),
        }
    }

    /// A reading is an alert iff its message is present and non-blank.
    pub fn is_alert(&self) -> bool {
        self.message
            .as_deref()
            .is_some_and(|m| !m.trim().is_empty())
    }

    pub fn numeric_value(&self) -> Option<f64> {
        self.value.as_f64()
    }

    /// Calendar day bucket: everything before the first `T`.
    pub fn day(&self) -> &str {
        match self.timestamp_id.split_once('T') {
            Some((day, _)) => day,
            None => &self.timestamp_id,
        }
    }

    /// `HH:MM:SS` label for charting; empty when the id carries no time part.
    pub fn time_label(&self) -> &str {
        match self.timestamp_id.split_once('T') {
            Some((_, rest)) => rest.get(..8).unwrap_or(rest),
            None => "",
        }
    }

    /// Parse the timestamp id into an instant.
    ///
    /// Accepts RFC 3339 and naive `YYYY-MM-DDTHH:MM:SS[.f]` (read as UTC);
    /// anything following the seconds field in the naive form is ignored.
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        // ---
        if let Ok(dt) = DateTime::parse_from_rfc3339(&self.timestamp_id) {
            return Some(dt.with_timezone(&Utc));
        }
        NaiveDateTime::parse_and_remainder(&self.timestamp_id, "%Y-%m-%dT%H:%M:%S%.f")
            .ok()
            .map(|(naive, _)| naive.and_utc())
    }
}

/// Format a `YYYY-MM-DD` day as `DD/MM/YYYY`; other shapes pass through.
pub fn display_date(day: &str) -> String {
    // ---
    let mut parts = day.splitn(3, '-');
    match (parts.next(), parts.next(), parts.next()) {
        (Some(year), Some(month), Some(dd)) => format!("{dd}/{month}/{year}"),
        _ => day.to_string(),
    }
}
