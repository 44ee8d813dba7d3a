//! Error types for the reading engine.

use thiserror::Error;

/// Rejected severity threshold table.
#[derive(Debug, Error, PartialEq)]
pub enum ScaleError {
    /// Level names must number exactly one more than the cut points.
    #[error("expected {expected} level names for {thresholds} thresholds, got {actual}")]
    LevelCount {
        thresholds: usize,
        expected: usize,
        actual: usize,
    },

    /// Cut point is NaN or infinite.
    #[error("threshold {0} is not a finite number")]
    NonFinite(f64),

    /// Cut points must be strictly ascending.
    #[error("thresholds must be strictly ascending ({previous} then {next})")]
    NotAscending { previous: f64, next: f64 },

    #[error("level name must not be blank")]
    BlankName,

    #[error("duplicate level name: {0}")]
    DuplicateName(String),
}

/// A live-stream message that could not be turned into a reading.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("empty message")]
    Empty,

    #[error("message of {len} bytes exceeds the {max} byte limit")]
    TooLarge { len: usize, max: usize },

    #[error("malformed reading: {0}")]
    Json(#[from] serde_json::Error),
}

/// Filter criteria naming a level the configured scale does not have.
#[derive(Debug, Error, PartialEq)]
#[error("unknown severity level: {0}")]
pub struct UnknownLevel(pub String);
