//! Reading ingestion, classification and aggregation engine for the
//! AirSentinel sensor feed.
//!
//! Readings arrive from a one-shot bulk snapshot and from a live stream, are
//! merged into a deduplicated [`TimelineStore`], and every dashboard
//! projection is derived from a filtered snapshot by pure functions:
//! - [`severity`] classifies values against a configurable threshold table
//! - [`filter`] reduces by day range, severity band and message text
//! - [`aggregate`] builds the histogram, recent alerts and trend windows
//! - [`export`] writes the filtered set as CSV
//!
//! `source`, `state` and `routes` are the service glue around that core.

pub mod aggregate;
pub mod config;
pub mod error;
pub mod export;
pub mod filter;
pub mod models;
pub mod routes;
pub mod severity;
pub mod source;
pub mod state;
pub mod timeline;

pub use config::Config;
pub use models::{Reading, ReadingValue};
pub use severity::{Level, SeverityScale};
pub use state::AppState;
pub use timeline::{IngestOutcome, TimelineStore};
