//! Configuration loader for the `airsentinel-sensorflow` service.
//!
//! This module centralizes all runtime configuration values and their defaults,
//! loading from environment variables (with optional `.env` file support
//! provided by the caller). Severity thresholds and window sizes live here so
//! a different band scheme is a configuration change, not a rebuild.
//!
use std::env;
use std::net::SocketAddr;

use anyhow::{anyhow, Result};

use crate::aggregate::AggregateConfig;
use crate::severity::SeverityScale;

/// Parse an optional environment variable with a default value.
macro_rules! parse_env {
    ($lookup:expr, $var_name:expr, $ty:ty, $default:expr) => {
        $lookup($var_name)
            .map(|v| v.trim().parse::<$ty>())
            .transpose()
            .map_err(|e| anyhow!("Invalid {}: {}", $var_name, e))?
            .unwrap_or($default)
    };
}

/// Parse a required string environment variable.
macro_rules! require_env {
    ($lookup:expr, $var_name:expr) => {
        $lookup($var_name)
            .filter(|v: &String| !v.trim().is_empty())
            .ok_or_else(|| anyhow!("{} must be set in .env or environment", $var_name))?
    };
}

const DEFAULT_LEVELS: &str = "Leve,Moderado,Alto,Crítico";
const DEFAULT_THRESHOLDS: &str = "700,800,900";

/// Upper bound for `RECENT_HOURS`: one year.
const MAX_RECENT_HOURS: i64 = 24 * 366;

/// Strongly typed application configuration.
///
/// All fields are immutable after loading, ensuring a consistent configuration
/// snapshot for the lifetime of the application.
#[derive(Debug, Clone)]
pub struct Config {
    // ---
    /// Bulk snapshot endpoint (JSON array of readings).
    pub api_url: String,

    /// `host:port` of the newline-delimited JSON live stream, if any.
    pub stream_addr: Option<String>,

    /// Address the HTTP API binds to.
    pub listen_addr: SocketAddr,

    /// Severity threshold table.
    pub scale: SeverityScale,

    /// Window sizes for the dashboard projections.
    pub windows: AggregateConfig,
}

/// Load configuration from environment variables with defaults.
///
/// Required:
/// - `SENSOR_API_URL` – bulk snapshot URL
///
/// Optional:
/// - `SENSOR_STREAM_ADDR` – live stream `host:port` (default: none)
/// - `LISTEN_ADDR` – HTTP bind address (default: `0.0.0.0:8080`)
/// - `SEVERITY_LEVELS` – comma-separated level names, mildest first
/// - `SEVERITY_THRESHOLDS` – comma-separated ascending cut points
/// - `HISTOGRAM_DAYS` (5), `RECENT_ALERTS` (10), `TREND_POINTS` (20),
///   `RECENT_HOURS` (5, between 0 and one year)
///
/// Returns an error if any required variable is missing or invalid.
pub fn load_from_env() -> Result<Config> {
    load_from(|key| env::var(key).ok())
}

/// Same as [`load_from_env`] with an arbitrary key lookup.
pub fn load_from<F>(lookup: F) -> Result<Config>
where
    F: Fn(&str) -> Option<String>,
{
    // ---
    let api_url = require_env!(lookup, "SENSOR_API_URL");
    let stream_addr = lookup("SENSOR_STREAM_ADDR").filter(|v| !v.trim().is_empty());
    let listen_addr = parse_env!(
        lookup,
        "LISTEN_ADDR",
        SocketAddr,
        SocketAddr::from(([0, 0, 0, 0], 8080))
    );

    let levels = lookup("SEVERITY_LEVELS").unwrap_or_else(|| DEFAULT_LEVELS.to_string());
    let thresholds =
        lookup("SEVERITY_THRESHOLDS").unwrap_or_else(|| DEFAULT_THRESHOLDS.to_string());
    let scale = parse_scale(&levels, &thresholds)?;

    let recent_hours = parse_env!(lookup, "RECENT_HOURS", i64, 5);
    if !(0..=MAX_RECENT_HOURS).contains(&recent_hours) {
        return Err(anyhow!(
            "Invalid RECENT_HOURS: {} (expected 0..={})",
            recent_hours,
            MAX_RECENT_HOURS
        ));
    }

    let windows = AggregateConfig {
        histogram_days: parse_env!(lookup, "HISTOGRAM_DAYS", usize, 5),
        recent_alerts: parse_env!(lookup, "RECENT_ALERTS", usize, 10),
        trend_points: parse_env!(lookup, "TREND_POINTS", usize, 20),
        recent_hours,
    };

    Ok(Config {
        api_url,
        stream_addr,
        listen_addr,
        scale,
        windows,
    })
}

fn parse_scale(levels: &str, thresholds: &str) -> Result<SeverityScale> {
    // ---
    let cut_points = thresholds
        .split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(|t| {
            t.parse::<f64>()
                .map_err(|e| anyhow!("Invalid SEVERITY_THRESHOLDS entry '{}': {}", t, e))
        })
        .collect::<Result<Vec<f64>>>()?;

    SeverityScale::new(cut_points, levels.split(','))
        .map_err(|e| anyhow!("Invalid severity scale: {}", e))
}

impl Config {
    /// Log the loaded configuration for debugging purposes.
    pub fn log_config(&self) {
        // ---
        let levels: Vec<String> = self.scale.levels().map(|l| l.name().to_string()).collect();

        tracing::info!("Configuration loaded:");
        tracing::info!("  SENSOR_API_URL      : {}", self.api_url);
        tracing::info!(
            "  SENSOR_STREAM_ADDR  : {}",
            self.stream_addr.as_deref().unwrap_or("(disabled)")
        );
        tracing::info!("  LISTEN_ADDR         : {}", self.listen_addr);
        tracing::info!("  SEVERITY_LEVELS     : {}", levels.join(","));
        tracing::info!("  SEVERITY_THRESHOLDS : {:?}", self.scale.thresholds());
        tracing::info!("  HISTOGRAM_DAYS      : {}", self.windows.histogram_days);
        tracing::info!("  RECENT_ALERTS       : {}", self.windows.recent_alerts);
        tracing::info!("  TREND_POINTS        : {}", self.windows.trend_points);
        tracing::info!("  RECENT_HOURS        : {}", self.windows.recent_hours);
    }
}
