//! Display projections derived from a filtered set of readings.
//!
//! Every function here is pure and recomputes from the slice it is given;
//! the caller re-derives after each store mutation.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Utc};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::models::{display_date, Reading};
use crate::severity::{Level, SeverityScale};

// ---

/// Window sizes for the recent-data projections.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AggregateConfig {
    /// Most recent days kept in the histogram (k).
    pub histogram_days: usize,
    /// Most recent alerts listed (N).
    pub recent_alerts: usize,
    /// Points in the trend window (M).
    pub trend_points: usize,
    /// Width of the recent-hours window.
    pub recent_hours: i64,
}

impl Default for AggregateConfig {
    fn default() -> Self {
        AggregateConfig {
            histogram_days: 5,
            recent_alerts: 10,
            trend_points: 20,
            recent_hours: 5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LevelCount {
    pub level: Level,
    pub count: usize,
}

/// Alert counts for one calendar day, one entry per configured level.
#[derive(Debug, Clone, PartialEq)]
pub struct DayRow {
    pub date: String,
    pub counts: Vec<LevelCount>,
}

impl DayRow {
    /// Count for a level name; zero for unknown names.
    pub fn count(&self, level: &str) -> usize {
        self.counts
            .iter()
            .find(|c| c.level.name() == level)
            .map_or(0, |c| c.count)
    }

    pub fn total(&self) -> usize {
        self.counts.iter().map(|c| c.count).sum()
    }
}

// Flattened for charting: {"date": .., "label": "dd/mm/yyyy", "Leve": 0, ...}
impl Serialize for DayRow {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.counts.len() + 2))?;
        map.serialize_entry("date", &self.date)?;
        map.serialize_entry("label", &display_date(&self.date))?;
        for c in &self.counts {
            map.serialize_entry(c.level.name(), &c.count)?;
        }
        map.end()
    }
}

/// One chart point. `value` is `None` when the reading is not numeric.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendPoint {
    pub time_label: String,
    pub timestamp_id: String,
    pub value: Option<f64>,
    pub level: Option<Level>,
}

impl TrendPoint {
    fn from_reading(reading: &Reading, scale: &SeverityScale) -> Self {
        let value = reading.numeric_value();
        TrendPoint {
            time_label: reading.time_label().to_string(),
            timestamp_id: reading.timestamp_id.clone(),
            value,
            level: value.map(|v| scale.classify(v)),
        }
    }
}

/// Alert/routine partition of a filtered set. The two always sum to its size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AlertCounts {
    pub total_alerts: usize,
    pub normal_readings: usize,
}

/// Everything the dashboard renders, derived from one filtered set.
#[derive(Debug, Clone, Serialize)]
pub struct Summary {
    pub total_readings: usize,
    #[serde(flatten)]
    pub counts: AlertCounts,
    pub latest_alert: Option<Reading>,
    pub latest_alert_level: Option<Level>,
    pub recent_alerts: Vec<Reading>,
    pub histogram: Vec<DayRow>,
    pub level_distribution: Vec<LevelCount>,
    pub trend: Vec<TrendPoint>,
    pub recent_window: Vec<TrendPoint>,
}

/// Alerts grouped by day and level, ascending by day, last `days` days only.
///
/// Days without alerts are omitted. Alerts whose value is not numeric cannot
/// be classified and are left out.
pub fn day_histogram(readings: &[Reading], scale: &SeverityScale, days: usize) -> Vec<DayRow> {
    // ---
    let mut by_day: BTreeMap<&str, Vec<usize>> = BTreeMap::new();

    for reading in readings.iter().filter(|r| r.is_alert()) {
        let Some(value) = reading.numeric_value() else {
            continue;
        };
        let rank = scale.classify(value).rank();
        by_day
            .entry(reading.day())
            .or_insert_with(|| vec![0; scale.len()])[rank] += 1;
    }

    let skip = by_day.len().saturating_sub(days);
    by_day
        .into_iter()
        .skip(skip)
        .map(|(date, counts)| DayRow {
            date: date.to_string(),
            counts: scale
                .levels()
                .zip(counts)
                .map(|(level, count)| LevelCount { level, count })
                .collect(),
        })
        .collect()
}

/// The alert with the greatest `timestamp_id`.
pub fn latest_alert(readings: &[Reading]) -> Option<&Reading> {
    readings
        .iter()
        .filter(|r| r.is_alert())
        .max_by(|a, b| a.timestamp_id.cmp(&b.timestamp_id))
}

/// Up to `n` alerts, newest first.
pub fn recent_alerts(readings: &[Reading], n: usize) -> Vec<&Reading> {
    // ---
    let mut alerts: Vec<&Reading> = readings.iter().filter(|r| r.is_alert()).collect();
    alerts.sort_by(|a, b| b.timestamp_id.cmp(&a.timestamp_id));
    alerts.truncate(n);
    alerts
}

/// The last `m` readings in chronological order, reduced to chart points.
pub fn trend(readings: &[Reading], m: usize, scale: &SeverityScale) -> Vec<TrendPoint> {
    // ---
    let mut sorted: Vec<&Reading> = readings.iter().collect();
    sorted.sort_by(|a, b| a.timestamp_id.cmp(&b.timestamp_id));
    let skip = sorted.len().saturating_sub(m);
    sorted
        .into_iter()
        .skip(skip)
        .map(|r| TrendPoint::from_reading(r, scale))
        .collect()
}

/// Readings stamped within `hours` before `now`, chronological.
///
/// Readings whose timestamp does not parse are left out. Timestamps without
/// an offset are read as UTC, not host-local time, so on a host east or west
/// of UTC the window is shifted by that offset. A span too large to subtract
/// from `now` means no cutoff.
pub fn recent_window(
    readings: &[Reading],
    hours: i64,
    now: DateTime<Utc>,
    scale: &SeverityScale,
) -> Vec<TrendPoint> {
    // ---
    let cutoff = Duration::try_hours(hours).and_then(|span| now.checked_sub_signed(span));
    let mut recent: Vec<&Reading> = readings
        .iter()
        .filter(|r| {
            r.timestamp()
                .is_some_and(|ts| cutoff.map_or(true, |cutoff| ts >= cutoff))
        })
        .collect();
    recent.sort_by(|a, b| a.timestamp_id.cmp(&b.timestamp_id));
    recent
        .into_iter()
        .map(|r| TrendPoint::from_reading(r, scale))
        .collect()
}

pub fn alert_counts(readings: &[Reading]) -> AlertCounts {
    let total_alerts = readings.iter().filter(|r| r.is_alert()).count();
    AlertCounts {
        total_alerts,
        normal_readings: readings.len() - total_alerts,
    }
}

/// Readings per level over every numeric reading, mildest level first.
pub fn level_distribution(readings: &[Reading], scale: &SeverityScale) -> Vec<LevelCount> {
    // ---
    let mut counts = vec![0usize; scale.len()];
    for value in readings.iter().filter_map(Reading::numeric_value) {
        counts[scale.classify(value).rank()] += 1;
    }
    scale
        .levels()
        .zip(counts)
        .map(|(level, count)| LevelCount { level, count })
        .collect()
}

/// Derive the full dashboard summary from a filtered set.
pub fn summarize(
    readings: &[Reading],
    scale: &SeverityScale,
    config: &AggregateConfig,
    now: DateTime<Utc>,
) -> Summary {
    // ---
    let latest = latest_alert(readings);

    Summary {
        total_readings: readings.len(),
        counts: alert_counts(readings),
        latest_alert_level: latest
            .and_then(Reading::numeric_value)
            .map(|v| scale.classify(v)),
        latest_alert: latest.cloned(),
        recent_alerts: recent_alerts(readings, config.recent_alerts)
            .into_iter()
            .cloned()
            .collect(),
        histogram: day_histogram(readings, scale, config.histogram_days),
        level_distribution: level_distribution(readings, scale),
        trend: trend(readings, config.trend_points, scale),
        recent_window: recent_window(readings, config.recent_hours, now, scale),
    }
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;
    use chrono::{TimeZone, Utc};

    fn scenario() -> Vec<Reading> {
        vec![
            Reading::new("s1", 650, Some(""), "2024-01-01T10:00:00"),
            Reading::new("s1", 750, Some("Alto"), "2024-01-01T11:00:00"),
            Reading::new("s1", 950, Some("Crítico"), "2024-01-02T09:00:00"),
        ]
    }

    #[test]
    fn test_histogram_by_day_and_level() {
        // ---
        let scale = SeverityScale::default();
        let rows = day_histogram(&scenario(), &scale, 5);

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].date, "2024-01-01");
        assert_eq!(rows[0].count("Moderado"), 1);
        assert_eq!(rows[0].total(), 1);
        assert_eq!(rows[1].date, "2024-01-02");
        assert_eq!(rows[1].count("Crítico"), 1);
        assert_eq!(rows[1].total(), 1);
    }

    #[test]
    fn test_histogram_keeps_most_recent_days() {
        // ---
        let readings: Vec<Reading> = (1..=7)
            .map(|d| Reading::new("s1", 720, Some("x"), format!("2024-01-0{d}T08:00:00")))
            .collect();
        let rows = day_histogram(&readings, &SeverityScale::default(), 5);
        let days: Vec<&str> = rows.iter().map(|r| r.date.as_str()).collect();
        assert_eq!(
            days,
            ["2024-01-03", "2024-01-04", "2024-01-05", "2024-01-06", "2024-01-07"]
        );
    }

    #[test]
    fn test_histogram_skips_unclassifiable_alerts() {
        // ---
        let readings = vec![Reading::new("s1", "n/a", Some("fallo"), "2024-01-01T08:00:00")];
        assert!(day_histogram(&readings, &SeverityScale::default(), 5).is_empty());
        assert_eq!(alert_counts(&readings).total_alerts, 1);
    }

    #[test]
    fn test_histogram_row_serialization() {
        // ---
        let rows = day_histogram(&scenario(), &SeverityScale::default(), 5);
        let json = serde_json::to_value(&rows[0]).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "date": "2024-01-01",
                "label": "01/01/2024",
                "Leve": 0,
                "Moderado": 1,
                "Alto": 0,
                "Crítico": 0
            })
        );
    }

    #[test]
    fn test_latest_and_recent_alerts() {
        // ---
        let readings = scenario();
        assert_eq!(
            latest_alert(&readings).unwrap().timestamp_id,
            "2024-01-02T09:00:00"
        );

        let recent = recent_alerts(&readings, 1);
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].timestamp_id, "2024-01-02T09:00:00");

        let all: Vec<&str> = recent_alerts(&readings, 10)
            .iter()
            .map(|r| r.timestamp_id.as_str())
            .collect();
        assert_eq!(all, ["2024-01-02T09:00:00", "2024-01-01T11:00:00"]);
    }

    #[test]
    fn test_trend_window_is_chronological_and_flags_bad_values() {
        // ---
        let scale = SeverityScale::default();
        let readings = vec![
            Reading::new("s1", 910, None, "2024-01-01T12:00:00"),
            Reading::new("s1", "??", None, "2024-01-01T11:00:00"),
            Reading::new("s1", 600, None, "2024-01-01T10:00:00"),
        ];

        let points = trend(&readings, 2, &scale);
        assert_eq!(points.len(), 2);
        assert_eq!(points[0].time_label, "11:00:00");
        assert_eq!(points[0].value, None);
        assert_eq!(points[0].level, None);
        assert_eq!(points[1].value, Some(910.0));
        assert_eq!(points[1].level.as_ref().map(Level::name), Some("Crítico"));
    }

    #[test]
    fn test_recent_window() {
        // ---
        let scale = SeverityScale::default();
        let now = Utc.with_ymd_and_hms(2024, 1, 2, 12, 0, 0).unwrap();
        let readings = vec![
            Reading::new("s1", 700, None, "2024-01-02T06:59:59"),
            Reading::new("s1", 710, None, "2024-01-02T11:00:00"),
            Reading::new("s1", 705, None, "2024-01-02T07:00:00"),
            Reading::new("s1", 705, None, "not-a-time"),
        ];

        let points = recent_window(&readings, 5, now, &scale);
        let labels: Vec<&str> = points.iter().map(|p| p.time_label.as_str()).collect();
        assert_eq!(labels, ["07:00:00", "11:00:00"]);
    }

    #[test]
    fn test_recent_window_with_oversized_span() {
        // ---
        let scale = SeverityScale::default();
        let now = Utc.with_ymd_and_hms(2024, 1, 2, 12, 0, 0).unwrap();
        let readings = vec![
            Reading::new("s1", 710, None, "2024-01-02T11:00:00"),
            Reading::new("s1", 700, None, "1999-12-31T23:00:00"),
        ];

        // Beyond the representable range: no cutoff, no panic
        assert_eq!(recent_window(&readings, 1_000_000_000_000, now, &scale).len(), 2);
        assert_eq!(recent_window(&readings, i64::MAX, now, &scale).len(), 2);

        let config = AggregateConfig {
            recent_hours: 1_000_000_000_000,
            ..AggregateConfig::default()
        };
        let summary = summarize(&readings, &scale, &config, now);
        assert_eq!(summary.recent_window.len(), 2);
    }

    #[test]
    fn test_null_value_alert_is_counted() {
        // ---
        let scale = SeverityScale::default();
        let readings: Vec<Reading> = serde_json::from_str(
            r#"[
                {"sensor_id":"S1","lectura":null,"mensaje":"Sensor caído","timestamp_id":"2024-01-01T10:00:00"},
                {"sensor_id":"S1","lectura":750,"mensaje":"Alto","timestamp_id":"2024-01-01T11:00:00"}
            ]"#,
        )
        .unwrap();

        let counts = alert_counts(&readings);
        assert_eq!(counts.total_alerts, 2);
        assert_eq!(counts.normal_readings, 0);

        // Unclassifiable, so only the numeric alert reaches the histogram
        let rows = day_histogram(&readings, &scale, 5);
        assert_eq!(rows[0].total(), 1);
    }

    #[test]
    fn test_level_distribution() {
        // ---
        let scale = SeverityScale::default();
        let mut readings = scenario();
        readings.push(Reading::new("s1", "bad", None, "2024-01-03T00:00:00"));

        let dist: Vec<usize> = level_distribution(&readings, &scale)
            .iter()
            .map(|c| c.count)
            .collect();
        assert_eq!(dist, [1, 1, 0, 1]);
    }

    #[test]
    fn test_empty_state() {
        // ---
        let scale = SeverityScale::default();
        let summary = summarize(&[], &scale, &AggregateConfig::default(), Utc::now());

        assert!(summary.histogram.is_empty());
        assert!(summary.latest_alert.is_none());
        assert!(summary.latest_alert_level.is_none());
        assert!(summary.recent_alerts.is_empty());
        assert!(summary.trend.is_empty());
        assert_eq!(summary.counts.total_alerts, 0);
        assert_eq!(summary.counts.normal_readings, 0);
    }

    #[test]
    fn test_summary_partition() {
        // ---
        let scale = SeverityScale::default();
        let readings = scenario();
        let summary = summarize(&readings, &scale, &AggregateConfig::default(), Utc::now());

        assert_eq!(summary.counts.total_alerts, 2);
        assert_eq!(summary.counts.normal_readings, 1);
        assert_eq!(
            summary.counts.total_alerts + summary.counts.normal_readings,
            summary.total_readings
        );
        assert_eq!(
            summary.latest_alert_level.as_ref().map(Level::name),
            Some("Crítico")
        );
    }
}
