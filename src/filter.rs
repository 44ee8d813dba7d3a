//! Filter engine: date range, severity band and free-text reduction.
//!
//! All active criteria are AND-combined. Day bounds are compared as
//! `YYYY-MM-DD` strings, which is why they are checked first: no parsing and
//! no allocation per reading.

use serde::Deserialize;

use crate::error::UnknownLevel;
use crate::models::Reading;
use crate::severity::{Level, SeverityScale};

// ---

#[derive(Debug, Clone, Default, PartialEq)]
pub enum LevelFilter {
    #[default]
    All,
    Only(Level),
}

/// Active filter state. The default matches everything.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterCriteria {
    /// Inclusive lower day bound, `YYYY-MM-DD`.
    pub date_from: Option<String>,
    /// Inclusive upper day bound, `YYYY-MM-DD`.
    pub date_to: Option<String>,
    pub level: LevelFilter,
    /// Case-insensitive substring of the message.
    pub search_text: Option<String>,
}

/// Filter parameters as they arrive on a query string.
///
/// e.g. `?from=2024-01-01&to=2024-01-31&level=alto&q=humo`
#[derive(Debug, Default, Deserialize)]
pub struct FilterQuery {
    pub from: Option<String>,
    pub to: Option<String>,
    pub level: Option<String>,
    pub q: Option<String>,
}

impl FilterQuery {
    // ---
    /// Resolve against a scale. Blank values are treated as absent and
    /// `level=all` disables the level criterion.
    pub fn into_criteria(self, scale: &SeverityScale) -> Result<FilterCriteria, UnknownLevel> {
        // ---
        let level = match non_blank(self.level) {
            None => LevelFilter::All,
            Some(name) if name.eq_ignore_ascii_case("all") => LevelFilter::All,
            Some(name) => LevelFilter::Only(scale.find(&name).ok_or(UnknownLevel(name))?),
        };

        Ok(FilterCriteria {
            date_from: non_blank(self.from),
            date_to: non_blank(self.to),
            level,
            search_text: non_blank(self.q),
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Return the readings matching every active criterion, preserving order.
pub fn apply(readings: &[Reading], criteria: &FilterCriteria, scale: &SeverityScale) -> Vec<Reading> {
    // ---
    let needle = criteria
        .search_text
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_lowercase);

    readings
        .iter()
        .filter(|r| in_date_range(r, criteria))
        .filter(|r| in_level(r, &criteria.level, scale))
        .filter(|r| {
            needle.as_deref().map_or(true, |needle| {
                r.message
                    .as_deref()
                    .is_some_and(|m| m.to_lowercase().contains(needle))
            })
        })
        .cloned()
        .collect()
}

fn in_date_range(reading: &Reading, criteria: &FilterCriteria) -> bool {
    let day = reading.day();
    criteria.date_from.as_deref().map_or(true, |from| day >= from)
        && criteria.date_to.as_deref().map_or(true, |to| day <= to)
}

/// Non-numeric readings never fall inside a specific band.
fn in_level(reading: &Reading, level: &LevelFilter, scale: &SeverityScale) -> bool {
    match level {
        LevelFilter::All => true,
        LevelFilter::Only(level) => reading
            .numeric_value()
            .is_some_and(|v| scale.contains(level, v)),
    }
}

#[cfg(test)]
mod tests {
    // ---
    use super::*;

    fn sample() -> Vec<Reading> {
        vec![
            Reading::new("s1", 650, None, "2024-01-01T10:00:00"),
            Reading::new("s1", 750, Some("Humo detectado"), "2024-01-01T11:00:00"),
            Reading::new("s1", 850, Some("Alto nivel de CO2"), "2024-01-02T09:00:00"),
            Reading::new("s1", 950, Some("Crítico"), "2024-01-03T09:00:00"),
            Reading::new("s1", "sin dato", Some("sensor sin dato"), "2024-01-03T10:00:00"),
        ]
    }

    fn ids(readings: &[Reading]) -> Vec<&str> {
        readings.iter().map(|r| r.timestamp_id.as_str()).collect()
    }

    #[test]
    fn test_default_matches_everything() {
        // ---
        let input = sample();
        let out = apply(&input, &FilterCriteria::default(), &SeverityScale::default());
        assert_eq!(out, input);
    }

    #[test]
    fn test_date_bounds_are_inclusive() {
        // ---
        let criteria = FilterCriteria {
            date_from: Some("2024-01-02".into()),
            date_to: Some("2024-01-02".into()),
            ..Default::default()
        };
        let out = apply(&sample(), &criteria, &SeverityScale::default());
        assert_eq!(ids(&out), ["2024-01-02T09:00:00"]);

        let criteria = FilterCriteria {
            date_from: Some("2024-01-02".into()),
            ..Default::default()
        };
        let out = apply(&sample(), &criteria, &SeverityScale::default());
        assert_eq!(out.len(), 3);
        assert!(out.iter().all(|r| r.day() >= "2024-01-02"));
    }

    #[test]
    fn test_level_filter_uses_band_ranges() {
        // ---
        let scale = SeverityScale::default();
        let criteria = FilterCriteria {
            level: LevelFilter::Only(scale.find("Moderado").unwrap()),
            ..Default::default()
        };
        let out = apply(&sample(), &criteria, &scale);
        assert_eq!(ids(&out), ["2024-01-01T11:00:00"]);

        // Non-numeric readings are never in a specific band
        let criteria = FilterCriteria {
            level: LevelFilter::Only(scale.find("Leve").unwrap()),
            ..Default::default()
        };
        let out = apply(&sample(), &criteria, &scale);
        assert_eq!(ids(&out), ["2024-01-01T10:00:00"]);
    }

    #[test]
    fn test_search_is_case_insensitive_and_needs_message() {
        // ---
        let criteria = FilterCriteria {
            search_text: Some("co2".into()),
            ..Default::default()
        };
        let out = apply(&sample(), &criteria, &SeverityScale::default());
        assert_eq!(ids(&out), ["2024-01-02T09:00:00"]);

        let criteria = FilterCriteria {
            search_text: Some("   ".into()),
            ..Default::default()
        };
        let out = apply(&sample(), &criteria, &SeverityScale::default());
        assert_eq!(out.len(), 5);
    }

    #[test]
    fn test_criteria_combine_with_and() {
        // ---
        let scale = SeverityScale::default();
        let criteria = FilterCriteria {
            date_from: Some("2024-01-03".into()),
            level: LevelFilter::Only(scale.find("Crítico").unwrap()),
            search_text: Some("CRÍ".into()),
            ..Default::default()
        };
        let out = apply(&sample(), &criteria, &scale);
        assert_eq!(ids(&out), ["2024-01-03T09:00:00"]);
    }

    #[test]
    fn test_query_resolution() {
        // ---
        let scale = SeverityScale::default();
        let query = FilterQuery {
            from: Some(" ".into()),
            to: Some("2024-01-31".into()),
            level: Some("ALTO".into()),
            q: None,
        };
        let criteria = query.into_criteria(&scale).unwrap();
        assert_eq!(criteria.date_from, None);
        assert_eq!(criteria.date_to.as_deref(), Some("2024-01-31"));
        assert_eq!(criteria.level, LevelFilter::Only(scale.find("Alto").unwrap()));

        let all = FilterQuery {
            level: Some("all".into()),
            ..Default::default()
        };
        assert_eq!(all.into_criteria(&scale).unwrap().level, LevelFilter::All);

        let bogus = FilterQuery {
            level: Some("extreme".into()),
            ..Default::default()
        };
        assert_eq!(
            bogus.into_criteria(&scale),
            Err(UnknownLevel("extreme".to_string()))
        );
    }
}
