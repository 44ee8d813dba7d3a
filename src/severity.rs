//! Severity classification against a configurable threshold table.
//!
//! A scale with cut points `t1 < t2 < ... < tn` defines `n + 1` half-open
//! bands: `(-inf, t1)`, `[t1, t2)`, ..., `[tn, +inf)`. A value sitting exactly
//! on a cut point belongs to the higher band.

use serde::{Serialize, Serializer};

use crate::error::ScaleError;

// ---

/// One band of a [`SeverityScale`]. Orders by rank, 0 being the mildest.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Level {
    rank: usize,
    name: String,
}

impl Level {
    pub fn rank(&self) -> usize {
        self.rank
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl Serialize for Level {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.name)
    }
}

/// Ordered threshold table with one name per band.
#[derive(Debug, Clone, PartialEq)]
pub struct SeverityScale {
    thresholds: Vec<f64>,
    names: Vec<String>,
}

impl Default for SeverityScale {
    /// The four-band scheme used by the dashboard: 700 / 800 / 900.
    fn default() -> Self {
        SeverityScale {
            thresholds: vec![700.0, 800.0, 900.0],
            names: ["Leve", "Moderado", "Alto", "Crítico"]
                .into_iter()
                .map(String::from)
                .collect(),
        }
    }
}

impl SeverityScale {
    // ---
    /// Build a scale from ascending cut points and `thresholds.len() + 1` names.
    pub fn new<S: Into<String>>(
        thresholds: Vec<f64>,
        names: impl IntoIterator<Item = S>,
    ) -> Result<Self, ScaleError> {
        // ---
        let names: Vec<String> = names.into_iter().map(|n| n.into().trim().to_string()).collect();

        if names.len() != thresholds.len() + 1 {
            return Err(ScaleError::LevelCount {
                thresholds: thresholds.len(),
                expected: thresholds.len() + 1,
                actual: names.len(),
            });
        }
        if let Some(&bad) = thresholds.iter().find(|t| !t.is_finite()) {
            return Err(ScaleError::NonFinite(bad));
        }
        if let Some(pair) = thresholds.windows(2).find(|w| w[0] >= w[1]) {
            return Err(ScaleError::NotAscending {
                previous: pair[0],
                next: pair[1],
            });
        }
        for (i, name) in names.iter().enumerate() {
            if name.is_empty() {
                return Err(ScaleError::BlankName);
            }
            if names[..i].iter().any(|n| n.to_lowercase() == name.to_lowercase()) {
                return Err(ScaleError::DuplicateName(name.clone()));
            }
        }

        Ok(SeverityScale { thresholds, names })
    }

    /// Classify a finite value. Checks from the highest cut point downward.
    pub fn classify(&self, value: f64) -> Level {
        // ---
        let rank = self
            .thresholds
            .iter()
            .rposition(|&t| value >= t)
            .map_or(0, |i| i + 1);
        self.make_level(rank)
    }

    pub fn thresholds(&self) -> &[f64] {
        &self.thresholds
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// All levels, mildest first.
    pub fn levels(&self) -> impl Iterator<Item = Level> + '_ {
        (0..self.names.len()).map(|rank| self.make_level(rank))
    }

    /// Look a level up by name, ignoring case.
    pub fn find(&self, name: &str) -> Option<Level> {
        let name = name.trim();
        self.names
            .iter()
            .position(|n| n.to_lowercase() == name.to_lowercase())
            .map(|rank| self.make_level(rank))
    }

    /// Numeric band `[lower, upper)` of a level; `None` means unbounded.
    pub fn range_of(&self, level: &Level) -> (Option<f64>, Option<f64>) {
        // ---
        let lower = level
            .rank
            .checked_sub(1)
            .and_then(|i| self.thresholds.get(i).copied());
        let upper = self.thresholds.get(level.rank).copied();
        (lower, upper)
    }

    /// Range test equivalent to `classify(value) == *level` for finite values.
    pub fn contains(&self, level: &Level, value: f64) -> bool {
        let (lower, upper) = self.range_of(level);
        lower.map_or(true, |lo| value >= lo) && upper.map_or(true, |hi| value < hi)
    }

    fn make_level(&self, rank: usize) -> Level {
        Level {
            rank,
            name: self.names[rank].clone(),
        }
    }
}
