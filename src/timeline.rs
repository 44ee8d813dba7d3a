//! Deduplicated, time-ordered store of readings.
//!
//! The bulk snapshot lands through [`TimelineStore::load`] and live messages
//! through [`TimelineStore::ingest`]. Readings are unique by `timestamp_id`;
//! a duplicate overwrites the stored reading in place, so the bulk payload and
//! the stream may overlap without double counting.

use std::collections::HashMap;

use crate::models::Reading;

// ---

/// Result of a single [`TimelineStore::ingest`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IngestOutcome {
    Inserted,
    Replaced,
}

#[derive(Debug, Default, Clone)]
pub struct TimelineStore {
    /// Insertion order.
    readings: Vec<Reading>,
    /// `timestamp_id` -> position in `readings`.
    index: HashMap<String, usize>,
}

impl TimelineStore {
    // ---
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole contents. Duplicates within `readings` collapse,
    /// the last one winning.
    pub fn load(&mut self, readings: Vec<Reading>) {
        // ---
        self.readings.clear();
        self.index.clear();
        for reading in readings {
            self.ingest(reading);
        }
    }

    /// Add one reading, overwriting any stored reading with the same id.
    pub fn ingest(&mut self, reading: Reading) -> IngestOutcome {
        // ---
        match self.index.get(&reading.timestamp_id) {
            Some(&pos) => {
                self.readings[pos] = reading;
                IngestOutcome::Replaced
            }
            None => {
                self.index
                    .insert(reading.timestamp_id.clone(), self.readings.len());
                self.readings.push(reading);
                IngestOutcome::Inserted
            }
        }
    }

    /// Chronological copy of the contents, ascending by `timestamp_id`.
    pub fn snapshot(&self) -> Vec<Reading> {
        let mut out = self.readings.clone();
        out.sort_by(|a, b| a.timestamp_id.cmp(&b.timestamp_id));
        out
    }

    /// Readings in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Reading> {
        self.readings.iter()
    }

    pub fn get(&self, timestamp_id: &str) -> Option<&Reading> {
        self.index.get(timestamp_id).map(|&pos| &self.readings[pos])
    }

    pub fn len(&self) -> usize {
        self.readings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }
}
