//! Shared application state: the timeline behind a single mutex plus a
//! revision counter published on every mutation.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::{watch, Mutex};
use tracing::debug;

use crate::aggregate::{self, AggregateConfig, Summary};
use crate::filter::{self, FilterCriteria};
use crate::models::Reading;
use crate::severity::SeverityScale;
use crate::timeline::{IngestOutcome, TimelineStore};

// ---

#[derive(Debug, Clone)]
pub struct AppState {
    inner: Arc<Shared>,
}

#[derive(Debug)]
struct Shared {
    timeline: Mutex<Timeline>,
    revision: watch::Sender<u64>,
    scale: SeverityScale,
    windows: AggregateConfig,
}

/// The store plus the readings ingested before the first snapshot arrived.
///
/// `early` is `Some` until the first `load` (or [`AppState::skip_snapshot`]);
/// those readings are replayed on top of the snapshot.
#[derive(Debug)]
struct Timeline {
    store: TimelineStore,
    early: Option<Vec<Reading>>,
}

impl AppState {
    // ---
    pub fn new(scale: SeverityScale, windows: AggregateConfig) -> Self {
        let (revision, _) = watch::channel(0);
        AppState {
            inner: Arc::new(Shared {
                timeline: Mutex::new(Timeline {
                    store: TimelineStore::new(),
                    early: Some(Vec::new()),
                }),
                revision,
                scale,
                windows,
            }),
        }
    }

    pub fn scale(&self) -> &SeverityScale {
        &self.inner.scale
    }

    pub fn windows(&self) -> &AggregateConfig {
        &self.inner.windows
    }

    /// Replace the timeline with a bulk snapshot.
    ///
    /// On the first load, readings ingested earlier are replayed on top of
    /// the snapshot so an acknowledged ingest is never lost.
    pub async fn load(&self, readings: Vec<Reading>) {
        let mut timeline = self.inner.timeline.lock().await;
        let Timeline { store, early } = &mut *timeline;
        store.load(readings);
        if let Some(early) = early.take() {
            if !early.is_empty() {
                debug!("Replaying {} readings ingested before the snapshot", early.len());
            }
            for reading in early {
                store.ingest(reading);
            }
        }
        debug!("Timeline loaded: {} readings", store.len());
        self.bump();
    }

    /// No snapshot is coming; stop holding early ingests for replay.
    pub async fn skip_snapshot(&self) {
        self.inner.timeline.lock().await.early = None;
    }

    pub async fn ingest(&self, reading: Reading) -> IngestOutcome {
        let mut timeline = self.inner.timeline.lock().await;
        if let Some(early) = timeline.early.as_mut() {
            early.push(reading.clone());
        }
        let outcome = timeline.store.ingest(reading);
        self.bump();
        outcome
    }

    /// Chronological copy of the timeline.
    pub async fn snapshot(&self) -> Vec<Reading> {
        self.inner.timeline.lock().await.store.snapshot()
    }

    pub fn revision(&self) -> u64 {
        *self.inner.revision.borrow()
    }

    /// Notified after every `load` / `ingest`.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.inner.revision.subscribe()
    }

    /// Filtered, chronological view of the timeline.
    pub async fn view(&self, criteria: &FilterCriteria) -> Vec<Reading> {
        let snapshot = self.snapshot().await;
        filter::apply(&snapshot, criteria, &self.inner.scale)
    }

    pub async fn summary(&self, criteria: &FilterCriteria, now: DateTime<Utc>) -> Summary {
        let filtered = self.view(criteria).await;
        aggregate::summarize(&filtered, &self.inner.scale, &self.inner.windows, now)
    }

    fn bump(&self) {
        self.inner.revision.send_modify(|rev| *rev += 1);
    }
}

/// Re-derive the unfiltered summary after every change and log it.
pub async fn watch_changes(state: AppState) {
    // ---
    let mut changes = state.subscribe();
    while changes.changed().await.is_ok() {
        let revision = *changes.borrow_and_update();
        let summary = state.summary(&FilterCriteria::default(), Utc::now()).await;
        debug!(
            revision,
            total = summary.total_readings,
            alerts = summary.counts.total_alerts,
            normal = summary.counts.normal_readings,
            "Timeline changed"
        );
    }
}
