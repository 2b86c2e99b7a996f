//! Durable persistence of completed runs.
//!
//! A trip's runs accumulate as immutable snapshots; the newest run for a
//! trip supersedes the rest. Only successful runs are persisted, and a
//! store failure never fails the run that produced the result.

use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tripweaver_core::OptimisationResult;

/// The store could not serve a request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    /// The backing store was unreachable or refused the write.
    #[error("result store unavailable: {reason}")]
    Unavailable {
        /// Human-readable cause.
        reason: String,
    },
}

/// One persisted optimisation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistedRun {
    /// Trip the run belongs to.
    pub trip_id: String,
    /// Content-hash cache key the run was stored under.
    pub cache_key: String,
    /// Hash of the place list at run time.
    pub places_hash: String,
    /// Hash of the settings at run time.
    pub settings_hash: String,
    /// The run's result snapshot.
    pub result: OptimisationResult,
    /// When the run was persisted.
    pub persisted_at: DateTime<Utc>,
}

/// Durable storage for completed runs.
pub trait ResultStore: Send + Sync {
    /// Persist one completed run.
    ///
    /// # Errors
    /// Returns [`StoreError`] when the backing store cannot accept the
    /// write.
    fn persist(&self, run: &PersistedRun) -> Result<(), StoreError>;

    /// Most recently persisted run for a trip, if any.
    ///
    /// # Errors
    /// Returns [`StoreError`] when the backing store cannot answer.
    fn latest(&self, trip_id: &str) -> Result<Option<PersistedRun>, StoreError>;
}

/// In-process store backed by a mutex-guarded vector.
#[derive(Debug, Default)]
pub struct MemoryResultStore {
    runs: Mutex<Vec<PersistedRun>>,
}

impl MemoryResultStore {
    /// Build an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Every run persisted so far, oldest first.
    ///
    /// # Errors
    /// Returns [`StoreError`] when the guarding mutex is poisoned.
    pub fn all(&self) -> Result<Vec<PersistedRun>, StoreError> {
        Ok(self.locked()?.clone())
    }

    fn locked(&self) -> Result<std::sync::MutexGuard<'_, Vec<PersistedRun>>, StoreError> {
        self.runs.lock().map_err(|_| StoreError::Unavailable {
            reason: "store mutex poisoned".to_owned(),
        })
    }
}

impl ResultStore for MemoryResultStore {
    fn persist(&self, run: &PersistedRun) -> Result<(), StoreError> {
        self.locked()?.push(run.clone());
        Ok(())
    }

    fn latest(&self, trip_id: &str) -> Result<Option<PersistedRun>, StoreError> {
        Ok(self
            .locked()?
            .iter()
            .rev()
            .find(|run| run.trip_id == trip_id)
            .cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use tripweaver_core::{ALGORITHM_VERSION, GenerationInfo, TripMetrics};

    fn run(trip_id: &str, processing_time_ms: u64) -> PersistedRun {
        PersistedRun {
            trip_id: trip_id.into(),
            cache_key: "key".into(),
            places_hash: "places".into(),
            settings_hash: "settings".into(),
            result: OptimisationResult {
                selected_places: Vec::new(),
                route: Vec::new(),
                day_schedules: Vec::new(),
                metrics: TripMetrics {
                    fairness_score: 1.0,
                    total_distance_km: 0.0,
                    total_duration_minutes: 0,
                    efficiency_score: 1.0,
                },
                generation: GenerationInfo {
                    algorithm_version: ALGORITHM_VERSION.into(),
                    generated_at: Utc::now(),
                    processing_time_ms,
                },
                warnings: Vec::new(),
            },
            persisted_at: Utc::now(),
        }
    }

    #[rstest]
    fn latest_returns_the_newest_run_for_the_trip() {
        let store = MemoryResultStore::new();
        store.persist(&run("trip-1", 1)).expect("persist");
        store.persist(&run("trip-2", 2)).expect("persist");
        store.persist(&run("trip-1", 3)).expect("persist");
        let latest = store
            .latest("trip-1")
            .expect("query")
            .expect("run exists");
        assert_eq!(latest.result.generation.processing_time_ms, 3);
    }

    #[rstest]
    fn unknown_trips_have_no_runs() {
        let store = MemoryResultStore::new();
        assert!(store.latest("trip-ghost").expect("query").is_none());
    }
}
