//! Result caching keyed by request content hash.
//!
//! Cache failures are never fatal: the orchestrator logs them and
//! recomputes. Entries expire after a time-to-live so stale itineraries
//! age out even when nothing invalidates them explicitly.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use thiserror::Error;
use tripweaver_core::OptimisationResult;

/// The cache could not serve a request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CacheError {
    /// The backing cache was unreachable or corrupted.
    #[error("result cache unavailable: {reason}")]
    Unavailable {
        /// Human-readable cause.
        reason: String,
    },
}

/// Stores optimisation results under content-hash keys.
pub trait ResultCache: Send + Sync {
    /// Fetch a live entry; expired entries read as absent.
    ///
    /// # Errors
    /// Returns [`CacheError`] when the backing cache cannot answer.
    fn get(&self, key: &str) -> Result<Option<OptimisationResult>, CacheError>;

    /// Store an entry that expires after `ttl`.
    ///
    /// # Errors
    /// Returns [`CacheError`] when the backing cache cannot accept the
    /// entry.
    fn put(&self, key: &str, result: &OptimisationResult, ttl: Duration)
    -> Result<(), CacheError>;

    /// Drop every entry.
    ///
    /// # Errors
    /// Returns [`CacheError`] when the backing cache cannot be cleared.
    fn flush(&self) -> Result<(), CacheError>;
}

/// In-process cache backed by a mutex-guarded map.
#[derive(Debug, Default)]
pub struct MemoryResultCache {
    entries: Mutex<HashMap<String, Entry>>,
}

#[derive(Debug, Clone)]
struct Entry {
    result: OptimisationResult,
    expires_at: Instant,
}

impl MemoryResultCache {
    /// Build an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn locked(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, Entry>>, CacheError> {
        self.entries.lock().map_err(|_| CacheError::Unavailable {
            reason: "cache mutex poisoned".to_owned(),
        })
    }
}

impl ResultCache for MemoryResultCache {
    fn get(&self, key: &str) -> Result<Option<OptimisationResult>, CacheError> {
        let mut entries = self.locked()?;
        match entries.get(key) {
            Some(entry) if entry.expires_at > Instant::now() => Ok(Some(entry.result.clone())),
            Some(_) => {
                entries.remove(key);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    fn put(
        &self,
        key: &str,
        result: &OptimisationResult,
        ttl: Duration,
    ) -> Result<(), CacheError> {
        let mut entries = self.locked()?;
        entries.insert(
            key.to_owned(),
            Entry {
                result: result.clone(),
                expires_at: Instant::now() + ttl,
            },
        );
        Ok(())
    }

    fn flush(&self) -> Result<(), CacheError> {
        self.locked()?.clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rstest::rstest;
    use tripweaver_core::{ALGORITHM_VERSION, GenerationInfo, TripMetrics};

    fn result() -> OptimisationResult {
        OptimisationResult {
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
                processing_time_ms: 1,
            },
            warnings: Vec::new(),
        }
    }

    #[rstest]
    fn round_trips_within_the_ttl() {
        let cache = MemoryResultCache::new();
        cache
            .put("key", &result(), Duration::from_secs(60))
            .expect("put");
        let fetched = cache.get("key").expect("get");
        assert!(fetched.is_some());
    }

    #[rstest]
    fn expired_entries_read_as_absent() {
        let cache = MemoryResultCache::new();
        cache
            .put("key", &result(), Duration::from_secs(0))
            .expect("put");
        assert!(cache.get("key").expect("get").is_none());
    }

    #[rstest]
    fn flush_empties_the_cache() {
        let cache = MemoryResultCache::new();
        cache
            .put("key", &result(), Duration::from_secs(60))
            .expect("put");
        cache.flush().expect("flush");
        assert!(cache.get("key").expect("get").is_none());
    }
}
