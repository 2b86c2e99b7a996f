//! The stage machine driving one optimisation run.
//!
//! Stages advance collecting → normalising → selecting → routing →
//! complete; any failure jumps to the error stage and nothing is cached
//! or persisted for the failed run. Collaborator misbehaviour (progress
//! sinks, cache, store) is logged and swallowed; only engine errors
//! abort a run.

use std::time::{Duration, Instant};

use chrono::Utc;
use tripweaver_core::{
    ALGORITHM_VERSION, AirportDirectory, EngineError, GenerationInfo, OptimisationRequest,
    OptimisationResult, ProgressSink, ProgressUpdate, RouteLeg, Stage, TripMetrics,
};
use tripweaver_core::error::InsufficientDataError;
use tripweaver_routing::{RouteOutcome, ScheduleOutcome, sequence_route, split_into_days};
use tripweaver_scoring::{
    ClusterParams, NormaliserConfig, SelectionOutcome, SelectionParams, cluster_places,
    normalise_preferences, select_places, verify_radius_consistency,
};

use crate::cache::ResultCache;
use crate::hash::{ContentHash, content_hash};
use crate::store::{PersistedRun, ResultStore};

/// Default lifetime of cached results.
const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(3600);

/// Mean leg length at which route efficiency halves, in kilometres.
const EFFICIENCY_HALFWAY_KM: f64 = 25.0;

/// Drives optimisation runs end to end.
///
/// Collaborators are borrowed traits so callers choose the cache, store,
/// progress, and airport implementations per deployment.
pub struct Orchestrator<'a> {
    cache: &'a dyn ResultCache,
    store: &'a dyn ResultStore,
    progress: &'a dyn ProgressSink,
    airports: &'a dyn AirportDirectory,
    cache_ttl: Duration,
}

impl<'a> Orchestrator<'a> {
    /// Assemble an orchestrator over its collaborators.
    #[must_use]
    pub fn new(
        cache: &'a dyn ResultCache,
        store: &'a dyn ResultStore,
        progress: &'a dyn ProgressSink,
        airports: &'a dyn AirportDirectory,
    ) -> Self {
        Self {
            cache,
            store,
            progress,
            airports,
            cache_ttl: DEFAULT_CACHE_TTL,
        }
    }

    /// Override the cache time-to-live.
    #[must_use]
    pub const fn with_cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    /// Run one optimisation request to completion.
    ///
    /// Identical requests return the cached result when one is live;
    /// otherwise the full pipeline runs and the result is cached and
    /// persisted before returning.
    ///
    /// # Errors
    /// Returns [`EngineError`] for invalid input, insufficient data, or
    /// a failed internal self-check. Failed runs write nothing.
    pub fn optimise(
        &self,
        request: &OptimisationRequest,
    ) -> Result<OptimisationResult, EngineError> {
        let started = Instant::now();
        self.report(Stage::Collecting, "validating request");
        request.validate().map_err(|err| self.fail(err.into()))?;
        if request.places.is_empty() {
            return Err(self.fail(InsufficientDataError::NoPlaces.into()));
        }

        let hashes = match content_hash(request) {
            Ok(hashes) => Some(hashes),
            Err(error) => {
                log::warn!("content hashing failed, skipping cache: {error}");
                None
            }
        };
        if let Some(hashes) = &hashes
            && let Some(cached) = self.cached(&hashes.cache_key)
        {
            self.report(Stage::Complete, "itinerary served from cache");
            return Ok(cached);
        }

        self.report(Stage::Normalising, "standardising preferences");
        if request.preferences.is_empty() {
            return Err(self.fail(InsufficientDataError::NoPreferences.into()));
        }
        let normalised = normalise_preferences(&request.preferences, &NormaliserConfig::default())
            .map_err(|err| self.fail(err.into()))?;
        let mut warnings: Vec<String> = normalised
            .warnings
            .iter()
            .map(tripweaver_scoring::NormalisationWarning::message)
            .collect();

        self.report(Stage::Selecting, "clustering and selecting places");
        let cluster_params = ClusterParams {
            max_radius_km: request.settings.max_cluster_radius_km,
        };
        let clusters = cluster_places(
            &request.places,
            &normalised.standardised,
            &request.preferences,
            &cluster_params,
        );
        verify_radius_consistency(&clusters, &request.places, cluster_params.max_radius_km)
            .map_err(|err| self.fail(err.into()))?;
        let selection = select_places(
            &request.places,
            &normalised.standardised,
            &request.preferences,
            &request.members,
            &SelectionParams {
                max_places: request.settings.max_places,
                fairness_weight: request.settings.fairness_weight,
            },
        );
        if !selection.selected.iter().any(|s| s.selection_round > 0) {
            return Err(self.fail(InsufficientDataError::NoCandidates.into()));
        }

        self.report(Stage::Routing, "sequencing route and splitting days");
        let route = sequence_route(&selection.selected, &request.settings, self.airports)
            .map_err(|err| self.fail(err.into()))?;
        let schedule = split_into_days(&route, &selection.selected, &request.settings);
        warnings.extend(route.warnings.iter().cloned());
        warnings.extend(schedule.warnings.iter().cloned());

        let result = assemble_result(&selection, &route, schedule, warnings, started);
        self.record(request, &hashes, &result);
        self.report(Stage::Complete, "itinerary ready");
        Ok(result)
    }

    /// Look up a live cached result; failures degrade to a recompute.
    fn cached(&self, key: &str) -> Option<OptimisationResult> {
        match self.cache.get(key) {
            Ok(hit) => hit,
            Err(error) => {
                log::warn!("cache lookup failed, recomputing: {error}");
                None
            }
        }
    }

    /// Cache and persist a completed run; failures are logged, never
    /// propagated.
    fn record(
        &self,
        request: &OptimisationRequest,
        hashes: &Option<ContentHash>,
        result: &OptimisationResult,
    ) {
        let Some(hashes) = hashes else {
            return;
        };
        if let Err(error) = self.cache.put(&hashes.cache_key, result, self.cache_ttl) {
            log::warn!("failed to cache result: {error}");
        }
        let run = PersistedRun {
            trip_id: request.trip_id.clone(),
            cache_key: hashes.cache_key.clone(),
            places_hash: hashes.places_hash.clone(),
            settings_hash: hashes.settings_hash.clone(),
            result: result.clone(),
            persisted_at: Utc::now(),
        };
        if let Err(error) = self.store.persist(&run) {
            log::warn!("failed to persist run: {error}");
        }
    }

    fn report(&self, stage: Stage, message: &str) {
        self.progress
            .report(&ProgressUpdate::for_stage(stage, message));
    }

    /// Report the error stage and hand the error back for propagation.
    fn fail(&self, error: EngineError) -> EngineError {
        self.report(Stage::Error, &error.to_string());
        error
    }
}

/// Fold the stage outputs into the immutable result snapshot.
#[expect(
    clippy::float_arithmetic,
    clippy::cast_precision_loss,
    reason = "metrics derive from kilometre and minute aggregates"
)]
fn assemble_result(
    selection: &SelectionOutcome,
    route: &RouteOutcome,
    schedule: ScheduleOutcome,
    warnings: Vec<String>,
    started: Instant,
) -> OptimisationResult {
    let legs: Vec<RouteLeg> = route
        .segments
        .iter()
        .flat_map(|s| s.legs.iter().cloned())
        .collect();
    let efficiency_score = if legs.is_empty() {
        1.0
    } else {
        let mean_leg_km = route.total_distance_km / legs.len() as f64;
        1.0 / (1.0 + mean_leg_km / EFFICIENCY_HALFWAY_KM)
    };
    let total_duration_minutes = schedule
        .days
        .iter()
        .fold(0_u32, |acc, d| acc.saturating_add(d.total_minutes));

    OptimisationResult {
        selected_places: selection.selected.clone(),
        route: legs,
        day_schedules: schedule.days,
        metrics: TripMetrics {
            fairness_score: selection.fairness_score,
            total_distance_km: route.total_distance_km,
            total_duration_minutes,
            efficiency_score,
        },
        generation: GenerationInfo {
            algorithm_version: ALGORITHM_VERSION.into(),
            generated_at: Utc::now(),
            processing_time_ms: u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
        },
        warnings,
    }
}
