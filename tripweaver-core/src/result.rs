//! The immutable result snapshot of a successful run.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{DaySchedule, RouteLeg, SelectedPlace};

/// Engine version recorded in generation metadata and cache keys.
pub const ALGORITHM_VERSION: &str = "tripweaver/1";

/// Fairness and efficiency metrics of an itinerary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripMetrics {
    /// Group fairness score `exp(-variance(ratios))` in `(0, 1]`; one
    /// means perfectly equal representation.
    pub fairness_score: f64,
    /// Sum of all leg distances.
    pub total_distance_km: f64,
    /// Sum of activity, travel, buffer, and break time over all days.
    pub total_duration_minutes: u32,
    /// Route efficiency `1 / (1 + mean_leg_km / 25)`, a monotone
    /// decreasing function of mean leg length.
    pub efficiency_score: f64,
}

/// Provenance metadata for one generated itinerary.
///
/// Wall-clock fields vary between runs by design and are excluded from
/// the determinism guarantee and the cache key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationInfo {
    /// Engine version that produced the result.
    pub algorithm_version: String,
    /// When the run completed.
    pub generated_at: DateTime<Utc>,
    /// Wall-clock duration of the run.
    pub processing_time_ms: u64,
}

/// Immutable snapshot of one successful optimisation run.
///
/// Subsequent runs supersede rather than mutate earlier results; the
/// orchestrator owns the lifecycle (creation, caching, persistence).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimisationResult {
    /// Places chosen by the fair selector, in selection order.
    pub selected_places: Vec<SelectedPlace>,
    /// Full sequenced route, including airport sub-legs.
    pub route: Vec<RouteLeg>,
    /// Day-by-day schedules.
    pub day_schedules: Vec<DaySchedule>,
    /// Aggregate metrics.
    pub metrics: TripMetrics,
    /// Provenance metadata.
    pub generation: GenerationInfo,
    /// Non-fatal conditions observed during the run: normalisation
    /// fallbacks, airport degradations, rest-day recommendations.
    pub warnings: Vec<String>,
}

impl OptimisationResult {
    /// The deterministic portion of the result, serialised as JSON.
    ///
    /// Two runs over identical input produce identical payloads; only
    /// [`GenerationInfo`] may differ.
    ///
    /// # Errors
    /// Propagates `serde_json` serialisation failures.
    pub fn deterministic_payload(&self) -> Result<String, serde_json::Error> {
        #[derive(Serialize)]
        struct Payload<'a> {
            selected_places: &'a [SelectedPlace],
            route: &'a [RouteLeg],
            day_schedules: &'a [DaySchedule],
            metrics: &'a TripMetrics,
            warnings: &'a [String],
        }
        serde_json::to_string(&Payload {
            selected_places: &self.selected_places,
            route: &self.route,
            day_schedules: &self.day_schedules,
            metrics: &self.metrics,
            warnings: &self.warnings,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_result() -> OptimisationResult {
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
                processing_time_ms: 3,
            },
            warnings: Vec::new(),
        }
    }

    #[test]
    fn deterministic_payload_excludes_generation_metadata() {
        let first = empty_result();
        let mut second = first.clone();
        second.generation.processing_time_ms = 99;
        let lhs = first.deterministic_payload().expect("payload");
        let rhs = second.deterministic_payload().expect("payload");
        assert_eq!(lhs, rhs);
        assert!(!lhs.contains("processing_time_ms"));
    }
}
