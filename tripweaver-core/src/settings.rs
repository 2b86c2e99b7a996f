//! Optimisation settings and their configuration defaults.
//!
//! The numeric tables here (energy multipliers, buffer sizes, meal
//! thresholds) are tunable defaults, not invariants; callers may override
//! any of them per request.

use serde::{Deserialize, Serialize};

use crate::TransportMode;
use crate::error::ValidationError;

/// Distance thresholds and speeds used for transport-mode decisions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransportPolicy {
    /// Legs at or below this distance are walked.
    pub walk_max_km: f64,
    /// Legs at or below this distance are driven; beyond it they fly.
    pub drive_max_km: f64,
    /// Average walking speed.
    pub walk_speed_kmh: f64,
    /// Average driving speed.
    pub drive_speed_kmh: f64,
    /// Average cruise speed for fly legs.
    pub fly_speed_kmh: f64,
    /// Fixed overhead per flight for check-in, boarding, and taxiing.
    pub flight_overhead_minutes: f64,
    /// Radius used when querying the airport directory.
    pub airport_search_radius_km: f64,
    /// Minimum capability score an airport must reach to serve a leg.
    pub min_airport_capability: f64,
}

impl Default for TransportPolicy {
    fn default() -> Self {
        Self {
            walk_max_km: 5.0,
            drive_max_km: 500.0,
            walk_speed_kmh: 4.5,
            drive_speed_kmh: 60.0,
            fly_speed_kmh: 750.0,
            flight_overhead_minutes: 90.0,
            airport_search_radius_km: 150.0,
            min_airport_capability: 0.5,
        }
    }
}

/// Energy-period multipliers applied to stay-time allocation.
///
/// Visitors flag earlier in the day; later periods shorten stays.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnergyProfile {
    /// Minutes since midnight when the touring day starts.
    pub day_start_minute: u32,
    /// End of the morning period, minutes since midnight.
    pub morning_end_minute: u32,
    /// End of the afternoon period, minutes since midnight.
    pub afternoon_end_minute: u32,
    /// Stay multiplier during the morning.
    pub morning_multiplier: f64,
    /// Stay multiplier during the afternoon.
    pub afternoon_multiplier: f64,
    /// Stay multiplier during the evening.
    pub evening_multiplier: f64,
}

impl Default for EnergyProfile {
    fn default() -> Self {
        Self {
            day_start_minute: 540,
            morning_end_minute: 720,
            afternoon_end_minute: 1020,
            morning_multiplier: 1.0,
            afternoon_multiplier: 0.85,
            evening_multiplier: 0.7,
        }
    }
}

impl EnergyProfile {
    /// Multiplier in force at `minute` since midnight.
    #[must_use]
    pub const fn multiplier_at(&self, minute: u32) -> f64 {
        if minute < self.morning_end_minute {
            self.morning_multiplier
        } else if minute < self.afternoon_end_minute {
            self.afternoon_multiplier
        } else {
            self.evening_multiplier
        }
    }
}

/// Buffer minutes appended after each stop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BufferPolicy {
    /// Base buffer after every stop.
    pub base_minutes: u32,
    /// Extra buffer after high-priority stops.
    pub high_priority_bonus: u32,
    /// Extra buffer after the final stop of a day.
    pub end_of_day_bonus: u32,
}

impl Default for BufferPolicy {
    fn default() -> Self {
        Self {
            base_minutes: 15,
            high_priority_bonus: 10,
            end_of_day_bonus: 15,
        }
    }
}

/// Meal-break insertion thresholds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MealPolicy {
    /// Continuous activity beyond this triggers a break.
    pub continuous_activity_minutes: u32,
    /// Shortest break inserted.
    pub min_break_minutes: u32,
    /// Longest break inserted.
    pub max_break_minutes: u32,
}

impl Default for MealPolicy {
    fn default() -> Self {
        Self {
            continuous_activity_minutes: 240,
            min_break_minutes: 30,
            max_break_minutes: 60,
        }
    }
}

/// Clamp range for per-stop stay allocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StayBounds {
    /// Floor for any allocated stay. Redistribution never cuts below
    /// this either.
    pub min_minutes: u32,
    /// Ceiling for any allocated stay.
    pub max_minutes: u32,
}

impl Default for StayBounds {
    fn default() -> Self {
        Self {
            min_minutes: 30,
            max_minutes: 240,
        }
    }
}

/// Caller-supplied knobs for one optimisation run.
///
/// # Examples
/// ```
/// use tripweaver_core::OptimisationSettings;
///
/// let settings = OptimisationSettings::default();
/// assert!(settings.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimisationSettings {
    /// Balance between aggregate desirability and fairness, in `[0, 1]`.
    pub fairness_weight: f64,
    /// Upper bound on competed (non-system) places.
    pub max_places: usize,
    /// Daily travel distance ceiling.
    pub max_daily_distance_km: f64,
    /// Daily activity-plus-travel time ceiling.
    pub max_daily_minutes: u32,
    /// Radius used by the geographic clusterer.
    pub max_cluster_radius_km: f64,
    /// Modes the group is willing to use, in preference order.
    #[serde(default = "default_transport_modes")]
    pub preferred_transport_modes: Vec<TransportMode>,
    /// Transport thresholds and speeds.
    #[serde(default)]
    pub transport: TransportPolicy,
    /// Energy-period stay multipliers.
    #[serde(default)]
    pub energy: EnergyProfile,
    /// Buffer policy.
    #[serde(default)]
    pub buffers: BufferPolicy,
    /// Meal-break policy.
    #[serde(default)]
    pub meals: MealPolicy,
    /// Stay allocation clamp range.
    #[serde(default)]
    pub stay_bounds: StayBounds,
}

fn default_transport_modes() -> Vec<TransportMode> {
    vec![TransportMode::Walk, TransportMode::Drive, TransportMode::Fly]
}

impl Default for OptimisationSettings {
    fn default() -> Self {
        Self {
            fairness_weight: 0.5,
            max_places: 10,
            max_daily_distance_km: 200.0,
            max_daily_minutes: 600,
            max_cluster_radius_km: 2.0,
            preferred_transport_modes: default_transport_modes(),
            transport: TransportPolicy::default(),
            energy: EnergyProfile::default(),
            buffers: BufferPolicy::default(),
            meals: MealPolicy::default(),
            stay_bounds: StayBounds::default(),
        }
    }
}

impl OptimisationSettings {
    /// Check every numeric range at the request boundary.
    ///
    /// # Errors
    /// Returns the first [`ValidationError`] encountered; settings are
    /// checked before any stage runs.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if !(0.0..=1.0).contains(&self.fairness_weight) {
            return Err(ValidationError::FairnessWeightOutOfRange {
                value: self.fairness_weight,
            });
        }
        if self.max_places == 0 {
            return Err(ValidationError::MaxPlacesZero);
        }
        let budgets: [(&'static str, bool); 5] = [
            ("max_daily_distance_km", self.max_daily_distance_km > 0.0),
            ("max_daily_minutes", self.max_daily_minutes > 0),
            ("max_cluster_radius_km", self.max_cluster_radius_km > 0.0),
            (
                "stay_bounds",
                self.stay_bounds.min_minutes > 0
                    && self.stay_bounds.max_minutes >= self.stay_bounds.min_minutes,
            ),
            (
                "transport",
                self.transport.walk_max_km > 0.0
                    && self.transport.drive_max_km > self.transport.walk_max_km,
            ),
        ];
        for (field, ok) in budgets {
            if !ok {
                return Err(ValidationError::NonPositiveBudget { field });
            }
        }
        Ok(())
    }
}
