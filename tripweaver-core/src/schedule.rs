//! Per-day schedules produced by the splitter.

use serde::{Deserialize, Serialize};

use crate::RouteLeg;

/// Qualitative classification of how full a day is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DayCompactness {
    /// Under five hours of activity and travel.
    Light,
    /// Five to seven hours.
    Moderate,
    /// Over seven hours.
    Packed,
}

/// Scheduling priority of a stop, derived from its selection record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopPriority {
    /// A contributor flagged the place as a favourite.
    High,
    /// Selected on a positive blended score.
    Medium,
    /// Selected despite a non-positive blended score.
    Low,
}

/// One visit within a day.
///
/// Times are minutes since midnight of the schedule's day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleStop {
    /// Place being visited.
    pub place_id: String,
    /// Arrival time, minutes since midnight.
    pub arrival_minute: u32,
    /// Departure time, minutes since midnight.
    pub departure_minute: u32,
    /// Time allocated to the visit itself.
    pub allocated_minutes: u32,
    /// Slack added after the visit.
    pub buffer_minutes: u32,
    /// Priority used for buffers and redistribution.
    pub priority: StopPriority,
}

/// A rest or meal break inserted into a day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MealBreak {
    /// Stop after which the break is taken.
    pub after_place_id: String,
    /// Break length in minutes.
    pub minutes: u32,
}

/// The ordered plan for one calendar day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DaySchedule {
    /// One-based day number within the trip.
    pub day: u32,
    /// Visits in order.
    pub stops: Vec<ScheduleStop>,
    /// Legs connecting the day's stops, in travel order.
    pub legs: Vec<RouteLeg>,
    /// Meal breaks inserted into the day.
    pub meal_breaks: Vec<MealBreak>,
    /// Distance travelled during the day, in kilometres.
    pub total_distance_km: f64,
    /// Activity plus travel plus break time, in minutes.
    pub total_minutes: u32,
    /// How full the day is.
    pub compactness: DayCompactness,
}

impl DaySchedule {
    /// Classify a day's fullness from its total minutes.
    ///
    /// Thresholds follow the light/moderate/packed bands: under five
    /// hours, five to seven hours, and beyond.
    #[must_use]
    pub const fn classify(total_minutes: u32) -> DayCompactness {
        if total_minutes < 300 {
            DayCompactness::Light
        } else if total_minutes <= 420 {
            DayCompactness::Moderate
        } else {
            DayCompactness::Packed
        }
    }
}
