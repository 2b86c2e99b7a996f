//! Splitting a sequenced route into per-day schedules.
//!
//! Days fill greedily: each stop's travel, stay, and buffer are added
//! until the next stop would breach the daily distance or time ceiling,
//! at which point the day closes and the connecting leg moves to the
//! next morning. Stay allocations shrink through the day following the
//! energy profile, and meal breaks punctuate long unbroken stretches.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tripweaver_core::{
    DayCompactness, DaySchedule, MealBreak, MealPolicy, OptimisationSettings, RouteLeg,
    ScheduleStop, SelectedPlace, StopPriority,
};

use crate::sequencer::{RouteOutcome, RouteSegment};

/// Shrink factor applied to a stay that cannot fit its day. Higher
/// priority stops give up less time.
const fn redistribution_factor(priority: StopPriority) -> f64 {
    match priority {
        StopPriority::High => 0.9,
        StopPriority::Medium => 0.8,
        StopPriority::Low => 0.6,
    }
}

/// Fraction of packed days above which a rest day is suggested.
const REST_DAY_PACKED_FRACTION: f64 = 0.4;

/// Per-day schedules plus advisory output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleOutcome {
    /// The trip's days in order, numbered from one.
    pub days: Vec<DaySchedule>,
    /// True when enough days are packed that a rest day is advisable.
    pub rest_day_recommended: bool,
    /// Degradations encountered while scheduling, e.g. stays shrunk to
    /// fit a day.
    pub warnings: Vec<String>,
}

/// Cut a sequenced route into daily schedules.
///
/// Stops keep the route's visiting order; only day boundaries are
/// chosen here. Days never exceed `max_daily_minutes` of activity or
/// `max_daily_distance_km` of travel unless a single stop cannot fit a
/// day even after redistribution, which is reported as a warning.
#[must_use]
pub fn split_into_days(
    route: &RouteOutcome,
    selected: &[SelectedPlace],
    settings: &OptimisationSettings,
) -> ScheduleOutcome {
    let stops: HashMap<&str, &SelectedPlace> = selected
        .iter()
        .map(|s| (s.place.id.as_str(), s))
        .collect();
    let mut builder = ScheduleBuilder::new(settings);

    for (index, place_id) in route.visit_order.iter().enumerate() {
        let profile = StopProfile::for_place(place_id, stops.get(place_id.as_str()).copied());
        // Segment i connects visit i to visit i + 1.
        let inbound = index
            .checked_sub(1)
            .and_then(|previous| route.segments.get(previous));
        builder.place_stop(&profile, inbound);
    }

    builder.finish()
}

/// Scheduling inputs derived from one selected place.
struct StopProfile {
    place_id: String,
    /// Mean requested stay across contributors, before energy scaling.
    base_stay_minutes: f64,
    priority: StopPriority,
}

impl StopProfile {
    #[expect(
        clippy::float_arithmetic,
        clippy::cast_precision_loss,
        reason = "base stay is the mean of requested minutes"
    )]
    fn for_place(place_id: &str, selected: Option<&SelectedPlace>) -> Self {
        let Some(selected) = selected else {
            return Self {
                place_id: place_id.to_owned(),
                base_stay_minutes: 0.0,
                priority: StopPriority::Low,
            };
        };
        let requested: Vec<f64> = selected
            .contributors
            .iter()
            .map(|c| f64::from(c.requested_minutes))
            .collect();
        let base_stay_minutes = if requested.is_empty() {
            0.0
        } else {
            requested.iter().sum::<f64>() / requested.len() as f64
        };
        let priority = if selected.has_favourite() {
            StopPriority::High
        } else if selected.selection_score > 0.0 {
            StopPriority::Medium
        } else {
            StopPriority::Low
        };
        Self {
            place_id: selected.place.id.clone(),
            base_stay_minutes,
            priority,
        }
    }
}

/// Mutable state while walking the route.
struct ScheduleBuilder<'a> {
    settings: &'a OptimisationSettings,
    days: Vec<DaySchedule>,
    current: DayInProgress,
    warnings: Vec<String>,
}

/// One day being filled.
struct DayInProgress {
    stops: Vec<ScheduleStop>,
    legs: Vec<RouteLeg>,
    meal_breaks: Vec<MealBreak>,
    distance_km: f64,
    /// Activity plus travel plus break minutes so far.
    total_minutes: u32,
    /// Clock position, minutes since midnight.
    clock_minute: u32,
    /// Activity since the last meal break.
    continuous_minutes: u32,
}

impl DayInProgress {
    const fn fresh(day_start_minute: u32) -> Self {
        Self {
            stops: Vec::new(),
            legs: Vec::new(),
            meal_breaks: Vec::new(),
            distance_km: 0.0,
            total_minutes: 0,
            clock_minute: day_start_minute,
            continuous_minutes: 0,
        }
    }
}

impl<'a> ScheduleBuilder<'a> {
    fn new(settings: &'a OptimisationSettings) -> Self {
        Self {
            settings,
            days: Vec::new(),
            current: DayInProgress::fresh(settings.energy.day_start_minute),
            warnings: Vec::new(),
        }
    }

    /// Append one stop, opening a new day first when it cannot fit.
    fn place_stop(&mut self, profile: &StopProfile, inbound: Option<&RouteSegment>) {
        let travel = inbound.map_or(0, |s| whole_minutes(s.duration_minutes));
        let travel_km = inbound.map_or(0.0, |s| s.distance_km);

        if !self.current.stops.is_empty() && self.overflows(profile, travel, travel_km) {
            self.close_day();
        }
        // The connecting leg is travelled on whichever day the stop
        // lands on.
        if let Some(segment) = inbound {
            self.current.legs.extend(segment.legs.iter().cloned());
            self.add_distance(travel_km);
        }

        let arrival = self.current.clock_minute.saturating_add(travel);
        let mut allocated = self.allocate_stay(profile, arrival);
        if self.current.stops.is_empty() {
            allocated = self.fit_opening_stop(profile, travel, allocated);
        }
        let buffer = self.buffer_for(profile.priority);
        let departure = arrival.saturating_add(allocated);

        self.current.stops.push(ScheduleStop {
            place_id: profile.place_id.clone(),
            arrival_minute: arrival,
            departure_minute: departure,
            allocated_minutes: allocated,
            buffer_minutes: buffer,
            priority: profile.priority,
        });
        let spent = travel
            .saturating_add(allocated)
            .saturating_add(buffer);
        self.current.total_minutes = self.current.total_minutes.saturating_add(spent);
        self.current.clock_minute = departure.saturating_add(buffer);
        self.current.continuous_minutes = self
            .current
            .continuous_minutes
            .saturating_add(travel)
            .saturating_add(allocated);
        self.maybe_take_meal(&profile.place_id);
    }

    /// Would adding this stop breach a daily ceiling?
    ///
    /// The projection reserves the meal break the stop would trigger and
    /// the end-of-day buffer, so closing the day later cannot push it
    /// past `max_daily_minutes`.
    #[expect(
        clippy::float_arithmetic,
        reason = "distance ceiling compares kilometre sums"
    )]
    fn overflows(&self, profile: &StopProfile, travel: u32, travel_km: f64) -> bool {
        let arrival = self.current.clock_minute.saturating_add(travel);
        let stay = self.allocate_stay(profile, arrival);
        let buffer = self.buffer_for(profile.priority);
        let continuous = self
            .current
            .continuous_minutes
            .saturating_add(travel)
            .saturating_add(stay);
        let projected = self
            .current
            .total_minutes
            .saturating_add(travel)
            .saturating_add(stay)
            .saturating_add(buffer)
            .saturating_add(meal_minutes(&self.settings.meals, continuous))
            .saturating_add(self.settings.buffers.end_of_day_bonus);
        projected > self.settings.max_daily_minutes
            || self.current.distance_km + travel_km > self.settings.max_daily_distance_km
    }

    /// Stay allocation at `arrival`: energy-scaled mean request clamped
    /// to the stay bounds.
    #[expect(
        clippy::float_arithmetic,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        reason = "stay minutes round a scaled floating-point allocation"
    )]
    fn allocate_stay(&self, profile: &StopProfile, arrival_minute: u32) -> u32 {
        let bounds = &self.settings.stay_bounds;
        let multiplier = self.settings.energy.multiplier_at(arrival_minute);
        let scaled = profile.base_stay_minutes * multiplier;
        let clamped = scaled
            .clamp(f64::from(bounds.min_minutes), f64::from(bounds.max_minutes));
        clamped.round() as u32
    }

    /// Shrink an oversized opening stop so the day stays inside its
    /// time ceiling, never below the stay floor.
    ///
    /// The shrink factor follows the stop's priority; the fit check
    /// reserves the same meal and end-of-day minutes as [`Self::overflows`].
    #[expect(
        clippy::float_arithmetic,
        clippy::cast_possible_truncation,
        clippy::cast_sign_loss,
        reason = "redistribution scales stay minutes by a priority factor"
    )]
    fn fit_opening_stop(&mut self, profile: &StopProfile, travel: u32, allocated: u32) -> u32 {
        let settings = self.settings;
        let buffer = self.buffer_for(profile.priority);
        let fits = |stay: u32| {
            travel
                .saturating_add(stay)
                .saturating_add(buffer)
                .saturating_add(meal_minutes(
                    &settings.meals,
                    travel.saturating_add(stay),
                ))
                .saturating_add(settings.buffers.end_of_day_bonus)
                <= settings.max_daily_minutes
        };
        if fits(allocated) {
            return allocated;
        }
        let floor = settings.stay_bounds.min_minutes;
        let factor = redistribution_factor(profile.priority);
        let shrunk = ((f64::from(allocated) * factor).round() as u32).max(floor);
        let stay = if fits(shrunk) { shrunk } else { floor };
        if fits(stay) {
            self.warnings.push(format!(
                "shortened the stay at {} to {stay} minutes to fit the daily budget",
                profile.place_id
            ));
        } else {
            self.warnings.push(format!(
                "the stay at {} cannot fit the daily time budget even at its floor",
                profile.place_id
            ));
        }
        stay
    }

    const fn buffer_for(&self, priority: StopPriority) -> u32 {
        let base = self.settings.buffers.base_minutes;
        match priority {
            StopPriority::High => base + self.settings.buffers.high_priority_bonus,
            StopPriority::Medium | StopPriority::Low => base,
        }
    }

    /// Insert a meal break once continuous activity crosses the
    /// threshold. Long stretches earn the longer break.
    fn maybe_take_meal(&mut self, after_place_id: &str) {
        let minutes = meal_minutes(&self.settings.meals, self.current.continuous_minutes);
        if minutes == 0 {
            return;
        }
        self.current.meal_breaks.push(MealBreak {
            after_place_id: after_place_id.to_owned(),
            minutes,
        });
        self.current.total_minutes = self.current.total_minutes.saturating_add(minutes);
        self.current.clock_minute = self.current.clock_minute.saturating_add(minutes);
        self.current.continuous_minutes = 0;
    }

    #[expect(
        clippy::float_arithmetic,
        reason = "day distance accumulates kilometre sums"
    )]
    fn add_distance(&mut self, travel_km: f64) {
        self.current.distance_km += travel_km;
    }

    /// Seal the current day and start a fresh one.
    fn close_day(&mut self) {
        let bonus = self.settings.buffers.end_of_day_bonus;
        if let Some(last) = self.current.stops.last_mut() {
            last.buffer_minutes = last.buffer_minutes.saturating_add(bonus);
            self.current.total_minutes = self.current.total_minutes.saturating_add(bonus);
        }
        let day = DayInProgress::fresh(self.settings.energy.day_start_minute);
        let finished = std::mem::replace(&mut self.current, day);
        let number = u32::try_from(self.days.len()).unwrap_or(u32::MAX).saturating_add(1);
        self.days.push(DaySchedule {
            day: number,
            stops: finished.stops,
            legs: finished.legs,
            meal_breaks: finished.meal_breaks,
            total_distance_km: finished.distance_km,
            total_minutes: finished.total_minutes,
            compactness: DaySchedule::classify(finished.total_minutes),
        });
    }

    #[expect(
        clippy::float_arithmetic,
        clippy::cast_precision_loss,
        reason = "rest-day advice compares a packed-day fraction"
    )]
    fn finish(mut self) -> ScheduleOutcome {
        if !self.current.stops.is_empty() {
            self.close_day();
        }
        let packed = self
            .days
            .iter()
            .filter(|d| d.compactness == DayCompactness::Packed)
            .count();
        let rest_day_recommended = !self.days.is_empty()
            && packed as f64 / self.days.len() as f64 > REST_DAY_PACKED_FRACTION;
        if rest_day_recommended {
            self.warnings.push(
                "more than two in five days are packed; consider adding a rest day".to_owned(),
            );
        }
        ScheduleOutcome {
            days: self.days,
            rest_day_recommended,
            warnings: self.warnings,
        }
    }
}

/// Break length a continuous stretch earns, zero below the threshold.
fn meal_minutes(policy: &MealPolicy, continuous_minutes: u32) -> u32 {
    if continuous_minutes < policy.continuous_activity_minutes {
        0
    } else if continuous_minutes >= policy.continuous_activity_minutes.saturating_add(120) {
        policy.max_break_minutes
    } else {
        policy.min_break_minutes
    }
}

#[expect(
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    reason = "travel durations are small positive minute counts"
)]
fn whole_minutes(duration: f64) -> u32 {
    if duration <= 0.0 {
        0
    } else {
        duration.round() as u32
    }
}
