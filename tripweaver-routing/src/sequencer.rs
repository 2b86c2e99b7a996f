//! Nearest-neighbour route sequencing with transport-mode decisions.
//!
//! The route starts at the departure place when one exists, visits the
//! remaining places greedily by great-circle distance, and finishes at
//! the destination place when one exists. Distance ties break on lexical
//! place id so identical input always sequences identically.

use geo::Coord;
use serde::{Deserialize, Serialize};
use tripweaver_core::error::InsufficientDataError;
use tripweaver_core::geo::haversine_km;
use tripweaver_core::{
    Airport, AirportDirectory, OptimisationSettings, RouteLeg, SelectedPlace, TransportMode,
    TransportPolicy,
};

/// Multiplier applied to the airport search radius for the widened
/// fallback query.
const FALLBACK_RADIUS_FACTOR: f64 = 3.0;

/// Travel between two consecutive stops on the route.
///
/// Walk and drive segments carry a single leg; fly segments carry a
/// drive/fly/drive triple around the chosen airports.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteSegment {
    /// Origin place id.
    pub from_id: String,
    /// Destination place id.
    pub to_id: String,
    /// Legs travelled, in order.
    pub legs: Vec<RouteLeg>,
    /// Total distance across the legs, in kilometres.
    pub distance_km: f64,
    /// Total travel time across the legs, in minutes.
    pub duration_minutes: f64,
}

/// A fully sequenced route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteOutcome {
    /// Place ids in visiting order; every selected place appears once.
    pub visit_order: Vec<String>,
    /// Segments connecting consecutive stops; one fewer than the stops.
    pub segments: Vec<RouteSegment>,
    /// Total distance over all segments, in kilometres.
    pub total_distance_km: f64,
    /// Degradations encountered while sequencing, e.g. fly legs that
    /// fell back to driving.
    pub warnings: Vec<String>,
}

/// Order the selected places into a route and decide leg transport.
///
/// # Errors
/// Returns [`InsufficientDataError::NoCandidates`] when no places were
/// selected; a route needs at least one stop.
#[expect(
    clippy::float_arithmetic,
    reason = "route accumulation sums leg distances and durations"
)]
pub fn sequence_route(
    selected: &[SelectedPlace],
    settings: &OptimisationSettings,
    airports: &dyn AirportDirectory,
) -> Result<RouteOutcome, InsufficientDataError> {
    let visit_order = visiting_order(selected)?;
    let locate = |id: &str| -> Option<Coord<f64>> {
        selected
            .iter()
            .find(|s| s.place.id == id)
            .map(|s| s.place.location)
    };

    let mut segments = Vec::new();
    let mut warnings = Vec::new();
    for pair in visit_order.windows(2) {
        let (Some(from_id), Some(to_id)) = (pair.first(), pair.get(1)) else {
            continue;
        };
        let (Some(origin), Some(target)) = (locate(from_id), locate(to_id)) else {
            continue;
        };
        let segment = build_segment(
            from_id,
            to_id,
            origin,
            target,
            settings,
            airports,
            &mut warnings,
        );
        segments.push(segment);
    }

    let total_distance_km = segments.iter().map(|s| s.distance_km).sum();
    Ok(RouteOutcome {
        visit_order,
        segments,
        total_distance_km,
        warnings,
    })
}

/// Greedy nearest-neighbour ordering.
///
/// The departure place (or the lexically smallest id when none is
/// marked) anchors the start; a marked destination is pinned last.
fn visiting_order(selected: &[SelectedPlace]) -> Result<Vec<String>, InsufficientDataError> {
    let mut ids: Vec<&SelectedPlace> = selected.iter().collect();
    ids.sort_by(|a, b| a.place.id.cmp(&b.place.id));
    if ids.is_empty() {
        return Err(InsufficientDataError::NoCandidates);
    }

    let start_index = ids
        .iter()
        .position(|s| s.place.role == tripweaver_core::PlaceRole::Departure)
        .unwrap_or(0);
    let start = ids.remove(start_index);
    let end = ids
        .iter()
        .position(|s| s.place.role == tripweaver_core::PlaceRole::Destination)
        .map(|index| ids.remove(index));

    let mut order = vec![start.place.id.clone()];
    let mut current = start.place.location;
    while !ids.is_empty() {
        let next_index = nearest_index(current, &ids);
        let next = ids.remove(next_index);
        current = next.place.location;
        order.push(next.place.id.clone());
    }
    if let Some(finish) = end {
        order.push(finish.place.id.clone());
    }
    Ok(order)
}

/// Index of the place nearest to `origin`; the caller's lexical
/// pre-sort makes ties deterministic.
fn nearest_index(origin: Coord<f64>, remaining: &[&SelectedPlace]) -> usize {
    let mut best: Option<(usize, f64)> = None;
    for (index, candidate) in remaining.iter().enumerate() {
        let distance = haversine_km(origin, candidate.place.location);
        let better = best.is_none_or(|(_, best_distance)| distance < best_distance);
        if better {
            best = Some((index, distance));
        }
    }
    best.map_or(0, |(index, _)| index)
}

#[expect(
    clippy::float_arithmetic,
    reason = "segment totals sum leg distances and durations"
)]
fn build_segment(
    from_id: &str,
    to_id: &str,
    origin: Coord<f64>,
    target: Coord<f64>,
    settings: &OptimisationSettings,
    airports: &dyn AirportDirectory,
    warnings: &mut Vec<String>,
) -> RouteSegment {
    let distance = haversine_km(origin, target);
    let legs = match choose_mode(distance, settings) {
        ModeDecision::Direct(mode) => {
            vec![direct_leg(from_id, to_id, mode, distance, &settings.transport)]
        }
        ModeDecision::DegradedDrive => {
            warnings.push(format!(
                "no preferred transport mode covers the {distance:.0} km leg from {from_id} to {to_id}; driving"
            ));
            let mut leg = direct_leg(
                from_id,
                to_id,
                TransportMode::Drive,
                distance,
                &settings.transport,
            );
            leg.annotation = Some("outside preferred transport modes".to_owned());
            vec![leg]
        }
        ModeDecision::Fly => {
            fly_legs(from_id, to_id, origin, target, settings, airports, warnings)
        }
    };
    let distance_km = legs.iter().map(|l| l.distance_km).sum();
    let duration_minutes = legs.iter().map(|l| l.duration_minutes).sum();
    RouteSegment {
        from_id: from_id.to_owned(),
        to_id: to_id.to_owned(),
        legs,
        distance_km,
        duration_minutes,
    }
}

enum ModeDecision {
    Direct(TransportMode),
    Fly,
    /// No preferred mode covers the distance; drive with an annotation.
    DegradedDrive,
}

fn choose_mode(distance_km: f64, settings: &OptimisationSettings) -> ModeDecision {
    let allowed = |mode: TransportMode| settings.preferred_transport_modes.contains(&mode);
    if allowed(TransportMode::Walk) && distance_km <= settings.transport.walk_max_km {
        ModeDecision::Direct(TransportMode::Walk)
    } else if allowed(TransportMode::Drive) && distance_km <= settings.transport.drive_max_km {
        ModeDecision::Direct(TransportMode::Drive)
    } else if allowed(TransportMode::Fly) {
        ModeDecision::Fly
    } else if allowed(TransportMode::Drive) {
        ModeDecision::Direct(TransportMode::Drive)
    } else {
        ModeDecision::DegradedDrive
    }
}

#[expect(
    clippy::float_arithmetic,
    reason = "durations derive from distance over speed"
)]
fn direct_leg(
    from_id: &str,
    to_id: &str,
    mode: TransportMode,
    distance_km: f64,
    policy: &TransportPolicy,
) -> RouteLeg {
    let speed = match mode {
        TransportMode::Walk => policy.walk_speed_kmh,
        TransportMode::Drive => policy.drive_speed_kmh,
        TransportMode::Fly => policy.fly_speed_kmh,
    };
    RouteLeg::new(from_id, to_id, mode, distance_km, minutes(distance_km, speed))
}

/// Build the drive/fly/drive triple for a long-haul segment.
///
/// Airport resolution tries the configured search radius first, then a
/// widened radius accepting any airport, and finally degrades the whole
/// segment to a single annotated drive leg.
#[expect(
    clippy::float_arithmetic,
    reason = "flight time adds fixed overhead to distance over speed"
)]
fn fly_legs(
    from_id: &str,
    to_id: &str,
    origin: Coord<f64>,
    target: Coord<f64>,
    settings: &OptimisationSettings,
    airports: &dyn AirportDirectory,
    warnings: &mut Vec<String>,
) -> Vec<RouteLeg> {
    let policy = &settings.transport;
    let departure = resolve_airport(origin, policy, airports, warnings);
    let arrival = resolve_airport(target, policy, airports, warnings);
    let (Some(departure), Some(arrival)) = (departure, arrival) else {
        let distance = haversine_km(origin, target);
        warnings.push(format!(
            "no usable airport for the leg from {from_id} to {to_id}; driving {distance:.0} km instead"
        ));
        let mut leg = direct_leg(from_id, to_id, TransportMode::Drive, distance, policy);
        leg.annotation = Some("no usable airport found".to_owned());
        return vec![leg];
    };

    if departure.id == arrival.id {
        let distance = haversine_km(origin, target);
        let mut leg = direct_leg(from_id, to_id, TransportMode::Drive, distance, policy);
        leg.annotation = Some(format!(
            "both ends resolve to {}; flying would not help",
            departure.id
        ));
        return vec![leg];
    }

    let to_airport = haversine_km(origin, departure.location);
    let flight = haversine_km(departure.location, arrival.location);
    let from_airport = haversine_km(arrival.location, target);
    let mut fly = RouteLeg::new(
        departure.id.clone(),
        arrival.id.clone(),
        TransportMode::Fly,
        flight,
        minutes(flight, policy.fly_speed_kmh) + policy.flight_overhead_minutes,
    );
    if departure.fallback || arrival.fallback {
        fly.annotation = Some("airport chosen outside the preferred search radius".to_owned());
    }
    vec![
        direct_leg(from_id, &departure.id, TransportMode::Drive, to_airport, policy),
        fly,
        direct_leg(&arrival.id, to_id, TransportMode::Drive, from_airport, policy),
    ]
}

/// An airport chosen for one end of a fly segment.
struct ResolvedAirport {
    id: String,
    location: Coord<f64>,
    /// True when the widened fallback query chose it.
    fallback: bool,
}

/// Pick the best airport near `origin`.
///
/// The primary query keeps airports meeting the capability threshold and
/// takes the highest scorer, breaking ties on id. The fallback widens
/// the radius and takes the nearest airport regardless of capability.
fn resolve_airport(
    origin: Coord<f64>,
    policy: &TransportPolicy,
    airports: &dyn AirportDirectory,
    warnings: &mut Vec<String>,
) -> Option<ResolvedAirport> {
    let radius = policy.airport_search_radius_km;
    match airports.airports_near(origin, radius) {
        Ok(found) => {
            if let Some(best) = best_capable(&found, origin, policy) {
                return Some(ResolvedAirport {
                    id: best.id.clone(),
                    location: best.location,
                    fallback: false,
                });
            }
        }
        Err(error) => {
            log::warn!("airport directory query failed: {error}");
            warnings.push(format!("airport directory query failed: {error}"));
            return None;
        }
    }

    let widened = radius * FALLBACK_RADIUS_FACTOR;
    match airports.airports_near(origin, widened) {
        Ok(found) => nearest_airport(&found, origin).map(|airport| {
            warnings.push(format!(
                "no capable airport within {radius:.0} km; using {} from a widened search",
                airport.id
            ));
            ResolvedAirport {
                id: airport.id.clone(),
                location: airport.location,
                fallback: true,
            }
        }),
        Err(error) => {
            log::warn!("widened airport directory query failed: {error}");
            warnings.push(format!("airport directory query failed: {error}"));
            None
        }
    }
}

fn best_capable<'a>(
    found: &'a [Airport],
    origin: Coord<f64>,
    policy: &TransportPolicy,
) -> Option<&'a Airport> {
    let radius = policy.airport_search_radius_km;
    let mut best: Option<(&Airport, f64)> = None;
    for airport in found {
        let score = airport
            .capability
            .score(haversine_km(origin, airport.location), radius);
        if score < policy.min_airport_capability {
            continue;
        }
        let better = match best {
            None => true,
            Some((current, current_score)) => {
                score > current_score || (score == current_score && airport.id < current.id)
            }
        };
        if better {
            best = Some((airport, score));
        }
    }
    best.map(|(airport, _)| airport)
}

fn nearest_airport<'a>(found: &'a [Airport], origin: Coord<f64>) -> Option<&'a Airport> {
    let mut best: Option<(&Airport, f64)> = None;
    for airport in found {
        let distance = haversine_km(origin, airport.location);
        let better = match best {
            None => true,
            Some((current, current_distance)) => {
                distance < current_distance
                    || (distance == current_distance && airport.id < current.id)
            }
        };
        if better {
            best = Some((airport, distance));
        }
    }
    best.map(|(airport, _)| airport)
}

#[expect(
    clippy::float_arithmetic,
    reason = "travel time is distance over speed"
)]
fn minutes(distance_km: f64, speed_kmh: f64) -> f64 {
    if speed_kmh <= 0.0 {
        0.0
    } else {
        distance_km / speed_kmh * 60.0
    }
}
