//! Airport lookup seam for long-haul legs.
//!
//! The engine consumes a directory of airports; resolving real airport
//! data is an external collaborator's job. A slice-backed
//! [`StaticAirportDirectory`] is provided for the CLI and tests.

use geo::Coord;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::geo::haversine_km;

const COMMERCIAL_WEIGHT: f64 = 0.35;
const INTERNATIONAL_WEIGHT: f64 = 0.25;
const PROXIMITY_WEIGHT: f64 = 0.2;
const INFRASTRUCTURE_WEIGHT: f64 = 0.2;
const RUNWAYS_FOR_FULL_MARKS: f64 = 4.0;

/// Service characteristics of an airport.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AirportCapability {
    /// Scheduled commercial service operates here.
    pub commercial_service: bool,
    /// International connections are available.
    pub international: bool,
    /// Number of runways, a proxy for infrastructure size.
    pub runways: u8,
}

impl AirportCapability {
    /// Weighted composite capability score in `[0, 1]`.
    ///
    /// Blends commercial service, international service, proximity to the
    /// query origin, and infrastructure size. `distance_km` beyond
    /// `radius_km` contributes zero proximity.
    #[must_use]
    #[expect(
        clippy::float_arithmetic,
        reason = "capability score is a weighted composite"
    )]
    pub fn score(self, distance_km: f64, radius_km: f64) -> f64 {
        let proximity = if radius_km > 0.0 {
            (1.0 - distance_km / radius_km).clamp(0.0, 1.0)
        } else {
            0.0
        };
        let infrastructure = (f64::from(self.runways) / RUNWAYS_FOR_FULL_MARKS).clamp(0.0, 1.0);
        f64::from(u8::from(self.commercial_service)) * COMMERCIAL_WEIGHT
            + f64::from(u8::from(self.international)) * INTERNATIONAL_WEIGHT
            + proximity * PROXIMITY_WEIGHT
            + infrastructure * INFRASTRUCTURE_WEIGHT
    }
}

/// An airport candidate returned by the directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Airport {
    /// IATA-style identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Geospatial position, `x = longitude`, `y = latitude`.
    pub location: Coord<f64>,
    /// Service characteristics.
    pub capability: AirportCapability,
}

/// The directory could not answer a query at all.
///
/// This is recoverable: the sequencer falls back to its next strategy and
/// ultimately to a drive-only leg with a warning annotation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AirportLookupError {
    /// The backing service was unreachable or refused the query.
    #[error("airport directory unavailable: {reason}")]
    Unavailable {
        /// Human-readable cause from the backing service.
        reason: String,
    },
}

/// Query airports around a coordinate.
///
/// Implementations must return an empty vector, not an error, when no
/// airport lies within `radius_km`; errors are reserved for the service
/// itself being unavailable.
///
/// # Examples
/// ```
/// use geo::Coord;
/// use tripweaver_core::{Airport, AirportCapability, AirportDirectory, StaticAirportDirectory};
///
/// let haneda = Airport {
///     id: "HND".into(),
///     name: "Haneda".into(),
///     location: Coord { x: 139.7798, y: 35.5494 },
///     capability: AirportCapability {
///         commercial_service: true,
///         international: true,
///         runways: 4,
///     },
/// };
/// let directory = StaticAirportDirectory::new(vec![haneda]);
/// let origin = Coord { x: 139.7454, y: 35.6586 };
/// let found = directory.airports_near(origin, 50.0).expect("static lookup");
/// assert_eq!(found.len(), 1);
/// ```
pub trait AirportDirectory: Send + Sync {
    /// Return airports within `radius_km` of `origin`.
    fn airports_near(
        &self,
        origin: Coord<f64>,
        radius_km: f64,
    ) -> Result<Vec<Airport>, AirportLookupError>;
}

/// In-memory directory backed by a fixed airport list.
#[derive(Debug, Clone, Default)]
pub struct StaticAirportDirectory {
    airports: Vec<Airport>,
}

impl StaticAirportDirectory {
    /// Build a directory over a fixed list.
    #[must_use]
    pub fn new(airports: Vec<Airport>) -> Self {
        Self { airports }
    }

    /// All airports known to the directory, regardless of distance.
    #[must_use]
    pub fn all(&self) -> &[Airport] {
        &self.airports
    }
}

impl AirportDirectory for StaticAirportDirectory {
    fn airports_near(
        &self,
        origin: Coord<f64>,
        radius_km: f64,
    ) -> Result<Vec<Airport>, AirportLookupError> {
        Ok(self
            .airports
            .iter()
            .filter(|airport| haversine_km(origin, airport.location) <= radius_km)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn major_airport() -> Airport {
        Airport {
            id: "HND".into(),
            name: "Haneda".into(),
            location: Coord {
                x: 139.7798,
                y: 35.5494,
            },
            capability: AirportCapability {
                commercial_service: true,
                international: true,
                runways: 4,
            },
        }
    }

    #[rstest]
    fn full_service_airport_scores_high_nearby(major_airport: Airport) {
        let score = major_airport.capability.score(10.0, 150.0);
        assert!(score > 0.9, "expected near-maximal score, got {score}");
    }

    #[rstest]
    fn grass_strip_scores_low() {
        let capability = AirportCapability {
            commercial_service: false,
            international: false,
            runways: 1,
        };
        assert!(capability.score(10.0, 150.0) < 0.3);
    }

    #[rstest]
    fn lookup_respects_radius(major_airport: Airport) {
        let directory = StaticAirportDirectory::new(vec![major_airport]);
        let tokyo_tower = Coord {
            x: 139.7454,
            y: 35.6586,
        };
        assert_eq!(
            directory
                .airports_near(tokyo_tower, 50.0)
                .expect("static lookup")
                .len(),
            1
        );
        assert!(
            directory
                .airports_near(tokyo_tower, 5.0)
                .expect("static lookup")
                .is_empty()
        );
    }
}
