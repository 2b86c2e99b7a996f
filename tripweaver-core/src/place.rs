//! Candidate places and their fixed roles.

use geo::Coord;
use serde::{Deserialize, Serialize};

/// Fixed role a place may hold in the itinerary.
///
/// Departure and destination places are system-owned: they are always part
/// of the route and never compete for selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaceRole {
    /// Fixed starting point of the trip.
    Departure,
    /// Fixed final point of the trip.
    Destination,
    /// Ordinary candidate competing for selection.
    #[default]
    Candidate,
}

/// A location wished for by one or more members.
///
/// Coordinates are WGS84 with `x = longitude` and `y = latitude`.
///
/// # Examples
/// ```
/// use geo::Coord;
/// use tripweaver_core::{Place, PlaceRole};
///
/// let place = Place::new(
///     "p-tower",
///     "Tokyo Tower",
///     Coord { x: 139.7454, y: 35.6586 },
///     "landmark",
/// );
/// assert_eq!(place.role, PlaceRole::Candidate);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    /// Unique place identifier.
    pub id: String,
    /// Display name resolved by the places provider.
    pub name: String,
    /// Geospatial position.
    pub location: Coord<f64>,
    /// Free-form category label, e.g. `museum` or `restaurant`.
    pub category: String,
    /// Fixed role, defaulting to an ordinary candidate.
    #[serde(default)]
    pub role: PlaceRole,
}

impl Place {
    /// Construct an ordinary candidate place.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        location: Coord<f64>,
        category: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            location,
            category: category.into(),
            role: PlaceRole::Candidate,
        }
    }

    /// Construct a place carrying a fixed role.
    pub fn with_role(
        id: impl Into<String>,
        name: impl Into<String>,
        location: Coord<f64>,
        category: impl Into<String>,
        role: PlaceRole,
    ) -> Self {
        Self {
            role,
            ..Self::new(id, name, location, category)
        }
    }

    /// Whether the place is system-owned rather than a candidate.
    #[must_use]
    pub fn is_system_owned(&self) -> bool {
        self.role != PlaceRole::Candidate
    }
}
