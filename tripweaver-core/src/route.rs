//! Route legs, transport modes, and selected places.

use serde::{Deserialize, Serialize};

use crate::Place;

/// How a leg between two stops is travelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportMode {
    /// On foot.
    Walk,
    /// Car, taxi, or ground transit.
    Drive,
    /// Commercial flight between airports.
    Fly,
}

impl TransportMode {
    /// Stable lower-case label for logs and payloads.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Walk => "walk",
            Self::Drive => "drive",
            Self::Fly => "fly",
        }
    }
}

/// One directed travel segment between two consecutive stops.
///
/// Long-haul legs are split by the sequencer into drive/fly/drive
/// sub-legs around the chosen airports; each sub-leg is its own
/// `RouteLeg`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RouteLeg {
    /// Identifier of the origin stop.
    pub from_id: String,
    /// Identifier of the destination stop.
    pub to_id: String,
    /// Transport mode decided for this leg.
    pub mode: TransportMode,
    /// Great-circle distance in kilometres.
    pub distance_km: f64,
    /// Estimated travel time in minutes.
    pub duration_minutes: f64,
    /// Warning annotation, e.g. when a fly leg degraded to drive because
    /// no usable airport was found.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotation: Option<String>,
}

impl RouteLeg {
    /// Construct an unannotated leg.
    pub fn new(
        from_id: impl Into<String>,
        to_id: impl Into<String>,
        mode: TransportMode,
        distance_km: f64,
        duration_minutes: f64,
    ) -> Self {
        Self {
            from_id: from_id.into(),
            to_id: to_id.into(),
            mode,
            distance_km,
            duration_minutes,
            annotation: None,
        }
    }
}

/// A member's share in a place's selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contribution {
    /// Contributing member.
    pub member_id: String,
    /// Normalised contribution weight; weights over a place sum to one.
    pub weight: f64,
    /// Whether the member flagged the place as a favourite.
    pub favourite: bool,
    /// How long the member asked to stay, in minutes.
    pub requested_minutes: u32,
}

/// A place chosen by the fair selector.
///
/// System-owned departure and destination places pass through selection
/// with `selection_round == 0`; competed places are numbered from one in
/// the order they were chosen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectedPlace {
    /// The chosen place.
    pub place: Place,
    /// Round in which the place won selection; zero for system-owned.
    pub selection_round: u32,
    /// Blended wish/fairness score at the winning round.
    pub selection_score: f64,
    /// Members whose wishes carried the place, with their weights.
    pub contributors: Vec<Contribution>,
}

impl SelectedPlace {
    /// Whether any contributor flagged this place as a favourite.
    #[must_use]
    pub fn has_favourite(&self) -> bool {
        self.contributors.iter().any(|c| c.favourite)
    }
}
