//! Engine error taxonomy.
//!
//! Every user-visible failure carries a machine-readable code via
//! [`EngineError::code`], a human-readable message via `Display`, and the
//! offending identifiers in variant fields. External-dependency failures
//! (airport lookup) are recovered locally by the sequencer and never
//! surface here; see [`crate::airport::AirportLookupError`].

use thiserror::Error;

/// Malformed input rejected at the request boundary.
///
/// No pipeline stage runs and no partial state is created when one of
/// these is returned.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// A raw rating fell outside the 1–5 scale. Ratings are rejected, not
    /// clamped.
    #[error("raw score {raw_score} from member {member_id} for place {place_id} is outside 1–5")]
    RatingOutOfRange {
        /// Member owning the rating.
        member_id: String,
        /// Rated place.
        place_id: String,
        /// Offending value.
        raw_score: f64,
    },
    /// A place carried coordinates outside WGS84 bounds.
    #[error("place {place_id} has invalid coordinates (lat {lat}, lon {lon})")]
    InvalidCoordinates {
        /// Offending place.
        place_id: String,
        /// Latitude as supplied.
        lat: f64,
        /// Longitude as supplied.
        lon: f64,
    },
    /// A preference requested a zero-minute stay.
    #[error("preference from member {member_id} for place {place_id} requests a zero-minute stay")]
    ZeroRequestedMinutes {
        /// Member owning the preference.
        member_id: String,
        /// Requested place.
        place_id: String,
    },
    /// The fairness weight must lie in `[0, 1]`.
    #[error("fairness weight {value} is outside the range 0–1")]
    FairnessWeightOutOfRange {
        /// Offending value.
        value: f64,
    },
    /// At least one place must be selectable.
    #[error("max_places must be at least one")]
    MaxPlacesZero,
    /// A daily or clustering budget was not positive.
    #[error("{field} must be positive")]
    NonPositiveBudget {
        /// Name of the offending settings field.
        field: &'static str,
    },
    /// A preference referenced a member missing from the trip roster.
    #[error("preference references unknown member {member_id}")]
    UnknownMember {
        /// Offending member id.
        member_id: String,
    },
    /// A preference referenced a place missing from the candidate list.
    #[error("preference references unknown place {place_id}")]
    UnknownPlace {
        /// Offending place id.
        place_id: String,
    },
    /// Two places shared an identifier.
    #[error("duplicate place id {place_id}")]
    DuplicatePlace {
        /// Duplicated id.
        place_id: String,
    },
    /// Two members shared an identifier.
    #[error("duplicate member id {member_id}")]
    DuplicateMember {
        /// Duplicated id.
        member_id: String,
    },
    /// More than one place claimed a fixed role.
    #[error("trip declares more than one {role} place")]
    DuplicateRole {
        /// Role claimed twice.
        role: &'static str,
    },
}

impl ValidationError {
    /// Machine-readable error code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::RatingOutOfRange { .. } => "rating_out_of_range",
            Self::InvalidCoordinates { .. } => "invalid_coordinates",
            Self::ZeroRequestedMinutes { .. } => "zero_requested_minutes",
            Self::FairnessWeightOutOfRange { .. } => "fairness_weight_out_of_range",
            Self::MaxPlacesZero => "max_places_zero",
            Self::NonPositiveBudget { .. } => "non_positive_budget",
            Self::UnknownMember { .. } => "unknown_member",
            Self::UnknownPlace { .. } => "unknown_place",
            Self::DuplicatePlace { .. } => "duplicate_place",
            Self::DuplicateMember { .. } => "duplicate_member",
            Self::DuplicateRole { .. } => "duplicate_role",
        }
    }
}

/// Nothing useful survived filtering; the pipeline halts at the stage
/// that noticed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum InsufficientDataError {
    /// The request carried no places at all.
    #[error("trip has no places")]
    NoPlaces,
    /// The request carried no preferences.
    #[error("trip has no preferences")]
    NoPreferences,
    /// No candidate survived to the selection stage.
    #[error("no candidate places survive filtering")]
    NoCandidates,
}

impl InsufficientDataError {
    /// Machine-readable error code.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::NoPlaces => "no_places",
            Self::NoPreferences => "no_preferences",
            Self::NoCandidates => "no_candidates",
        }
    }
}

/// Internal inconsistency detected by a self-check.
///
/// These indicate a bug, not bad input; the run is marked failed and no
/// cached result is written.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ComputationError {
    /// Two places in different clusters were within the clustering radius.
    #[error(
        "places {first_place_id} and {second_place_id} are {distance_km:.2} km apart, \
         within the {radius_km:.2} km radius, yet landed in different clusters"
    )]
    ClusterRadiusViolation {
        /// First offending place.
        first_place_id: String,
        /// Second offending place.
        second_place_id: String,
        /// Measured separation.
        distance_km: f64,
        /// Clustering radius in force.
        radius_km: f64,
    },
}

impl ComputationError {
    /// Machine-readable error code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::ClusterRadiusViolation { .. } => "cluster_radius_violation",
        }
    }
}

/// Top-level failure of an optimisation run.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    /// Input failed boundary validation.
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// The input was well-formed but too sparse to optimise.
    #[error(transparent)]
    InsufficientData(#[from] InsufficientDataError),
    /// A self-check caught an internal inconsistency.
    #[error(transparent)]
    Computation(#[from] ComputationError),
}

impl EngineError {
    /// Machine-readable error code of the underlying failure.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Validation(err) => err.code(),
            Self::InsufficientData(err) => err.code(),
            Self::Computation(err) => err.code(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_survive_wrapping() {
        let err = EngineError::from(InsufficientDataError::NoPlaces);
        assert_eq!(err.code(), "no_places");
    }

    #[test]
    fn validation_messages_name_the_offender() {
        let err = ValidationError::UnknownMember {
            member_id: "m-ghost".into(),
        };
        assert!(err.to_string().contains("m-ghost"));
    }
}
