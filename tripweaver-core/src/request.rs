//! The optimisation request and its boundary validation.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::preference::RAW_SCORE_RANGE;
use crate::{Member, OptimisationSettings, Place, PlaceRole, Preference};

/// Everything needed to optimise one trip.
///
/// Validation covers shape only (ranges, references, duplicates); whether
/// the data is *sufficient* to optimise is the orchestrator's concern.
///
/// # Examples
/// ```
/// use tripweaver_core::{OptimisationRequest, OptimisationSettings};
///
/// let request = OptimisationRequest {
///     trip_id: "trip-1".into(),
///     places: Vec::new(),
///     preferences: Vec::new(),
///     members: Vec::new(),
///     settings: OptimisationSettings::default(),
/// };
/// assert!(request.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptimisationRequest {
    /// Trip being optimised.
    pub trip_id: String,
    /// Candidate places plus any fixed departure/destination.
    pub places: Vec<Place>,
    /// Raw member wishes.
    pub preferences: Vec<Preference>,
    /// Trip roster.
    pub members: Vec<Member>,
    /// Run settings.
    pub settings: OptimisationSettings,
}

impl OptimisationRequest {
    /// Reject malformed input before any stage runs.
    ///
    /// # Errors
    /// Returns the first [`ValidationError`] found: out-of-range ratings,
    /// invalid coordinates, zero-minute stays, dangling references,
    /// duplicate identifiers or roles, or bad settings.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.settings.validate()?;
        self.validate_places()?;
        self.validate_members()?;
        self.validate_preferences()
    }

    fn validate_places(&self) -> Result<(), ValidationError> {
        let mut seen = HashSet::new();
        let mut departures = 0_u32;
        let mut destinations = 0_u32;
        for place in &self.places {
            if !seen.insert(place.id.as_str()) {
                return Err(ValidationError::DuplicatePlace {
                    place_id: place.id.clone(),
                });
            }
            let (lon, lat) = (place.location.x, place.location.y);
            let lon_ok = lon.is_finite() && (-180.0..=180.0).contains(&lon);
            let lat_ok = lat.is_finite() && (-90.0..=90.0).contains(&lat);
            if !(lon_ok && lat_ok) {
                return Err(ValidationError::InvalidCoordinates {
                    place_id: place.id.clone(),
                    lat,
                    lon,
                });
            }
            match place.role {
                PlaceRole::Departure => departures += 1,
                PlaceRole::Destination => destinations += 1,
                PlaceRole::Candidate => {}
            }
        }
        if departures > 1 {
            return Err(ValidationError::DuplicateRole { role: "departure" });
        }
        if destinations > 1 {
            return Err(ValidationError::DuplicateRole {
                role: "destination",
            });
        }
        Ok(())
    }

    fn validate_members(&self) -> Result<(), ValidationError> {
        let mut seen = HashSet::new();
        for member in &self.members {
            if !seen.insert(member.id.as_str()) {
                return Err(ValidationError::DuplicateMember {
                    member_id: member.id.clone(),
                });
            }
        }
        Ok(())
    }

    fn validate_preferences(&self) -> Result<(), ValidationError> {
        let member_ids: HashSet<&str> = self.members.iter().map(|m| m.id.as_str()).collect();
        let place_ids: HashSet<&str> = self.places.iter().map(|p| p.id.as_str()).collect();
        for wish in &self.preferences {
            if !wish.raw_score.is_finite() || !RAW_SCORE_RANGE.contains(&wish.raw_score) {
                return Err(ValidationError::RatingOutOfRange {
                    member_id: wish.member_id.clone(),
                    place_id: wish.place_id.clone(),
                    raw_score: wish.raw_score,
                });
            }
            if wish.requested_minutes == 0 {
                return Err(ValidationError::ZeroRequestedMinutes {
                    member_id: wish.member_id.clone(),
                    place_id: wish.place_id.clone(),
                });
            }
            if !member_ids.contains(wish.member_id.as_str()) {
                return Err(ValidationError::UnknownMember {
                    member_id: wish.member_id.clone(),
                });
            }
            if !place_ids.contains(wish.place_id.as_str()) {
                return Err(ValidationError::UnknownPlace {
                    place_id: wish.place_id.clone(),
                });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::Coord;
    use rstest::{fixture, rstest};

    #[fixture]
    fn request() -> OptimisationRequest {
        OptimisationRequest {
            trip_id: "trip-1".into(),
            places: vec![Place::new(
                "p-1",
                "A",
                Coord { x: 139.7, y: 35.6 },
                "poi",
            )],
            preferences: vec![Preference::new("m-1", "p-1", 4.0, 60)],
            members: vec![Member::new("m-1", "Alice", "#e74c3c")],
            settings: OptimisationSettings::default(),
        }
    }

    #[rstest]
    fn accepts_well_formed_request(request: OptimisationRequest) {
        assert!(request.validate().is_ok());
    }

    #[rstest]
    #[case(0.5)]
    #[case(5.5)]
    #[case(-3.0)]
    fn rejects_out_of_range_rating(mut request: OptimisationRequest, #[case] raw: f64) {
        request.preferences = vec![Preference::new("m-1", "p-1", raw, 60)];
        let err = request.validate().expect_err("rating outside 1-5");
        assert_eq!(err.code(), "rating_out_of_range");
    }

    #[rstest]
    fn rejects_zero_minute_stay(mut request: OptimisationRequest) {
        request.preferences = vec![Preference::new("m-1", "p-1", 4.0, 0)];
        let err = request.validate().expect_err("zero minutes");
        assert_eq!(err.code(), "zero_requested_minutes");
    }

    #[rstest]
    fn rejects_unknown_member(mut request: OptimisationRequest) {
        request.preferences = vec![Preference::new("m-ghost", "p-1", 4.0, 60)];
        let err = request.validate().expect_err("dangling member");
        assert_eq!(err.code(), "unknown_member");
    }

    #[rstest]
    fn rejects_unknown_place(mut request: OptimisationRequest) {
        request.preferences = vec![Preference::new("m-1", "p-ghost", 4.0, 60)];
        let err = request.validate().expect_err("dangling place");
        assert_eq!(err.code(), "unknown_place");
    }

    #[rstest]
    #[case(Coord { x: 181.0, y: 0.0 })]
    #[case(Coord { x: 0.0, y: -91.0 })]
    #[case(Coord { x: f64::NAN, y: 0.0 })]
    fn rejects_invalid_coordinates(mut request: OptimisationRequest, #[case] coord: Coord<f64>) {
        request.places = vec![Place::new("p-1", "A", coord, "poi")];
        let err = request.validate().expect_err("bad coordinates");
        assert_eq!(err.code(), "invalid_coordinates");
    }

    #[rstest]
    fn rejects_two_departures(mut request: OptimisationRequest) {
        request.places = vec![
            Place::with_role(
                "p-a",
                "A",
                Coord { x: 0.0, y: 0.0 },
                "hotel",
                PlaceRole::Departure,
            ),
            Place::with_role(
                "p-b",
                "B",
                Coord { x: 1.0, y: 1.0 },
                "hotel",
                PlaceRole::Departure,
            ),
        ];
        request.preferences.clear();
        let err = request.validate().expect_err("two departures");
        assert_eq!(err.code(), "duplicate_role");
    }

    #[rstest]
    fn rejects_duplicate_place_ids(mut request: OptimisationRequest) {
        let duplicate = request.places.first().cloned().expect("fixture place");
        request.places.push(duplicate);
        let err = request.validate().expect_err("duplicate place");
        assert_eq!(err.code(), "duplicate_place");
    }
}
