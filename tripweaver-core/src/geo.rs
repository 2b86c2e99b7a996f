//! Great-circle distance helpers.
//!
//! All spherical math is delegated to the `geo` crate; these wrappers only
//! convert to kilometres and aggregate coordinates.

use geo::{Coord, Distance, Haversine, Point};

const METRES_PER_KILOMETRE: f64 = 1000.0;

/// Haversine distance between two coordinates, in kilometres.
///
/// # Examples
/// ```
/// use geo::Coord;
/// use tripweaver_core::geo::haversine_km;
///
/// let tower = Coord { x: 139.7454, y: 35.6586 };
/// let sensoji = Coord { x: 139.7967, y: 35.7148 };
/// let km = haversine_km(tower, sensoji);
/// assert!((8.0..8.5).contains(&km));
/// ```
#[must_use]
#[expect(
    clippy::float_arithmetic,
    reason = "unit conversion from metres to kilometres"
)]
pub fn haversine_km(a: Coord<f64>, b: Coord<f64>) -> f64 {
    Haversine.distance(Point::from(a), Point::from(b)) / METRES_PER_KILOMETRE
}

/// Arithmetic-mean centroid of a coordinate set.
///
/// Returns `None` for an empty slice. Adequate for cluster-sized extents;
/// no antimeridian handling is attempted.
///
/// # Examples
/// ```
/// use geo::Coord;
/// use tripweaver_core::geo::centroid;
///
/// let mid = centroid(&[Coord { x: 0.0, y: 0.0 }, Coord { x: 2.0, y: 4.0 }]);
/// assert_eq!(mid, Some(Coord { x: 1.0, y: 2.0 }));
/// ```
#[must_use]
#[expect(
    clippy::float_arithmetic,
    clippy::cast_precision_loss,
    reason = "centroid is an arithmetic mean over a small coordinate set"
)]
pub fn centroid(coords: &[Coord<f64>]) -> Option<Coord<f64>> {
    if coords.is_empty() {
        return None;
    }
    let count = coords.len() as f64;
    let sum = coords.iter().fold(Coord { x: 0.0, y: 0.0 }, |acc, c| Coord {
        x: acc.x + c.x,
        y: acc.y + c.y,
    });
    Some(Coord {
        x: sum.x / count,
        y: sum.y / count,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const TOKYO_TOWER: Coord<f64> = Coord {
        x: 139.7454,
        y: 35.6586,
    };
    const SENSOJI: Coord<f64> = Coord {
        x: 139.7967,
        y: 35.7148,
    };
    const MOUNT_FUJI: Coord<f64> = Coord {
        x: 138.7274,
        y: 35.3606,
    };

    #[rstest]
    #[case(TOKYO_TOWER, SENSOJI, 8.0, 8.5)]
    #[case(TOKYO_TOWER, MOUNT_FUJI, 95.0, 105.0)]
    fn known_distances_fall_in_expected_ranges(
        #[case] from: Coord<f64>,
        #[case] to: Coord<f64>,
        #[case] min_km: f64,
        #[case] max_km: f64,
    ) {
        let km = haversine_km(from, to);
        assert!(
            (min_km..=max_km).contains(&km),
            "expected {min_km}..={max_km} km, got {km}"
        );
    }

    #[rstest]
    fn distance_is_symmetric() {
        let forward = haversine_km(TOKYO_TOWER, SENSOJI);
        let backward = haversine_km(SENSOJI, TOKYO_TOWER);
        assert!((forward - backward).abs() < 1e-9);
    }

    #[rstest]
    fn centroid_of_empty_slice_is_none() {
        assert_eq!(centroid(&[]), None);
    }

    #[rstest]
    fn centroid_of_single_point_is_the_point() {
        assert_eq!(centroid(&[TOKYO_TOWER]), Some(TOKYO_TOWER));
    }
}
