//! Property-based tests for the geographic clusterer.
//!
//! # Invariants tested
//!
//! - **Partition:** every input place lands in exactly one cluster.
//! - **Radius consistency:** no two places in a cluster sit further
//!   apart than the configured radius.
//! - **Determinism:** clustering the same input twice yields identical
//!   output.

use std::collections::HashSet;

use geo::Coord;
use proptest::prelude::*;
use tripweaver_core::Place;
use tripweaver_scoring::{ClusterParams, cluster_places, verify_radius_consistency};

/// Strategy producing up to a dozen places scattered across greater Tokyo.
fn places_strategy() -> impl Strategy<Value = Vec<Place>> {
    prop::collection::vec((139.0_f64..140.0, 35.0_f64..36.0), 1..12).prop_map(|coords| {
        coords
            .into_iter()
            .enumerate()
            .map(|(index, (x, y))| {
                Place::new(
                    format!("p-{index:03}"),
                    format!("Place {index}"),
                    Coord { x, y },
                    "poi",
                )
            })
            .collect()
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Property: clustering partitions the input.
    #[test]
    fn every_place_appears_exactly_once(
        places in places_strategy(),
        radius in 1.0_f64..50.0,
    ) {
        let outcome = cluster_places(&places, &[], &[], &ClusterParams { max_radius_km: radius });

        let clustered: Vec<&String> = outcome
            .clusters
            .iter()
            .flat_map(|c| c.place_ids.iter())
            .collect();
        let unique: HashSet<&String> = clustered.iter().copied().collect();
        prop_assert_eq!(clustered.len(), places.len());
        prop_assert_eq!(unique.len(), places.len());
    }

    /// Property: no cluster contains a pair further apart than the radius.
    #[test]
    fn no_cluster_pair_exceeds_the_radius(
        places in places_strategy(),
        radius in 1.0_f64..50.0,
    ) {
        let params = ClusterParams { max_radius_km: radius };
        let outcome = cluster_places(&places, &[], &[], &params);
        prop_assert!(verify_radius_consistency(&outcome, &places, radius).is_ok());
    }

    /// Property: clustering is deterministic.
    #[test]
    fn clustering_is_deterministic(
        places in places_strategy(),
        radius in 1.0_f64..50.0,
    ) {
        let params = ClusterParams { max_radius_km: radius };
        let first = cluster_places(&places, &[], &[], &params);
        let second = cluster_places(&places, &[], &[], &params);
        prop_assert_eq!(first, second);
    }
}
