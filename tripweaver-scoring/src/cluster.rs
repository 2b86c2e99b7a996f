//! Geographic clustering of candidate places.
//!
//! Greedy single-link agglomeration: every place starts as its own
//! cluster and the two closest clusters are merged while their
//! single-link distance (minimum pairwise place distance) stays within
//! the configured radius. Merge order is a stable function of distance
//! and then lexical place-id order, so identical input always produces
//! identical clusters.

use geo::Coord;
use serde::{Deserialize, Serialize};
use tripweaver_core::error::ComputationError;
use tripweaver_core::geo::{centroid, haversine_km};
use tripweaver_core::{Place, Preference, StandardisedPreference};

/// Clustering parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClusterParams {
    /// Maximum radius for places to be grouped together.
    pub max_radius_km: f64,
}

/// A set of geographically proximate places treated as one decision unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceCluster {
    /// Member place ids, lexically ordered.
    pub place_ids: Vec<String>,
    /// Arithmetic-mean centroid, recomputed on every merge.
    pub centroid: Coord<f64>,
    /// Sum over member places of all interested members' standardised
    /// scores.
    pub total_desirability: f64,
    /// Mean requested stay across all preferences touching the cluster.
    pub average_stay_minutes: f64,
}

/// Summary analysis of a clustering run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClusterAnalysis {
    /// Number of clusters produced.
    pub cluster_count: usize,
    /// Places that remained singleton clusters.
    pub isolated_place_ids: Vec<String>,
}

/// Clusters plus analysis for one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterOutcome {
    /// Clusters ordered by their lexically smallest place id.
    pub clusters: Vec<PlaceCluster>,
    /// Run analysis.
    pub analysis: ClusterAnalysis,
}

/// Group places into spatial clusters within `params.max_radius_km`.
///
/// Every place belongs to exactly one cluster. Desirability aggregates
/// the standardised scores of all interested members; stay time averages
/// the requested durations of every preference touching the cluster.
///
/// # Examples
/// ```
/// use geo::Coord;
/// use tripweaver_core::Place;
/// use tripweaver_scoring::{ClusterParams, cluster_places};
///
/// let places = vec![
///     Place::new("p-a", "A", Coord { x: 139.7454, y: 35.6586 }, "poi"),
///     Place::new("p-b", "B", Coord { x: 139.7967, y: 35.7148 }, "poi"),
/// ];
/// let outcome = cluster_places(&places, &[], &[], &ClusterParams { max_radius_km: 10.0 });
/// assert_eq!(outcome.analysis.cluster_count, 1);
/// ```
#[must_use]
pub fn cluster_places(
    places: &[Place],
    standardised: &[StandardisedPreference],
    preferences: &[Preference],
    params: &ClusterParams,
) -> ClusterOutcome {
    let mut clusters = seed_clusters(places);
    loop {
        let Some((first, second)) = closest_mergeable_pair(&clusters, params.max_radius_km) else {
            break;
        };
        merge(&mut clusters, first, second);
    }
    clusters.sort_by(|a, b| a.key().cmp(b.key()));

    let built: Vec<PlaceCluster> = clusters
        .iter()
        .map(|c| c.build(standardised, preferences))
        .collect();
    let isolated_place_ids = built
        .iter()
        .filter(|c| c.place_ids.len() == 1)
        .flat_map(|c| c.place_ids.iter().cloned())
        .collect();
    ClusterOutcome {
        analysis: ClusterAnalysis {
            cluster_count: built.len(),
            isolated_place_ids,
        },
        clusters: built,
    }
}

/// Self-check: no two places in different clusters may be within the
/// clustering radius of each other.
///
/// # Errors
/// Returns [`ComputationError::ClusterRadiusViolation`] naming the first
/// offending pair. A violation indicates a clustering bug, not bad
/// input.
pub fn verify_radius_consistency(
    outcome: &ClusterOutcome,
    places: &[Place],
    max_radius_km: f64,
) -> Result<(), ComputationError> {
    let locate = |id: &str| -> Option<Coord<f64>> {
        places.iter().find(|p| p.id == id).map(|p| p.location)
    };
    for (index, cluster) in outcome.clusters.iter().enumerate() {
        for other in outcome.clusters.iter().skip(index + 1) {
            for first_id in &cluster.place_ids {
                for second_id in &other.place_ids {
                    let (Some(a), Some(b)) = (locate(first_id), locate(second_id)) else {
                        continue;
                    };
                    let distance_km = haversine_km(a, b);
                    if distance_km <= max_radius_km {
                        return Err(ComputationError::ClusterRadiusViolation {
                            first_place_id: first_id.clone(),
                            second_place_id: second_id.clone(),
                            distance_km,
                            radius_km: max_radius_km,
                        });
                    }
                }
            }
        }
    }
    Ok(())
}

/// Working cluster during agglomeration.
#[derive(Debug, Clone)]
struct WorkingCluster {
    /// Member places, lexically ordered by id.
    places: Vec<(String, Coord<f64>)>,
    centroid: Coord<f64>,
}

impl WorkingCluster {
    /// Lexically smallest member id; stable sort key and tie-break.
    fn key(&self) -> &str {
        self.places
            .first()
            .map(|(id, _)| id.as_str())
            .unwrap_or_default()
    }

    /// Minimum pairwise distance to another cluster.
    fn link_distance_km(&self, other: &Self) -> f64 {
        let mut best = f64::INFINITY;
        for (_, a) in &self.places {
            for (_, b) in &other.places {
                best = best.min(haversine_km(*a, *b));
            }
        }
        best
    }

    #[expect(
        clippy::float_arithmetic,
        clippy::cast_precision_loss,
        reason = "desirability and stay aggregates are floating-point means"
    )]
    fn build(
        &self,
        standardised: &[StandardisedPreference],
        preferences: &[Preference],
    ) -> PlaceCluster {
        let place_ids: Vec<String> = self.places.iter().map(|(id, _)| id.clone()).collect();
        let total_desirability = standardised
            .iter()
            .filter(|s| place_ids.iter().any(|id| *id == s.place_id))
            .map(|s| s.score)
            .sum();
        let stays: Vec<f64> = preferences
            .iter()
            .filter(|p| place_ids.iter().any(|id| *id == p.place_id))
            .map(|p| f64::from(p.requested_minutes))
            .collect();
        let average_stay_minutes = if stays.is_empty() {
            0.0
        } else {
            stays.iter().sum::<f64>() / stays.len() as f64
        };
        PlaceCluster {
            place_ids,
            centroid: self.centroid,
            total_desirability,
            average_stay_minutes,
        }
    }
}

fn seed_clusters(places: &[Place]) -> Vec<WorkingCluster> {
    let mut clusters: Vec<WorkingCluster> = places
        .iter()
        .map(|place| WorkingCluster {
            places: vec![(place.id.clone(), place.location)],
            centroid: place.location,
        })
        .collect();
    clusters.sort_by(|a, b| a.key().cmp(b.key()));
    clusters
}

/// Find the closest pair of clusters whose single-link distance is
/// within the radius; ties break on the pair's lexical keys.
fn closest_mergeable_pair(clusters: &[WorkingCluster], max_radius_km: f64) -> Option<(usize, usize)> {
    let mut best: Option<(f64, usize, usize)> = None;
    for (i, cluster) in clusters.iter().enumerate() {
        for (offset, other) in clusters.iter().skip(i + 1).enumerate() {
            let j = i + 1 + offset;
            let distance = cluster.link_distance_km(other);
            if distance > max_radius_km {
                continue;
            }
            let candidate = (distance, i, j);
            let better = match best {
                None => true,
                Some((best_distance, best_i, best_j)) => {
                    distance < best_distance
                        || (distance == best_distance
                            && pair_keys(clusters, i, j) < pair_keys(clusters, best_i, best_j))
                }
            };
            if better {
                best = Some(candidate);
            }
        }
    }
    best.map(|(_, i, j)| (i, j))
}

fn pair_keys(clusters: &[WorkingCluster], i: usize, j: usize) -> (String, String) {
    let first = clusters.get(i).map(WorkingCluster::key).unwrap_or_default();
    let second = clusters.get(j).map(WorkingCluster::key).unwrap_or_default();
    (first.to_owned(), second.to_owned())
}

fn merge(clusters: &mut Vec<WorkingCluster>, first: usize, second: usize) {
    // Remove the later index first so the earlier one stays valid.
    let absorbed = clusters.remove(second.max(first));
    let Some(target) = clusters.get_mut(second.min(first)) else {
        return;
    };
    target.places.extend(absorbed.places);
    target.places.sort_by(|(a, _), (b, _)| a.cmp(b));
    let coords: Vec<Coord<f64>> = target.places.iter().map(|(_, c)| *c).collect();
    if let Some(mid) = centroid(&coords) {
        target.centroid = mid;
    }
}
