//! Preference scoring for the Tripweaver engine.
//!
//! Three stages live here, in pipeline order: the preference normaliser
//! removes personal rating-scale bias, the geographic clusterer groups
//! nearby places, and the fair selector picks a bounded subset balancing
//! desirability against member representation.

#![forbid(unsafe_code)]

pub mod cluster;
pub mod normaliser;
pub mod selector;

pub use cluster::{
    ClusterAnalysis, ClusterOutcome, ClusterParams, PlaceCluster, cluster_places,
    verify_radius_consistency,
};
pub use normaliser::{
    MemberStatistics, NormalisationOutcome, NormalisationQuality, NormalisationWarning,
    NormaliserConfig, normalise_preferences,
};
pub use selector::{MemberFairness, SelectionOutcome, SelectionParams, select_places};
