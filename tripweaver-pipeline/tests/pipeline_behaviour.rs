#![expect(
    clippy::expect_used,
    reason = "tests should fail fast when setup breaks"
)]

//! Behavioural coverage for the orchestrator.
//!
//! Runs the full pipeline over an in-memory cache and store, checking
//! determinism, caching, progress reporting, and the no-write guarantee
//! on failed runs.

use std::sync::Mutex;

use geo::Coord;
use rstest::{fixture, rstest};
use tripweaver_core::{
    Member, OptimisationRequest, OptimisationSettings, Place, Preference, ProgressSink,
    ProgressUpdate, Stage, StaticAirportDirectory,
};
use tripweaver_pipeline::{MemoryResultCache, MemoryResultStore, Orchestrator};

/// Sink that records every update it receives.
#[derive(Debug, Default)]
struct RecordingSink {
    updates: Mutex<Vec<ProgressUpdate>>,
}

impl RecordingSink {
    fn stages(&self) -> Vec<Stage> {
        self.updates
            .lock()
            .expect("sink mutex")
            .iter()
            .map(|u| u.stage)
            .collect()
    }
}

impl ProgressSink for RecordingSink {
    fn report(&self, update: &ProgressUpdate) {
        self.updates.lock().expect("sink mutex").push(update.clone());
    }
}

#[fixture]
fn request() -> OptimisationRequest {
    OptimisationRequest {
        trip_id: "trip-tokyo".into(),
        places: vec![
            Place::new(
                "p-market",
                "Tsukiji Outer Market",
                Coord {
                    x: 139.770_6,
                    y: 35.665_4,
                },
                "food",
            ),
            Place::new(
                "p-museum",
                "Tokyo National Museum",
                Coord {
                    x: 139.776_5,
                    y: 35.718_8,
                },
                "museum",
            ),
            Place::new(
                "p-temple",
                "Senso-ji",
                Coord {
                    x: 139.796_7,
                    y: 35.714_8,
                },
                "temple",
            ),
            Place::new(
                "p-tower",
                "Tokyo Tower",
                Coord {
                    x: 139.745_4,
                    y: 35.658_6,
                },
                "viewpoint",
            ),
        ],
        preferences: vec![
            Preference::new("alice", "p-museum", 5.0, 120),
            Preference::new("alice", "p-tower", 4.0, 60),
            Preference::new("alice", "p-market", 3.0, 90),
            Preference::new("bob", "p-temple", 3.2, 60),
            Preference::new("bob", "p-museum", 3.0, 120),
            Preference::new("bob", "p-market", 2.8, 90),
        ],
        members: vec![
            Member::new("alice", "Alice", "#d94f4f"),
            Member::new("bob", "Bob", "#4f7ad9"),
        ],
        settings: OptimisationSettings::default(),
    }
}

struct Harness {
    cache: MemoryResultCache,
    store: MemoryResultStore,
    sink: RecordingSink,
    airports: StaticAirportDirectory,
}

impl Harness {
    fn new() -> Self {
        Self {
            cache: MemoryResultCache::new(),
            store: MemoryResultStore::new(),
            sink: RecordingSink::default(),
            airports: StaticAirportDirectory::default(),
        }
    }

    fn orchestrator(&self) -> Orchestrator<'_> {
        Orchestrator::new(&self.cache, &self.store, &self.sink, &self.airports)
    }
}

#[rstest]
fn identical_requests_produce_identical_itineraries(request: OptimisationRequest) {
    let first_harness = Harness::new();
    let second_harness = Harness::new();
    let first = first_harness
        .orchestrator()
        .optimise(&request)
        .expect("first run");
    let second = second_harness
        .orchestrator()
        .optimise(&request)
        .expect("second run");
    assert_eq!(
        first.deterministic_payload().expect("payload"),
        second.deterministic_payload().expect("payload"),
    );
}

#[rstest]
fn second_run_is_served_from_cache(request: OptimisationRequest) {
    let harness = Harness::new();
    let orchestrator = harness.orchestrator();
    orchestrator.optimise(&request).expect("first run");
    orchestrator.optimise(&request).expect("cached run");
    // Only the first run computed anything, so only one run persisted.
    assert_eq!(harness.store.all().expect("store").len(), 1);
}

#[rstest]
fn stages_advance_in_pipeline_order(request: OptimisationRequest) {
    let harness = Harness::new();
    harness.orchestrator().optimise(&request).expect("run succeeds");
    assert_eq!(
        harness.sink.stages(),
        vec![
            Stage::Collecting,
            Stage::Normalising,
            Stage::Selecting,
            Stage::Routing,
            Stage::Complete,
        ]
    );
}

#[rstest]
fn invalid_ratings_fail_before_any_stage_runs(mut request: OptimisationRequest) {
    request.preferences.push(Preference::new("alice", "p-temple", 7.0, 60));
    let harness = Harness::new();
    let err = harness
        .orchestrator()
        .optimise(&request)
        .expect_err("out-of-range rating");
    assert_eq!(err.code(), "rating_out_of_range");
    assert!(harness.store.all().expect("store").is_empty());
    assert_eq!(
        harness.sink.stages().last(),
        Some(&Stage::Error),
        "failure must surface through the error stage"
    );
}

#[rstest]
fn missing_preferences_fail_at_the_normalising_stage(mut request: OptimisationRequest) {
    request.preferences.clear();
    let harness = Harness::new();
    let err = harness
        .orchestrator()
        .optimise(&request)
        .expect_err("nothing to normalise");
    assert_eq!(err.code(), "no_preferences");
    let stages = harness.sink.stages();
    assert!(stages.contains(&Stage::Normalising));
    assert_eq!(stages.last(), Some(&Stage::Error));
    assert!(harness.store.all().expect("store").is_empty());
}

#[rstest]
fn results_carry_generation_metadata(request: OptimisationRequest) {
    let harness = Harness::new();
    let result = harness.orchestrator().optimise(&request).expect("run succeeds");
    assert_eq!(result.generation.algorithm_version, "tripweaver/1");
    assert!(result.metrics.fairness_score > 0.0);
    assert!(result.metrics.efficiency_score > 0.0 && result.metrics.efficiency_score <= 1.0);
    assert!(!result.selected_places.is_empty());
    assert!(!result.day_schedules.is_empty());
}
