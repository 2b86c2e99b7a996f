//! Facade crate for the Tripweaver trip-optimisation engine.
//!
//! Re-exports the domain types, the scoring and routing stages, and the
//! orchestration surface so applications depend on one crate.

#![forbid(unsafe_code)]

pub use tripweaver_core::{
    Airport, AirportCapability, AirportDirectory, AirportLookupError, DayCompactness, DaySchedule,
    EngineError, GenerationInfo, LogProgressSink, MealBreak, Member, NoopProgressSink,
    OptimisationRequest, OptimisationResult, OptimisationSettings, Place, PlaceRole, Preference,
    ProgressSink, ProgressUpdate, RouteLeg, ScheduleStop, SelectedPlace, Stage,
    StaticAirportDirectory, StopPriority, TransportMode, TripMetrics,
};

pub use tripweaver_pipeline::{
    MemoryResultCache, MemoryResultStore, Orchestrator, PersistedRun, ResultCache, ResultStore,
};

pub use tripweaver_routing::{sequence_route, split_into_days};

pub use tripweaver_scoring::{cluster_places, normalise_preferences, select_places};
