//! Core domain types for the Tripweaver optimisation engine.
//!
//! These models provide basic validation to keep downstream components
//! honest. Validation happens at the request boundary; the engine stages
//! assume inputs that have already passed [`OptimisationRequest::validate`].

#![forbid(unsafe_code)]

pub mod airport;
pub mod error;
pub mod geo;
pub mod member;
pub mod place;
pub mod preference;
pub mod progress;
pub mod request;
pub mod result;
pub mod route;
pub mod schedule;
pub mod settings;

pub use airport::{
    Airport, AirportCapability, AirportDirectory, AirportLookupError, StaticAirportDirectory,
};
pub use error::{ComputationError, EngineError, InsufficientDataError, ValidationError};
pub use member::Member;
pub use place::{Place, PlaceRole};
pub use preference::{FallbackReason, Preference, ScoreSource, StandardisedPreference};
pub use progress::{LogProgressSink, NoopProgressSink, ProgressSink, ProgressUpdate, Stage};
pub use request::OptimisationRequest;
pub use result::{ALGORITHM_VERSION, GenerationInfo, OptimisationResult, TripMetrics};
pub use route::{Contribution, RouteLeg, SelectedPlace, TransportMode};
pub use schedule::{DayCompactness, DaySchedule, MealBreak, ScheduleStop, StopPriority};
pub use settings::{
    BufferPolicy, EnergyProfile, MealPolicy, OptimisationSettings, StayBounds, TransportPolicy,
};
