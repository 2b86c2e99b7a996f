//! Route sequencing and daily scheduling for the Tripweaver engine.
//!
//! The sequencer orders selected places into a single visiting route and
//! decides how each leg is travelled, splitting long hauls into
//! drive/fly/drive sub-legs around airports. The splitter then cuts the
//! route into per-day schedules that respect daily distance and time
//! ceilings, allocating stay time, buffers, and meal breaks.

#![forbid(unsafe_code)]

pub mod sequencer;
pub mod splitter;

pub use sequencer::{RouteOutcome, RouteSegment, sequence_route};
pub use splitter::{ScheduleOutcome, split_into_days};
