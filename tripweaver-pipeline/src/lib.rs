//! Run orchestration for the Tripweaver engine.
//!
//! The [`Orchestrator`] drives one optimisation request through the
//! scoring and routing stages, reporting progress along the way. Results
//! are cached by a content hash of the request and persisted to a
//! durable store; failed runs write nothing.

#![forbid(unsafe_code)]

pub mod cache;
pub mod hash;
pub mod orchestrator;
pub mod store;

pub use cache::{CacheError, MemoryResultCache, ResultCache};
pub use hash::{ContentHash, content_hash};
pub use orchestrator::Orchestrator;
pub use store::{MemoryResultStore, PersistedRun, ResultStore, StoreError};
