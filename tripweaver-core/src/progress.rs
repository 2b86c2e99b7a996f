//! Staged progress reporting.
//!
//! Progress updates are fire-and-forget: sinks must not block the
//! pipeline, and the orchestrator swallows (but logs) sink misbehaviour
//! by contract, so a slow or broken sink can never abort a run.

use serde::{Deserialize, Serialize};

/// Pipeline stage of an optimisation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Validating input and assembling working sets.
    Collecting,
    /// Standardising member preferences.
    Normalising,
    /// Clustering and fair selection.
    Selecting,
    /// Sequencing the route and splitting days.
    Routing,
    /// Run finished successfully.
    Complete,
    /// Run failed; terminal.
    Error,
}

impl Stage {
    /// Nominal completion percentage reported on entering the stage.
    #[must_use]
    pub const fn percent(self) -> u8 {
        match self {
            Self::Collecting => 5,
            Self::Normalising => 25,
            Self::Selecting => 50,
            Self::Routing => 80,
            Self::Complete => 100,
            Self::Error => 100,
        }
    }

    /// Stable lower-case label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Collecting => "collecting",
            Self::Normalising => "normalising",
            Self::Selecting => "selecting",
            Self::Routing => "routing",
            Self::Complete => "complete",
            Self::Error => "error",
        }
    }
}

/// One progress event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressUpdate {
    /// Stage being entered.
    pub stage: Stage,
    /// Completion percentage, 0–100.
    pub percent: u8,
    /// Human-readable status line.
    pub message: String,
}

impl ProgressUpdate {
    /// Build an update carrying the stage's nominal percentage.
    pub fn for_stage(stage: Stage, message: impl Into<String>) -> Self {
        Self {
            stage,
            percent: stage.percent(),
            message: message.into(),
        }
    }
}

/// Receives progress updates from the orchestrator.
///
/// Implementations must be cheap and non-blocking; no acknowledgement is
/// expected and none is awaited.
pub trait ProgressSink: Send + Sync {
    /// Accept one update.
    fn report(&self, update: &ProgressUpdate);
}

/// Sink that writes updates to the `log` facade at info level.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogProgressSink;

impl ProgressSink for LogProgressSink {
    fn report(&self, update: &ProgressUpdate) {
        log::info!(
            "[{}] {}% {}",
            update.stage.as_str(),
            update.percent,
            update.message
        );
    }
}

/// Sink that discards updates.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopProgressSink;

impl ProgressSink for NoopProgressSink {
    fn report(&self, _update: &ProgressUpdate) {}
}
