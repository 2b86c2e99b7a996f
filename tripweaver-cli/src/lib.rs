//! Command-line interface for the Tripweaver engine.
//!
//! Reads an optimisation request from a JSON file, runs the full
//! pipeline in-process, and writes the resulting itinerary to stdout.
#![forbid(unsafe_code)]

use camino::Utf8PathBuf;
use clap::{Parser, Subcommand};
use thiserror::Error;
use tripweaver_core::EngineError;

mod optimise;

pub use optimise::OptimiseArgs;

/// Run the Tripweaver CLI with the current process arguments.
///
/// # Errors
/// Returns [`CliError`] for argument, file, or engine failures.
pub fn run() -> Result<(), CliError> {
    let cli = Cli::try_parse().map_err(CliError::ArgumentParsing)?;
    match cli.command {
        Command::Optimise(args) => {
            let rendered = optimise::run_optimise(&args)?;
            println!("{rendered}");
        }
    }
    Ok(())
}

#[derive(Debug, Parser)]
#[command(
    name = "tripweaver",
    about = "Group trip itinerary optimisation",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Optimise one trip request into a day-by-day itinerary.
    Optimise(OptimiseArgs),
}

/// Errors emitted by the Tripweaver CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// Provided arguments failed Clap validation.
    #[error(transparent)]
    ArgumentParsing(#[from] clap::Error),
    /// An input file could not be read.
    #[error("could not read {path}: {source}")]
    UnreadableFile {
        /// Offending path.
        path: Utf8PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
    /// An input file held malformed JSON.
    #[error("could not parse {path}: {source}")]
    MalformedInput {
        /// Offending path.
        path: Utf8PathBuf,
        /// Underlying parse failure.
        #[source]
        source: serde_json::Error,
    },
    /// The engine rejected or failed the run.
    #[error(transparent)]
    Engine(#[from] EngineError),
    /// The result could not be rendered as JSON.
    #[error("could not render the result: {0}")]
    Rendering(#[from] serde_json::Error),
}
