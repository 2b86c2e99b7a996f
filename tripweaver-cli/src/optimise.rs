//! The `optimise` subcommand.

use camino::{Utf8Path, Utf8PathBuf};
use clap::Parser;
use serde::de::DeserializeOwned;
use tripweaver_core::{
    Airport, LogProgressSink, OptimisationRequest, OptimisationResult, StaticAirportDirectory,
};
use tripweaver_pipeline::{MemoryResultCache, MemoryResultStore, Orchestrator};

use crate::CliError;

/// CLI arguments for the `optimise` subcommand.
#[derive(Debug, Clone, Parser)]
#[command(about = "Optimise a trip request into a day-by-day itinerary")]
pub struct OptimiseArgs {
    /// Path to the optimisation request JSON.
    #[arg(long, value_name = "path")]
    request: Utf8PathBuf,
    /// Path to an airport directory JSON (an array of airports).
    #[arg(long, value_name = "path")]
    airports: Option<Utf8PathBuf>,
    /// Pretty-print the resulting itinerary.
    #[arg(long)]
    pretty: bool,
}

/// Load the request, run the pipeline, and render the itinerary.
pub fn run_optimise(args: &OptimiseArgs) -> Result<String, CliError> {
    let request: OptimisationRequest = read_json(&args.request)?;
    let airports: Vec<Airport> = match &args.airports {
        Some(path) => read_json(path)?,
        None => Vec::new(),
    };
    let result = optimise(&request, airports)?;
    render(&result, args.pretty)
}

fn optimise(
    request: &OptimisationRequest,
    airports: Vec<Airport>,
) -> Result<OptimisationResult, CliError> {
    let cache = MemoryResultCache::new();
    let store = MemoryResultStore::new();
    let progress = LogProgressSink;
    let directory = StaticAirportDirectory::new(airports);
    let orchestrator = Orchestrator::new(&cache, &store, &progress, &directory);
    Ok(orchestrator.optimise(request)?)
}

fn render(result: &OptimisationResult, pretty: bool) -> Result<String, CliError> {
    let rendered = if pretty {
        serde_json::to_string_pretty(result)?
    } else {
        serde_json::to_string(result)?
    };
    Ok(rendered)
}

fn read_json<T: DeserializeOwned>(path: &Utf8Path) -> Result<T, CliError> {
    let raw = std::fs::read_to_string(path).map_err(|source| CliError::UnreadableFile {
        path: path.to_owned(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| CliError::MalformedInput {
        path: path.to_owned(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use geo::Coord;
    use rstest::{fixture, rstest};
    use tempfile::TempDir;
    use tripweaver_core::{Member, OptimisationSettings, Place, Preference};

    fn write_request(dir: &TempDir) -> Utf8PathBuf {
        let request = OptimisationRequest {
            trip_id: "trip-1".into(),
            places: vec![
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
                Preference::new("m-1", "p-temple", 5.0, 60),
                Preference::new("m-1", "p-tower", 3.0, 60),
            ],
            members: vec![Member::new("m-1", "Ada", "#111111")],
            settings: OptimisationSettings::default(),
        };
        let path = Utf8PathBuf::from_path_buf(dir.path().join("request.json"))
            .expect("utf8 temp path");
        std::fs::write(
            &path,
            serde_json::to_string(&request).expect("serialise request"),
        )
        .expect("write request file");
        path
    }

    #[fixture]
    fn temp_dir() -> TempDir {
        TempDir::new().expect("create temp dir")
    }

    #[rstest]
    fn optimises_a_request_file(temp_dir: TempDir) {
        let args = OptimiseArgs {
            request: write_request(&temp_dir),
            airports: None,
            pretty: false,
        };
        let rendered = run_optimise(&args).expect("optimisation succeeds");
        let result: OptimisationResult =
            serde_json::from_str(&rendered).expect("output is a result document");
        assert_eq!(result.selected_places.len(), 2);
        assert!(!result.day_schedules.is_empty());
    }

    #[rstest]
    fn pretty_output_is_multi_line(temp_dir: TempDir) {
        let args = OptimiseArgs {
            request: write_request(&temp_dir),
            airports: None,
            pretty: true,
        };
        let rendered = run_optimise(&args).expect("optimisation succeeds");
        assert!(rendered.contains('\n'));
    }

    #[rstest]
    fn missing_request_file_is_reported(temp_dir: TempDir) {
        let path = Utf8PathBuf::from_path_buf(temp_dir.path().join("absent.json"))
            .expect("utf8 temp path");
        let args = OptimiseArgs {
            request: path,
            airports: None,
            pretty: false,
        };
        let err = run_optimise(&args).expect_err("missing file");
        assert!(matches!(err, CliError::UnreadableFile { .. }));
    }

    #[rstest]
    fn malformed_request_is_reported(temp_dir: TempDir) {
        let path = Utf8PathBuf::from_path_buf(temp_dir.path().join("broken.json"))
            .expect("utf8 temp path");
        std::fs::write(&path, "{not json").expect("write broken file");
        let args = OptimiseArgs {
            request: path,
            airports: None,
            pretty: false,
        };
        let err = run_optimise(&args).expect_err("malformed file");
        assert!(matches!(err, CliError::MalformedInput { .. }));
    }
}
