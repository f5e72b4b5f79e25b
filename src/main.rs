//! quakefeed - Fetch and summarize USGS earthquake feeds
//!
//! Validates the requested (threshold, window), fetches or replays the feed,
//! optionally caches the raw payload, and prints one line per earthquake.

use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use quakefeed::cli::{Cli, SourceConfig, StartupConfig};
use quakefeed::data::{Event, FeedDecoder, HttpReader};
use quakefeed::error::Result;
use quakefeed::pipeline::Pipeline;

/// Installs a stderr subscriber honoring `RUST_LOG`
fn init_logging(verbose: bool) {
    let default = if verbose { "quakefeed=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn build_pipeline(config: StartupConfig) -> Result<Pipeline> {
    let decoder = FeedDecoder::new();
    match config.source {
        SourceConfig::Replay(path) => Pipeline::replay(path, decoder),
        SourceConfig::Live { cache: Some(store) } => Ok(Pipeline::live_cached(
            Box::new(HttpReader::new()),
            decoder,
            store,
            config.pipeline,
        )),
        SourceConfig::Live { cache: None } => Ok(Pipeline::live(
            Box::new(HttpReader::new()),
            decoder,
            config.pipeline,
        )),
    }
}

fn print_events(events: &[Event], json: bool) -> Result<()> {
    if json {
        let text = serde_json::to_string_pretty(events)?;
        println!("{}", text);
    } else {
        for event in events {
            println!("{}", event);
        }
    }
    Ok(())
}

fn run(cli: Cli) -> Result<()> {
    let config = StartupConfig::from_cli(&cli)?;
    let query = config.query;
    let json = config.json;

    let mut pipeline = build_pipeline(config)?;
    let events = pipeline.query(query.threshold.as_str(), query.window.as_str())?;

    tracing::info!(count = events.len(), query = %query.key(), "query complete");
    print_events(&events, json)
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {}", err);
            ExitCode::from(err.exit_code() as u8)
        }
    }
}
