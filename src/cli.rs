//! Command-line interface parsing for quakefeed
//!
//! This module handles parsing of CLI arguments using clap and turns them
//! into a [`StartupConfig`] the binary can build a pipeline from.

use std::path::{PathBuf, MAIN_SEPARATOR};

use clap::Parser;
use directories::ProjectDirs;

use crate::cache::{CacheStore, DEFAULT_EXTENSION};
use crate::error::{QuakeError, Result};
use crate::pipeline::{CacheFailurePolicy, PipelineConfig, USGS_FEED_URL};
use crate::query::{self, Query};

/// quakefeed - Fetch and summarize USGS earthquake feeds
#[derive(Parser, Debug)]
#[command(name = "quakefeed")]
#[command(about = "Fetch, cache, and summarize USGS earthquake feeds")]
#[command(version)]
pub struct Cli {
    /// Minimum significance: significant, all, 4.5, 2.5, 1.0
    #[arg(default_value = "all")]
    pub threshold: String,

    /// Time window: hour, day, week, month
    #[arg(default_value = "week")]
    pub window: String,

    /// Read a previously saved feed file instead of the network
    #[arg(long, value_name = "FILE", conflicts_with = "cache")]
    pub replay: Option<PathBuf>,

    /// Append every fetched payload to a cache file
    #[arg(long)]
    pub cache: bool,

    /// Directory for cache files (defaults to the XDG cache directory)
    #[arg(long, value_name = "DIR", requires = "cache")]
    pub cache_dir: Option<PathBuf>,

    /// Cache file extension
    #[arg(long, value_name = "EXT", default_value = DEFAULT_EXTENSION)]
    pub extension: String,

    /// Insert epoch milliseconds into cache file names
    #[arg(long)]
    pub timestamp: bool,

    /// Also write a pretty-printed copy of each payload
    #[arg(long, requires = "cache")]
    pub pretty: bool,

    /// Keep going when the cache cannot be written
    #[arg(long)]
    pub tolerate_cache_errors: bool,

    /// Feed base URL; `{threshold}_{window}.geojson` is appended
    #[arg(long, env = "QUAKEFEED_BASE_URL", default_value = USGS_FEED_URL)]
    pub base_url: String,

    /// Print events as JSON instead of text
    #[arg(long)]
    pub json: bool,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

/// Where the pipeline gets its data
#[derive(Debug)]
pub enum SourceConfig {
    /// Fetch from the network, optionally caching
    Live { cache: Option<CacheStore> },
    /// Decode a saved file
    Replay(PathBuf),
}

/// Configuration derived from CLI arguments for application startup
#[derive(Debug)]
pub struct StartupConfig {
    pub query: Query,
    pub source: SourceConfig,
    pub pipeline: PipelineConfig,
    pub json: bool,
    pub verbose: bool,
}

/// Default cache directory, e.g. `~/.cache/quakefeed/` on Linux
///
/// Returns `None` if no home directory can be determined.
pub fn default_cache_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "quakefeed").map(|dirs| dirs.cache_dir().to_path_buf())
}

/// Renders a directory path with a trailing separator, as `CacheStore` expects
pub fn dir_with_separator(dir: &std::path::Path) -> String {
    let mut text = dir.display().to_string();
    if !text.ends_with(MAIN_SEPARATOR) && !text.ends_with('/') {
        text.push(MAIN_SEPARATOR);
    }
    text
}

impl StartupConfig {
    /// Creates a StartupConfig from parsed CLI arguments.
    ///
    /// Validates the query tokens and, when caching, builds the cache store
    /// (which creates its directory).
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let query = query::validate(&cli.threshold, &cli.window)?;

        let pipeline = PipelineConfig {
            base_url: cli.base_url.clone(),
            cache_failure: if cli.tolerate_cache_errors {
                CacheFailurePolicy::Warn
            } else {
                CacheFailurePolicy::Abort
            },
            pretty: cli.pretty,
        };

        let source = match &cli.replay {
            Some(path) => SourceConfig::Replay(path.clone()),
            None if cli.cache => {
                let dir = match &cli.cache_dir {
                    Some(dir) => dir.clone(),
                    None => default_cache_dir().ok_or_else(|| {
                        QuakeError::InvalidConfig(
                            "no cache directory available; pass --cache-dir".to_string(),
                        )
                    })?,
                };
                let store = CacheStore::with_options(
                    None,
                    &dir_with_separator(&dir),
                    &cli.extension,
                    cli.timestamp,
                )?;
                SourceConfig::Live { cache: Some(store) }
            }
            None => SourceConfig::Live { cache: None },
        };

        Ok(StartupConfig {
            query,
            source,
            pipeline,
            json: cli.json,
            verbose: cli.verbose,
        })
    }
}
