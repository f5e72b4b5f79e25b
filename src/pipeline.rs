//! Fetch, cache, decode, and project in one call
//!
//! A [`Pipeline`] runs in one of two modes fixed at construction:
//!
//! * **Live**: fetch the feed for each query, optionally append the raw
//!   payload to a cache file named `{threshold}_{window}`, then decode.
//! * **Replay**: decode a previously saved file. Query tokens are still
//!   validated but do not affect which data is read.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::cache::CacheStore;
use crate::data::{project_all, Event, FeedDecoder, FeedReader};
use crate::error::{QuakeError, Result};
use crate::query::{self, Query};

/// Base URL of the USGS summary feeds
pub const USGS_FEED_URL: &str = "https://earthquake.usgs.gov/earthquakes/feed/v1.0/summary/";

/// What a live query does when the cache write fails
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CacheFailurePolicy {
    /// Return the cache error; the payload is not decoded
    #[default]
    Abort,
    /// Log the error and continue with the fetched payload
    Warn,
}

/// Settings for a live pipeline
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Prefix the `{threshold}_{window}.geojson` feed name is appended to
    pub base_url: String,
    pub cache_failure: CacheFailurePolicy,
    /// Also write a pretty-printed `pretty_{threshold}_{window}` copy
    pub pretty: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            base_url: USGS_FEED_URL.to_string(),
            cache_failure: CacheFailurePolicy::default(),
            pretty: false,
        }
    }
}

enum Source {
    Live {
        reader: Box<dyn FeedReader>,
        cache: Option<CacheStore>,
    },
    Replay {
        path: PathBuf,
    },
}

/// Turns (threshold, window) queries into ordered lists of [`Event`]s
pub struct Pipeline {
    source: Source,
    decoder: FeedDecoder,
    config: PipelineConfig,
}

impl Pipeline {
    /// Live pipeline without caching
    pub fn live(reader: Box<dyn FeedReader>, decoder: FeedDecoder, config: PipelineConfig) -> Self {
        Self {
            source: Source::Live {
                reader,
                cache: None,
            },
            decoder,
            config,
        }
    }

    /// Live pipeline that appends every fetched payload to `cache`
    ///
    /// An unnamed store is named after the first query it serves.
    pub fn live_cached(
        reader: Box<dyn FeedReader>,
        decoder: FeedDecoder,
        cache: CacheStore,
        config: PipelineConfig,
    ) -> Self {
        Self {
            source: Source::Live {
                reader,
                cache: Some(cache),
            },
            decoder,
            config,
        }
    }

    /// Replay pipeline over a saved feed file
    ///
    /// # Returns
    /// * `Err(QuakeError::InvalidConfig)` if `path` is not an existing regular file
    pub fn replay(path: impl AsRef<Path>, decoder: FeedDecoder) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(QuakeError::InvalidConfig(format!(
                "replay file {} does not exist or is not a file",
                path.display()
            )));
        }

        Ok(Self {
            source: Source::Replay {
                path: path.to_path_buf(),
            },
            decoder,
            config: PipelineConfig::default(),
        })
    }

    pub fn is_replay(&self) -> bool {
        matches!(self.source, Source::Replay { .. })
    }

    /// The live cache store, if any
    pub fn cache(&self) -> Option<&CacheStore> {
        match &self.source {
            Source::Live { cache, .. } => cache.as_ref(),
            Source::Replay { .. } => None,
        }
    }

    /// Runs one query
    ///
    /// # Returns
    /// * `Ok(Vec<Event>)` in feed order
    /// * `Err(QuakeError)` for invalid tokens or any fetch, cache, or decode failure
    pub fn query(&mut self, threshold: &str, window: &str) -> Result<Vec<Event>> {
        let query = query::validate(threshold, window)?;

        let document = match &mut self.source {
            Source::Live { reader, cache } => {
                let url = query.url(&self.config.base_url);
                let payload = reader.fetch(&url)?;

                if let Some(cache) = cache {
                    if let Err(err) = write_cache(cache, &query, &payload, self.config.pretty) {
                        match self.config.cache_failure {
                            CacheFailurePolicy::Abort => return Err(err),
                            CacheFailurePolicy::Warn => {
                                warn!(error = %err, "cache write failed, continuing")
                            }
                        }
                    }
                }

                self.decoder.decode(&payload)?
            }
            Source::Replay { path } => {
                debug!(path = %path.display(), query = %query.key(), "replaying cached feed");
                self.decoder.decode_file(path)?
            }
        };

        project_all(&document)
    }

    /// Every quake from the past week; same as `query("all", "week")`
    pub fn query_default(&mut self) -> Result<Vec<Event>> {
        let default = Query::default();
        self.query(default.threshold.as_str(), default.window.as_str())
    }
}

/// Appends the raw payload and, if asked, rewrites the pretty companion
fn write_cache(cache: &mut CacheStore, query: &Query, payload: &[u8], pretty: bool) -> Result<()> {
    cache.set_name(&query.key())?;
    cache.append(payload)?;

    if pretty {
        let value: serde_json::Value = serde_json::from_slice(payload)?;
        let text = serde_json::to_string_pretty(&value)?;
        cache
            .sibling(&format!("pretty_{}", query.key()))?
            .create(text.as_bytes())?;
    }
    Ok(())
}
