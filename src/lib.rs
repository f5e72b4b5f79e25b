//! quakefeed library
//!
//! Fetches USGS earthquake summary feeds, optionally caches the raw payload,
//! and projects each record to a minimal [`data::Event`]. Modules are public
//! for the binary and integration tests.

pub mod cache;
pub mod cli;
pub mod data;
pub mod error;
pub mod pipeline;
pub mod query;

pub use data::{Coordinate, Event};
pub use error::{QuakeError, Result};
pub use pipeline::{CacheFailurePolicy, Pipeline, PipelineConfig};
