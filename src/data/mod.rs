//! Core data models for quakefeed
//!
//! This module contains the minimal domain types handed to callers, plus the
//! feed schema, decoder, projector, and readers that produce them.

pub mod feed;
pub mod project;
pub mod reader;

pub use feed::{Feature, FeedDecoder, FeedDocument, Geometry, Metadata, Properties};
pub use project::{project, project_all};
pub use reader::{FeedReader, HttpReader, MemoryReader};

use std::fmt;
use std::hash::{Hash, Hasher};

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Where an earthquake occurred
///
/// Equality and hashing compare the bit patterns of the three components,
/// so `Coordinate` can be used as a map key.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Coordinate {
    /// Longitude in decimal degrees (east positive)
    pub longitude: f64,
    /// Latitude in decimal degrees (north positive)
    pub latitude: f64,
    /// Hypocenter depth in kilometers
    pub depth: f64,
}

impl Coordinate {
    pub fn new(longitude: f64, latitude: f64, depth: f64) -> Self {
        Self {
            longitude,
            latitude,
            depth,
        }
    }

    fn bits(&self) -> [u64; 3] {
        [
            self.longitude.to_bits(),
            self.latitude.to_bits(),
            self.depth.to_bits(),
        ]
    }
}

impl PartialEq for Coordinate {
    fn eq(&self, other: &Self) -> bool {
        self.bits() == other.bits()
    }
}

impl Eq for Coordinate {}

impl Hash for Coordinate {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.bits().hash(state);
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.4},{:.4} depth {:.2} km", self.latitude, self.longitude, self.depth)
    }
}

/// One earthquake, reduced to what callers need
#[derive(Debug, Clone, Serialize)]
pub struct Event {
    /// Epicenter and depth
    pub coordinate: Coordinate,
    /// Magnitude as reported by the feed
    pub magnitude: f64,
    /// Human-readable summary, e.g. "M 0.9 - 5km SSE of Hemet, CA"
    pub description: String,
    /// Feed-assigned unique identifier
    pub id: String,
    /// Origin time in milliseconds since the Unix epoch
    pub time: i64,
}

impl Event {
    pub fn new(
        coordinate: Coordinate,
        magnitude: f64,
        description: impl Into<String>,
        id: impl Into<String>,
        time: i64,
    ) -> Self {
        Self {
            coordinate,
            magnitude,
            description: description.into(),
            id: id.into(),
            time,
        }
    }

    /// Origin time as a UTC datetime, if the timestamp is representable
    pub fn datetime(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.time)
    }

    /// Origin time formatted like `Tue Apr 19 03:46:53 UTC 2016`
    ///
    /// Computed on demand from `time`; falls back to the raw millisecond
    /// value if it is out of chrono's range.
    pub fn neat_date(&self) -> String {
        match self.datetime() {
            Some(dt) => dt.format("%a %b %d %H:%M:%S UTC %Y").to_string(),
            None => self.time.to_string(),
        }
    }
}

impl PartialEq for Event {
    fn eq(&self, other: &Self) -> bool {
        self.coordinate == other.coordinate
            && self.magnitude.to_bits() == other.magnitude.to_bits()
            && self.description == other.description
            && self.id == other.id
            && self.time == other.time
    }
}

impl Eq for Event {}

impl Hash for Event {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.coordinate.hash(state);
        self.magnitude.to_bits().hash(state);
        self.description.hash(state);
        self.id.hash(state);
        self.time.hash(state);
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} at {} ({})",
            self.description,
            self.coordinate,
            self.neat_date()
        )
    }
}
