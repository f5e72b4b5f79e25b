//! Query validation against the feed's fixed vocabulary
//!
//! The summary feed only publishes a handful of files, one per
//! (threshold, window) pair. Tokens are case-folded and checked here before
//! any network or filesystem work happens.

use crate::error::{QuakeError, Result};

/// Minimum-significance filter published by the feed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Threshold {
    Significant,
    All,
    M4_5,
    M2_5,
    M1_0,
}

impl Threshold {
    /// Returns all thresholds in the order they are reported in errors
    pub fn all() -> &'static [Threshold] {
        &[
            Threshold::Significant,
            Threshold::All,
            Threshold::M4_5,
            Threshold::M2_5,
            Threshold::M1_0,
        ]
    }

    /// Token used in feed file names
    pub fn as_str(&self) -> &'static str {
        match self {
            Threshold::Significant => "significant",
            Threshold::All => "all",
            Threshold::M4_5 => "4.5",
            Threshold::M2_5 => "2.5",
            Threshold::M1_0 => "1.0",
        }
    }

    /// Parses a threshold token, ignoring case
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Threshold> {
        let token = s.to_lowercase();
        Threshold::all()
            .iter()
            .copied()
            .find(|t| t.as_str() == token)
    }
}

/// Time range published by the feed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Window {
    Hour,
    Day,
    Week,
    Month,
}

impl Window {
    pub fn all() -> &'static [Window] {
        &[Window::Hour, Window::Day, Window::Week, Window::Month]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Window::Hour => "hour",
            Window::Day => "day",
            Window::Week => "week",
            Window::Month => "month",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Window> {
        match s.to_lowercase().as_str() {
            "hour" => Some(Window::Hour),
            "day" => Some(Window::Day),
            "week" => Some(Window::Week),
            "month" => Some(Window::Month),
            _ => None,
        }
    }
}

/// A validated (threshold, window) pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Query {
    pub threshold: Threshold,
    pub window: Window,
}

impl Default for Query {
    /// Every quake from the past week
    fn default() -> Self {
        Self {
            threshold: Threshold::All,
            window: Window::Week,
        }
    }
}

impl Query {
    /// Feed key shared by the remote file and the local cache name, e.g. `all_week`
    pub fn key(&self) -> String {
        format!("{}_{}", self.threshold.as_str(), self.window.as_str())
    }

    /// Remote feed URL for this query
    ///
    /// The remote extension is always `.geojson`, whatever extension the
    /// local cache uses.
    pub fn url(&self, base_url: &str) -> String {
        format!("{}{}.geojson", base_url, self.key())
    }
}

/// Validates caller-supplied threshold and time tokens
///
/// # Returns
/// * `Ok(Query)` if both tokens are in the accepted vocabulary
/// * `Err(QuakeError::InvalidQuery)` naming the first rejected field
pub fn validate(threshold: &str, window: &str) -> Result<Query> {
    let parsed_threshold =
        Threshold::from_str(threshold).ok_or_else(|| QuakeError::InvalidQuery {
            field: "threshold",
            value: threshold.to_string(),
            accepted: join(Threshold::all().iter().map(Threshold::as_str)),
        })?;

    let parsed_window = Window::from_str(window).ok_or_else(|| QuakeError::InvalidQuery {
        field: "time",
        value: window.to_string(),
        accepted: join(Window::all().iter().map(Window::as_str)),
    })?;

    Ok(Query {
        threshold: parsed_threshold,
        window: parsed_window,
    })
}

fn join<'a>(tokens: impl Iterator<Item = &'a str>) -> String {
    tokens.collect::<Vec<_>>().join(", ")
}
