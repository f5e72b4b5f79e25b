//! Error types shared by every stage of the quake pipeline
//!
//! Each failure path has its own variant so callers can tell a bad query
//! apart from a dead network or an unwritable cache directory.

use std::path::PathBuf;

use thiserror::Error;

/// Exit status used when the feed could not be read over the network
pub const EXIT_NETWORK: i32 = 200;
/// Exit status used when the feed payload could not be decoded
pub const EXIT_DECODE: i32 = 201;

/// Errors produced while validating, fetching, caching, or decoding a feed
#[derive(Debug, Error)]
pub enum QuakeError {
    /// A threshold or time token outside the accepted vocabulary
    #[error("Invalid {field} '{value}'. Must be one of: {accepted}")]
    InvalidQuery {
        field: &'static str,
        value: String,
        accepted: String,
    },

    /// Transport failure while reading the remote feed
    #[error("Failed to read feed from {url}: {source}")]
    Network {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Payload is empty or not a well-formed feed document
    #[error("Failed to decode feed: {0}")]
    Decode(String),

    /// A feature lacks a field the domain projection cannot do without
    #[error("Feature '{id}' is missing required field '{field}'")]
    MissingField { id: String, field: &'static str },

    /// Filesystem failure on a cache file
    #[error("Cache I/O error on {}: {}", .path.display(), .source)]
    CacheIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Malformed configuration (cache directory, extension, replay file)
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl QuakeError {
    /// Process exit status the binary should use for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            QuakeError::Network { .. } => EXIT_NETWORK,
            QuakeError::Decode(_) | QuakeError::MissingField { .. } => EXIT_DECODE,
            QuakeError::InvalidQuery { .. } | QuakeError::InvalidConfig(_) => 2,
            QuakeError::CacheIo { .. } => 1,
        }
    }
}

impl From<serde_json::Error> for QuakeError {
    fn from(err: serde_json::Error) -> Self {
        QuakeError::Decode(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, QuakeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_query_message_lists_accepted_values() {
        let err = QuakeError::InvalidQuery {
            field: "threshold",
            value: "huge".to_string(),
            accepted: "significant, all".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Invalid threshold 'huge'. Must be one of: significant, all"
        );
    }

    #[test]
    fn test_exit_codes_distinguish_network_and_decode() {
        let network = QuakeError::Network {
            url: "http://localhost/".to_string(),
            source: "connection refused".into(),
        };
        assert_eq!(network.exit_code(), EXIT_NETWORK);
        assert_eq!(QuakeError::Decode("empty".to_string()).exit_code(), EXIT_DECODE);
        assert_eq!(
            QuakeError::MissingField {
                id: "ci1".to_string(),
                field: "mag"
            }
            .exit_code(),
            EXIT_DECODE
        );
    }

    #[test]
    fn test_serde_error_converts_to_decode() {
        let err: QuakeError = serde_json::from_str::<serde_json::Value>("{")
            .unwrap_err()
            .into();
        assert!(matches!(err, QuakeError::Decode(_)));
    }
}
