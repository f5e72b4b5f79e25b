//! Readers that fetch a raw feed payload
//!
//! [`FeedReader`] is the capability the pipeline depends on. [`HttpReader`]
//! talks to the real feed; [`MemoryReader`] serves canned payloads.

use std::cell::RefCell;
use std::collections::HashMap;

use reqwest::blocking::Client;
use tracing::debug;

use crate::error::{QuakeError, Result};

/// Something that can fetch the bytes behind a URL
pub trait FeedReader {
    /// Performs one blocking fetch and returns the body verbatim
    fn fetch(&self, url: &str) -> Result<Vec<u8>>;
}

/// Reads feeds over HTTP with a blocking client
///
/// One GET per call: no retries and no status check. Timeouts and redirect
/// handling are the client defaults.
#[derive(Debug, Clone)]
pub struct HttpReader {
    client: Client,
}

impl Default for HttpReader {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpReader {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }

    /// Create a reader around a preconfigured HTTP client
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

impl FeedReader for HttpReader {
    fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        if url.trim().is_empty() {
            return Err(QuakeError::InvalidConfig("feed URL cannot be empty".to_string()));
        }

        let network = |e: reqwest::Error| QuakeError::Network {
            url: url.to_string(),
            source: Box::new(e),
        };

        debug!(url, "fetching feed");
        let response = self.client.get(url).send().map_err(network)?;
        let status = response.status();
        let body = response.bytes().map_err(network)?;
        debug!(url, %status, bytes = body.len(), "feed fetched");

        Ok(body.to_vec())
    }
}

/// Serves payloads from memory, keyed by exact URL
///
/// Records every requested URL so callers can assert on them. Unknown URLs
/// fail with [`QuakeError::Network`].
#[derive(Debug, Default)]
pub struct MemoryReader {
    payloads: HashMap<String, Vec<u8>>,
    requests: RefCell<Vec<String>>,
}

impl MemoryReader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a payload to serve for `url`
    pub fn with_payload(mut self, url: impl Into<String>, body: impl Into<Vec<u8>>) -> Self {
        self.payloads.insert(url.into(), body.into());
        self
    }

    /// URLs requested so far, in call order
    pub fn requests(&self) -> Vec<String> {
        self.requests.borrow().clone()
    }
}

impl FeedReader for MemoryReader {
    fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        self.requests.borrow_mut().push(url.to_string());
        self.payloads
            .get(url)
            .cloned()
            .ok_or_else(|| QuakeError::Network {
                url: url.to_string(),
                source: format!("no payload registered for {}", url).into(),
            })
    }
}

impl<R: FeedReader + ?Sized> FeedReader for Box<R> {
    fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        (**self).fetch(url)
    }
}

impl<R: FeedReader + ?Sized> FeedReader for &R {
    fn fetch(&self, url: &str) -> Result<Vec<u8>> {
        (**self).fetch(url)
    }
}
