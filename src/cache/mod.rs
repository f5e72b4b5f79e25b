//! Cache module for storing raw feed payloads on disk
//!
//! Payloads are written verbatim, one file per store, named from the query
//! that produced them. There is no expiry: files live until deleted.

mod store;

pub use store::{CacheName, CacheStore, DEFAULT_EXTENSION};
