//! In-memory response caching for GET requests.
//!
//! This module provides the `ResponseCache` owned by each `ApiClient`.
//! Entries are keyed by request path plus canonically ordered query
//! parameters and are considered stale after a freshness window
//! (5 minutes by default). Staleness is checked lazily on read; there is no
//! background eviction.

pub mod clock;
pub mod key;
pub mod response;

pub use clock::{Clock, ManualClock, SystemClock};
pub use key::CacheKey;
pub use response::{CachedResponse, ResponseCache, DEFAULT_FRESHNESS};
