//! In-process response cache for `/api` reads.
//!
//! Entries live until their TTL runs out or an admin clears them; writes do
//! not invalidate anything.

mod config;
mod keys;
mod middleware;
mod store;

pub use config::{CachePolicy, POPULAR_PATH, SUGGESTIONS_PATH};
pub use keys::{api_key, request_key};
pub use middleware::{CacheState, response_cache_layer};
pub use store::{CachedPayload, Clock, ManualClock, ResponseCache, SystemClock};

pub(crate) use store::{METRIC_CACHE_EVICT, METRIC_CACHE_HIT, METRIC_CACHE_MISS, METRIC_CACHE_STORE};
