//! In-memory caching of the assembled menu.
//!
//! This module provides the `MenuCache`, a single-slot read-through cache
//! for the full catalog. The cached tree is considered stale after five
//! minutes (configurable) and is dropped entirely on every write.

pub mod manager;

pub use manager::{CachedData, Clock, MenuCache, SystemClock, DEFAULT_CACHE_TTL_MINUTES};
