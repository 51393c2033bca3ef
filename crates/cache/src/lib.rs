//! # Result Cache
//!
//! Stores computed analytics payloads under a deterministic key with a
//! per-endpoint TTL.
//!
//! - `CacheStore`: the storage seam. `InMemoryCache` is the in-process backend.
//! - `CacheCoordinator`: read-through access with single-flight computation,
//!   so concurrent misses on one key compute once.
//! - `cache_key`: `intel:<endpoint>:<hash>` derived from validated options.

pub mod coordinator;
pub mod error;
pub mod key;
pub mod store;

pub use coordinator::{CacheCoordinator, Cached};
pub use error::CacheError;
pub use key::cache_key;
pub use store::{CacheMetrics, CacheStore, InMemoryCache};
