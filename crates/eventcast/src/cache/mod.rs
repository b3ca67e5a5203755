//! Cache backend implementations and the two consumers built on them.
//!
//! The backends implement `eventcast_core::cache::Cache` and are selected at
//! compile time via feature flags:
//!
//! - `memory` (default): in-process LRU store with lazy TTL expiry
//! - `redis`: Redis store shared across instances
//!
//! These features are mutually exclusive. [`RequestCache`] and [`RateGate`]
//! only see the trait, so they behave the same on either backend.

// Compile-time checks for mutual exclusivity
#[cfg(all(feature = "memory", feature = "redis"))]
compile_error!(
    "Features 'memory' and 'redis' are mutually exclusive. \
    Enable only one cache backend at a time."
);

#[cfg(not(any(feature = "memory", feature = "redis")))]
compile_error!(
    "No cache backend selected. Enable 'memory' or 'redis' feature. \
    Example: cargo build -p eventcast --features memory"
);

// The in-memory store also backs tests under every feature set.
#[cfg(any(feature = "memory", test))]
pub mod memory;

#[cfg(feature = "redis")]
pub mod redis_impl;

mod rate_gate;
mod request_cache;

#[cfg(any(feature = "memory", test))]
pub use memory::MemoryCache;

#[cfg(feature = "redis")]
pub use redis_impl::RedisCache;

pub use rate_gate::RateGate;
pub use request_cache::RequestCache;
