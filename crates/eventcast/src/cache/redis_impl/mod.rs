//! Redis cache backend implementation.
//!
//! Provides a cache shared by every instance pointed at the same Redis,
//! so the rate gate paces all of them together.

mod cache;
mod error;

pub use cache::RedisCache;
