use std::time::Duration;

use async_trait::async_trait;

use super::Result;

/// Remaining lifetime of a key as reported by the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyTtl {
    /// The key does not exist or has already expired.
    Missing,
    /// The key exists without an expiry.
    Persistent,
    /// The key expires after the given duration.
    Expires(Duration),
}

/// Trait for basic cache operations.
///
/// Implementations must be safe for concurrent use. Writes to a single key are
/// atomic; nothing spans two keys.
#[async_trait]
pub trait Cache: Send + Sync {
    /// Gets a value from the cache by key. Expired keys behave as absent.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Sets a value in the cache with an optional TTL, overwriting any
    /// existing value.
    async fn set(&self, key: &str, value: &[u8], ttl: Option<Duration>) -> Result<()>;

    /// Reports the remaining lifetime of a key.
    async fn ttl(&self, key: &str) -> Result<KeyTtl>;
}
