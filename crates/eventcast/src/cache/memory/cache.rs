//! In-memory cache implementation with LRU eviction.
//!
//! Expiry is lazy: an entry whose deadline has passed behaves as absent and is
//! removed by the read that observes it. Deadlines use `tokio::time::Instant`
//! so paused test clocks drive them.

use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use lru::LruCache;
use tokio::sync::Mutex;
use tokio::time::Instant;

use eventcast_core::cache::{Cache, KeyTtl, Result};

/// A single cache entry with optional expiration.
#[derive(Debug, Clone)]
struct CacheEntry {
    value: Vec<u8>,
    expires_at: Option<Instant>,
}

impl CacheEntry {
    fn new(value: Vec<u8>, ttl: Option<Duration>) -> Self {
        let expires_at = ttl.map(|d| Instant::now() + d);
        Self { value, expires_at }
    }

    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|exp| now >= exp)
    }
}

/// In-memory cache implementation with LRU eviction.
///
/// Every operation takes the single store lock, so each key is updated
/// atomically. When `max_entries` is reached the least recently used entry is
/// evicted.
#[derive(Debug, Clone)]
pub struct MemoryCache {
    store: Arc<Mutex<LruCache<String, CacheEntry>>>,
}

impl MemoryCache {
    /// Creates a new in-memory cache holding at most `max_entries` keys.
    /// A capacity of 0 is treated as 1.
    pub fn new(max_entries: usize) -> Self {
        let capacity = NonZeroUsize::new(max_entries).unwrap_or(NonZeroUsize::MIN);
        Self {
            store: Arc::new(Mutex::new(LruCache::new(capacity))),
        }
    }

    /// Number of entries currently held, expired ones included.
    #[cfg(test)]
    pub async fn len(&self) -> usize {
        self.store.lock().await.len()
    }
}

#[async_trait]
impl Cache for MemoryCache {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let mut store = self.store.lock().await;
        let now = Instant::now();

        match store.get(key) {
            Some(entry) if entry.is_expired(now) => {
                store.pop(key);
                Ok(None)
            }
            Some(entry) => Ok(Some(entry.value.clone())),
            None => Ok(None),
        }
    }

    async fn set(&self, key: &str, value: &[u8], ttl: Option<Duration>) -> Result<()> {
        let mut store = self.store.lock().await;
        store.put(key.to_string(), CacheEntry::new(value.to_vec(), ttl));
        Ok(())
    }

    async fn ttl(&self, key: &str) -> Result<KeyTtl> {
        let mut store = self.store.lock().await;
        let now = Instant::now();

        let ttl = match store.peek(key) {
            None => KeyTtl::Missing,
            Some(entry) if entry.is_expired(now) => {
                store.pop(key);
                KeyTtl::Missing
            }
            Some(CacheEntry {
                expires_at: Some(exp),
                ..
            }) => KeyTtl::Expires(*exp - now),
            Some(_) => KeyTtl::Persistent,
        };

        Ok(ttl)
    }
}
