//! Redis cache implementation.
//!
//! `SET EX` for writes, `GET` for reads and `PTTL` for the remaining
//! lifetime. Redis expires keys itself, which gives the same lazy-expiry
//! behavior as the in-memory store.

use std::time::Duration;

use async_trait::async_trait;
use redis::AsyncCommands;

use eventcast_core::cache::{Cache, KeyTtl, Result};

use super::error::map_redis_error;

/// Redis cache backend using connection manager for pooling.
pub struct RedisCache {
    conn: redis::aio::ConnectionManager,
}

impl RedisCache {
    /// Creates a new Redis cache connection.
    ///
    /// # Arguments
    ///
    /// * `url` - Redis connection URL (e.g., "redis://localhost:6379")
    ///
    /// # Errors
    ///
    /// Returns `CacheError::ConnectionFailed` if the connection cannot be established.
    pub async fn new(url: &str) -> Result<Self> {
        let client = redis::Client::open(url).map_err(map_redis_error)?;
        let conn = redis::aio::ConnectionManager::new(client)
            .await
            .map_err(map_redis_error)?;
        Ok(Self { conn })
    }
}

/// Interprets a `PTTL` reply.
fn ttl_from_pttl(millis: i64) -> KeyTtl {
    match millis {
        -1 => KeyTtl::Persistent,
        ms if ms < 0 => KeyTtl::Missing,
        ms => KeyTtl::Expires(Duration::from_millis(ms.unsigned_abs())),
    }
}

#[async_trait]
impl Cache for RedisCache {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let mut conn = self.conn.clone();
        let result: Option<Vec<u8>> = conn.get(key).await.map_err(map_redis_error)?;
        Ok(result)
    }

    async fn set(&self, key: &str, value: &[u8], ttl: Option<Duration>) -> Result<()> {
        let mut conn = self.conn.clone();

        match ttl {
            Some(duration) => {
                let seconds = duration.as_secs().max(1);
                conn.set_ex::<_, _, ()>(key, value, seconds)
                    .await
                    .map_err(map_redis_error)?;
            }
            None => {
                conn.set::<_, _, ()>(key, value)
                    .await
                    .map_err(map_redis_error)?;
            }
        }

        Ok(())
    }

    async fn ttl(&self, key: &str) -> Result<KeyTtl> {
        let mut conn = self.conn.clone();
        let millis: i64 = conn.pttl(key).await.map_err(map_redis_error)?;
        Ok(ttl_from_pttl(millis))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Helper to get Redis URL from environment.
    fn redis_url() -> String {
        std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://localhost:6379".to_string())
    }

    /// Skip test if Redis not available.
    async fn get_test_cache() -> Option<RedisCache> {
        RedisCache::new(&redis_url()).await.ok()
    }

    /// Generate a unique test key to avoid conflicts.
    fn test_key(suffix: &str) -> String {
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        format!("test:redis_cache:{nanos}:{suffix}")
    }

    #[test]
    fn test_ttl_from_pttl() {
        assert_eq!(ttl_from_pttl(-2), KeyTtl::Missing);
        assert_eq!(ttl_from_pttl(-1), KeyTtl::Persistent);
        assert_eq!(
            ttl_from_pttl(1500),
            KeyTtl::Expires(Duration::from_millis(1500))
        );
    }

    #[tokio::test]
    async fn test_redis_set_and_get() {
        let Some(cache) = get_test_cache().await else {
            eprintln!("Skipping test: Redis not available");
            return;
        };

        let key = test_key("set_get");
        let value = b"hello world";

        cache
            .set(&key, value, Some(Duration::from_secs(10)))
            .await
            .unwrap();

        let result = cache.get(&key).await.unwrap();
        assert_eq!(result, Some(value.to_vec()));
    }

    #[tokio::test]
    async fn test_redis_get_nonexistent() {
        let Some(cache) = get_test_cache().await else {
            eprintln!("Skipping test: Redis not available");
            return;
        };

        let key = test_key("nonexistent");
        assert_eq!(cache.get(&key).await.unwrap(), None);
        assert_eq!(cache.ttl(&key).await.unwrap(), KeyTtl::Missing);
    }

    #[tokio::test]
    async fn test_redis_ttl() {
        let Some(cache) = get_test_cache().await else {
            eprintln!("Skipping test: Redis not available");
            return;
        };

        let key = test_key("ttl");

        cache
            .set(&key, b"expiring value", Some(Duration::from_secs(1)))
            .await
            .unwrap();

        assert!(matches!(
            cache.ttl(&key).await.unwrap(),
            KeyTtl::Expires(d) if d <= Duration::from_secs(1)
        ));

        tokio::time::sleep(Duration::from_millis(1500)).await;

        assert!(cache.get(&key).await.unwrap().is_none());
    }
}
