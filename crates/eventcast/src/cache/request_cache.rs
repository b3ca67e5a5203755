//! Keyed TTL cache for upstream responses and aggregates.
//!
//! Each logical entry is two sub-keys written with the same TTL:
//! `<key>:content` and, when a provenance timestamp is given,
//! `<key>:last_modified` (UNIX seconds).

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};

use eventcast_core::cache::{
    cache_key, content_key, decode_timestamp, encode_timestamp, last_modified_key, Cache,
    CacheError, CachedPayload, KeySource, Payload, Result,
};

/// Namespaced view over a shared [`Cache`] store.
#[derive(Clone)]
pub struct RequestCache {
    store: Arc<dyn Cache>,
    namespace: String,
}

impl RequestCache {
    pub fn new(store: Arc<dyn Cache>, namespace: impl Into<String>) -> Self {
        Self {
            store,
            namespace: namespace.into(),
        }
    }

    /// The key an entry for `source` is stored under.
    pub fn key_for(&self, source: &KeySource<'_>) -> String {
        cache_key(&self.namespace, source)
    }

    /// Reads an entry. Content is returned as stored; a missing or expired
    /// content sub-key means no entry whatever the timestamp sub-key holds.
    pub async fn get(&self, source: &KeySource<'_>) -> Result<Option<CachedPayload>> {
        let key = self.key_for(source);

        let Some(bytes) = self.store.get(&content_key(&key)).await? else {
            tracing::trace!(cache_key = %key, "Cache miss");
            return Ok(None);
        };
        let content = String::from_utf8(bytes).map_err(|e| CacheError::Decode(e.to_string()))?;

        let last_modified = match self.store.get(&last_modified_key(&key)).await {
            Ok(Some(raw)) => match decode_timestamp(&raw) {
                Ok(ts) => Some(ts),
                Err(err) => {
                    tracing::warn!(cache_key = %key, error = %err, "Ignoring unreadable timestamp");
                    None
                }
            },
            Ok(None) => None,
            Err(err) => {
                tracing::warn!(cache_key = %key, error = %err, "Failed to read timestamp");
                None
            }
        };

        tracing::trace!(cache_key = %key, "Cache hit");
        Ok(Some(CachedPayload {
            content,
            last_modified,
        }))
    }

    /// Writes an entry. The payload is encoded before anything is written, so
    /// an invalid payload leaves the store untouched.
    pub async fn set(
        &self,
        source: &KeySource<'_>,
        payload: Payload<'_>,
        last_modified: Option<DateTime<Utc>>,
        ttl: Duration,
    ) -> Result<()> {
        let content = payload.encode()?;
        let key = self.key_for(source);

        self.store
            .set(&content_key(&key), content.as_bytes(), Some(ttl))
            .await?;

        if let Some(ts) = last_modified {
            self.store
                .set(
                    &last_modified_key(&key),
                    encode_timestamp(ts).as_bytes(),
                    Some(ttl),
                )
                .await?;
        }

        tracing::trace!(cache_key = %key, ttl_secs = ttl.as_secs(), "Cache write");
        Ok(())
    }
}
