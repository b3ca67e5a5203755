//! Stale-serve-then-refresh reads over an aggregate-level cache.
//!
//! A read returns the cached aggregate when there is one and otherwise
//! computes it in the foreground. Either way a detached task recomputes the
//! aggregate and overwrites the entry. Refresh failures are logged and leave
//! the existing entry in place.

use std::sync::Arc;
use std::time::Duration;

use chrono::DateTime;
use serde_json::Value;
use tokio::task::JoinHandle;

use eventcast_core::cache::{KeySource, Payload};
use eventcast_core::source::{Aggregate, Aggregator, Result};

use crate::cache::RequestCache;

/// Default lifetime of an aggregate entry.
pub const AGGREGATE_TTL: Duration = Duration::from_secs(72 * 60 * 60);

/// What a read served.
#[derive(Debug)]
pub struct ReadOutcome<T> {
    pub aggregate: Aggregate<T>,
    /// True when `aggregate` came from the cache.
    pub from_cache: bool,
    /// The background refresh. Dropping it leaves the task running.
    pub refresh: Option<JoinHandle<()>>,
}

pub struct RefreshOrchestrator<A: Aggregator> {
    aggregator: Arc<A>,
    cache: RequestCache,
    ttl: Duration,
}

impl<A: Aggregator> Clone for RefreshOrchestrator<A> {
    fn clone(&self) -> Self {
        Self {
            aggregator: self.aggregator.clone(),
            cache: self.cache.clone(),
            ttl: self.ttl,
        }
    }
}

impl<A> RefreshOrchestrator<A>
where
    A: Aggregator + 'static,
{
    pub fn new(aggregator: Arc<A>, cache: RequestCache, ttl: Duration) -> Self {
        Self {
            aggregator,
            cache,
            ttl,
        }
    }

    pub async fn read(&self, filter: &A::Filter) -> Result<ReadOutcome<A::Item>> {
        let params = match serde_json::to_value(filter) {
            Ok(params) => params,
            Err(err) => {
                tracing::warn!(error = %err, "Filter not serializable, bypassing cache");
                let aggregate = self.aggregator.aggregate(filter).await?;
                return Ok(ReadOutcome {
                    aggregate,
                    from_cache: false,
                    refresh: None,
                });
            }
        };

        if let Some(aggregate) = self.cached(&params).await {
            return Ok(ReadOutcome {
                aggregate,
                from_cache: true,
                refresh: Some(self.spawn_refresh(filter.clone(), params)),
            });
        }

        let aggregate = self.aggregator.aggregate(filter).await?;
        store(&self.cache, &params, &aggregate, self.ttl).await;

        Ok(ReadOutcome {
            aggregate,
            from_cache: false,
            refresh: Some(self.spawn_refresh(filter.clone(), params)),
        })
    }

    async fn cached(&self, params: &Value) -> Option<Aggregate<A::Item>> {
        let cached = match self.cache.get(&KeySource::Params(params)).await {
            Ok(cached) => cached?,
            Err(err) => {
                tracing::warn!(error = %err, "Aggregate cache read failed");
                return None;
            }
        };

        match cached.json::<Vec<A::Item>>() {
            Ok(items) => Some(Aggregate::new(
                items,
                cached.last_modified.unwrap_or(DateTime::UNIX_EPOCH),
            )),
            Err(err) => {
                tracing::warn!(error = %err, "Cached aggregate unreadable, recomputing");
                None
            }
        }
    }

    fn spawn_refresh(&self, filter: A::Filter, params: Value) -> JoinHandle<()> {
        let aggregator = self.aggregator.clone();
        let cache = self.cache.clone();
        let ttl = self.ttl;

        tokio::spawn(async move {
            match aggregator.aggregate(&filter).await {
                Ok(aggregate) => {
                    store(&cache, &params, &aggregate, ttl).await;
                    tracing::debug!(count = aggregate.items.len(), "Refreshed aggregate");
                }
                Err(err) => {
                    tracing::warn!(error = %err, "Background refresh failed, keeping cached aggregate");
                }
            }
        })
    }
}

async fn store<T: serde::Serialize>(
    cache: &RequestCache,
    params: &Value,
    aggregate: &Aggregate<T>,
    ttl: Duration,
) {
    let items = match serde_json::to_value(&aggregate.items) {
        Ok(items) => items,
        Err(err) => {
            tracing::warn!(error = %err, "Aggregate not serializable");
            return;
        }
    };

    if let Err(err) = cache
        .set(
            &KeySource::Params(params),
            Payload::Json(&items),
            Some(aggregate.last_modified),
            ttl,
        )
        .await
    {
        tracing::warn!(error = %err, "Failed to cache aggregate");
    }
}
