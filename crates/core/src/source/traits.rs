use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};

use crate::event::{EventDetail, EventFilter};
use crate::group::{Group, GroupFilter};

use super::{Aggregate, HttpResponse, Result, SourceBatch};

/// Transport seam for upstream GET requests.
#[async_trait]
pub trait HttpFetch: Send + Sync {
    /// Issues a GET with the given query pairs. Non-2xx statuses are returned,
    /// not raised; only transport failures are errors.
    async fn get(&self, url: &str, query: &[(String, String)]) -> Result<HttpResponse>;
}

/// An upstream that yields events for a filter.
#[async_trait]
pub trait EventSource: Send + Sync {
    /// Name used in logs.
    fn name(&self) -> &str;

    async fn fetch_events(&self, filter: &EventFilter) -> Result<SourceBatch<EventDetail>>;
}

/// An upstream that yields groups.
#[async_trait]
pub trait GroupSource: Send + Sync {
    /// Name used in logs.
    fn name(&self) -> &str;

    async fn fetch_groups(&self, filter: &GroupFilter) -> Result<SourceBatch<Group>>;
}

/// Fans a filter out to its sources and merges the results.
#[async_trait]
pub trait Aggregator: Send + Sync {
    /// Filter type; its serialized form keys the aggregate-level cache.
    type Filter: Serialize + Clone + Send + Sync + 'static;
    /// Item type stored in the aggregate-level cache.
    type Item: Serialize + DeserializeOwned + Send + Sync + 'static;

    async fn aggregate(&self, filter: &Self::Filter) -> Result<Aggregate<Self::Item>>;
}
