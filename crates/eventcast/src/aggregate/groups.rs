use std::sync::Arc;

use async_trait::async_trait;

use eventcast_core::group::{Group, GroupFilter};
use eventcast_core::source::{merge_groups, Aggregate, Aggregator, GroupSource, Result};

/// Queries every group source in order; later sources win on duplicate keys.
pub struct GroupAggregator {
    sources: Vec<Arc<dyn GroupSource>>,
}

impl GroupAggregator {
    pub fn new(sources: Vec<Arc<dyn GroupSource>>) -> Self {
        Self { sources }
    }
}

#[async_trait]
impl Aggregator for GroupAggregator {
    type Filter = GroupFilter;
    type Item = Group;

    async fn aggregate(&self, filter: &GroupFilter) -> Result<Aggregate<Group>> {
        let mut batches = Vec::with_capacity(self.sources.len());
        for source in &self.sources {
            let batch = source.fetch_groups(filter).await.inspect_err(|err| {
                tracing::warn!(source = source.name(), error = %err, "Group source failed");
            })?;
            batches.push(batch);
        }
        Ok(merge_groups(batches, filter))
    }
}
