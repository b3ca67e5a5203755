use std::sync::Arc;

use async_trait::async_trait;

use eventcast_core::event::{EventDetail, EventFilter};
use eventcast_core::source::{merge_events, Aggregate, Aggregator, EventSource, Result};

/// Queries every event source in configuration order and merges the batches.
///
/// When two sources return the same uid, the one configured later wins.
pub struct EventAggregator {
    sources: Vec<Arc<dyn EventSource>>,
}

impl EventAggregator {
    pub fn new(sources: Vec<Arc<dyn EventSource>>) -> Self {
        Self { sources }
    }
}

#[async_trait]
impl Aggregator for EventAggregator {
    type Filter = EventFilter;
    type Item = EventDetail;

    async fn aggregate(&self, filter: &EventFilter) -> Result<Aggregate<EventDetail>> {
        let mut batches = Vec::with_capacity(self.sources.len());

        for source in &self.sources {
            let batch = source.fetch_events(filter).await.inspect_err(|err| {
                tracing::warn!(source = source.name(), error = %err, "Event source failed");
            })?;
            tracing::debug!(source = source.name(), count = batch.items.len(), "Source returned events");
            batches.push(batch);
        }

        let aggregate = merge_events(batches, filter.keyword());
        tracing::debug!(count = aggregate.items.len(), "Aggregated events");
        Ok(aggregate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};
    use serde_json::json;

    use eventcast_core::event::{Event, OpenStatus};
    use eventcast_core::source::{HttpResponse, SourceBatch, SourceError};

    use crate::sources::{ConnpassEventSource, PacedFetcher, PaginatedClient};
    use crate::test_support::{connpass_event, connpass_page, FakeFetcher};

    struct StaticSource {
        name: &'static str,
        result: Result<SourceBatch<EventDetail>>,
    }

    #[async_trait]
    impl EventSource for StaticSource {
        fn name(&self) -> &str {
            self.name
        }

        async fn fetch_events(&self, _filter: &EventFilter) -> Result<SourceBatch<EventDetail>> {
            self.result.clone()
        }
    }

    fn detail(uid: &str, title: &str, day: u32) -> EventDetail {
        let start = DateTime::parse_from_rfc3339(&format!("2024-01-{day:02}T19:00:00+09:00")).unwrap();
        EventDetail {
            event: Event {
                uid: uid.to_string(),
                event_id: None,
                title: title.to_string(),
                catch: None,
                hash_tag: None,
                event_url: format!("https://example.com/{uid}"),
                started_at: start,
                ended_at: start,
                updated_at: start,
                open_status: OpenStatus::Close,
                limit: None,
                accepted: None,
                waiting: None,
                owner_name: None,
                place: None,
                address: None,
                lat: None,
                lon: None,
                group_key: None,
                group_name: None,
                group_url: None,
            },
            description: None,
        }
    }

    fn source(name: &'static str, items: Vec<EventDetail>, day: Option<u32>) -> Arc<dyn EventSource> {
        let last_modified = day.map(|d| Utc.with_ymd_and_hms(2024, 2, d, 0, 0, 0).unwrap());
        Arc::new(StaticSource {
            name,
            result: Ok(SourceBatch::new(items, last_modified)),
        })
    }

    #[tokio::test]
    async fn test_later_source_wins_on_duplicate_uid() {
        let aggregator = EventAggregator::new(vec![
            source("regions", vec![detail("1@x", "From regions", 5)], Some(1)),
            source("series", vec![detail("1@x", "From series", 5)], Some(2)),
        ]);

        let aggregate = aggregator
            .aggregate(&EventFilter::month(2024, 1).unwrap())
            .await
            .unwrap();

        assert_eq!(aggregate.items.len(), 1);
        assert_eq!(aggregate.items[0].event.title, "From series");
        assert_eq!(
            aggregate.last_modified,
            Utc.with_ymd_and_hms(2024, 2, 2, 0, 0, 0).unwrap()
        );
    }

    #[tokio::test]
    async fn test_swapping_source_order_swaps_the_winner() {
        let aggregator = EventAggregator::new(vec![
            source("series", vec![detail("1@x", "From series", 5)], None),
            source("regions", vec![detail("1@x", "From regions", 5)], None),
        ]);

        let aggregate = aggregator
            .aggregate(&EventFilter::month(2024, 1).unwrap())
            .await
            .unwrap();

        assert_eq!(aggregate.items[0].event.title, "From regions");
        assert!(!aggregate.has_provenance());
    }

    #[tokio::test]
    async fn test_no_sources_yields_epoch() {
        let aggregate = EventAggregator::new(vec![])
            .aggregate(&EventFilter::month(2024, 1).unwrap())
            .await
            .unwrap();

        assert!(aggregate.items.is_empty());
        assert_eq!(aggregate.last_modified, DateTime::UNIX_EPOCH);
    }

    #[tokio::test]
    async fn test_any_failing_source_aborts() {
        let failing: Arc<dyn EventSource> = Arc::new(StaticSource {
            name: "broken",
            result: Err(SourceError::Upstream {
                status: 503,
                message: "Service Unavailable".to_string(),
            }),
        });
        let aggregator = EventAggregator::new(vec![
            source("ok", vec![detail("1@x", "Fine", 5)], Some(1)),
            failing,
        ]);

        let result = aggregator.aggregate(&EventFilter::month(2024, 1).unwrap()).await;

        assert!(matches!(result, Err(SourceError::Upstream { status: 503, .. })));
    }

    #[tokio::test]
    async fn test_keyword_requires_every_token() {
        let mut with_catch = detail("1@x", "Rust Event", 3);
        with_catch.event.catch = Some("Catch phrase".to_string());
        let aggregator = EventAggregator::new(vec![source(
            "ok",
            vec![with_catch, detail("2@x", "Event only", 4)],
            None,
        )]);

        let both = aggregator
            .aggregate(&EventFilter::month(2024, 1).unwrap().with_keyword(Some("Event,Catch")))
            .await
            .unwrap();
        assert_eq!(both.items.len(), 1);
        assert_eq!(both.items[0].uid(), "1@x");

        let none = aggregator
            .aggregate(&EventFilter::month(2024, 1).unwrap().with_keyword(Some("Event,Dummy")))
            .await
            .unwrap();
        assert!(none.items.is_empty());
    }

    #[tokio::test]
    async fn test_two_pages_from_one_source_are_merged_and_sorted() {
        let http = FakeFetcher::new(|call| {
            let start: i64 = call.param("start").unwrap().parse().unwrap();
            let count = if start == 1 { 100 } else { 30 };
            // Later ids start earlier in the month.
            let events = (start..start + count)
                .map(|id| connpass_event(id, 28 - (id % 28) as u32, "Meetup"))
                .collect();
            HttpResponse::new(200, connpass_page(events))
        });
        let client = PaginatedClient::new(PacedFetcher::new(http.clone()));
        let connpass: Arc<dyn EventSource> = Arc::new(ConnpassEventSource::new(
            "connpass",
            client,
            "https://connpass.example/api/v1/event/",
        ));

        let aggregate = EventAggregator::new(vec![connpass])
            .aggregate(&EventFilter::month(2024, 1).unwrap())
            .await
            .unwrap();

        assert_eq!(aggregate.items.len(), 130);
        assert_eq!(http.call_count(), 2);
        assert!(aggregate
            .items
            .windows(2)
            .all(|pair| pair[0].event.started_at <= pair[1].event.started_at));
        assert!(aggregate.has_provenance());
        assert_eq!(serde_json::to_value(&aggregate.items[0]).unwrap()["lat"], json!(35.6622));
    }
}
