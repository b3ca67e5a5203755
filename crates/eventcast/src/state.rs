//! Shared application state.
//!
//! One cache store and one transport are built per process and injected into
//! every source, the rate gate and both refresh orchestrators.

use std::sync::Arc;

use chrono_tz::Tz;

use eventcast_core::cache::{
    Cache, EVENT_AGGREGATE_NAMESPACE, GROUP_AGGREGATE_NAMESPACE, PAGE_NAMESPACE,
};
use eventcast_core::source::{EventSource, GroupSource, HttpFetch};

use crate::aggregate::{EventAggregator, GroupAggregator, RefreshOrchestrator};
use crate::cache::{RateGate, RequestCache};
use crate::config::{Config, ConfigError};
use crate::sources::{
    ConnpassEventSource, ConnpassGroupSource, FeedGroupSource, IcalFeedSource, PacedFetcher,
    PaginatedClient,
};

/// Shared application state.
///
/// Cloned for each request handler.
#[derive(Clone)]
pub struct AppState {
    pub events: RefreshOrchestrator<EventAggregator>,
    pub groups: RefreshOrchestrator<GroupAggregator>,
    /// Half-width in days of the default `/events` window.
    pub recent_days: u64,
    /// Timezone that decides what "today" is.
    pub timezone: Tz,
}

impl AppState {
    /// Wires sources, aggregators and orchestrators from `config`.
    ///
    /// Event sources run in a fixed order: the region-scoped REST query, the
    /// series-scoped REST query, then feeds in configuration order. On
    /// duplicate uids the later source wins.
    pub fn from_config(
        config: &Config,
        store: Arc<dyn Cache>,
        http: Arc<dyn HttpFetch>,
    ) -> Result<Self, ConfigError> {
        let timezone = config.timezone()?;
        let gate = RateGate::new(store.clone());
        let pages = RequestCache::new(store.clone(), PAGE_NAMESPACE);
        let page_ttl = config.page_ttl();

        let rest = PaginatedClient::new(
            PacedFetcher::new(http.clone())
                .with_rate_gate(gate.clone(), config.rate_limit.rest_interval_secs),
        )
        .with_cache(pages.clone(), page_ttl);
        let feed_fetcher =
            PacedFetcher::new(http).with_rate_gate(gate, config.rate_limit.feed_interval_secs);

        let mut event_sources: Vec<Arc<dyn EventSource>> = Vec::new();
        if !config.scope.prefecture.is_empty() {
            event_sources.push(Arc::new(
                ConnpassEventSource::new("connpass-regions", rest.clone(), &config.upstream.events_url)
                    .with_regions(config.scope.prefecture.clone()),
            ));
        }
        if !config.scope.series_id.is_empty() {
            event_sources.push(Arc::new(
                ConnpassEventSource::new("connpass-series", rest.clone(), &config.upstream.events_url)
                    .with_series(config.scope.series_id.clone()),
            ));
        }
        for feed in &config.feeds {
            let source = IcalFeedSource::new(feed.to_ical_feed(timezone)?, feed_fetcher.clone())
                .with_cache(pages.clone(), page_ttl);
            event_sources.push(Arc::new(source));
        }

        let group_sources: Vec<Arc<dyn GroupSource>> = vec![
            Arc::new(ConnpassGroupSource::new(
                rest,
                &config.upstream.groups_url,
                config.scope.group_subdomains.clone(),
            )),
            Arc::new(FeedGroupSource::new(
                config.feeds.iter().map(|feed| feed.to_group()).collect(),
            )),
        ];

        tracing::info!(
            event_sources = event_sources.len(),
            feeds = config.feeds.len(),
            "Configured sources"
        );

        Ok(Self {
            events: RefreshOrchestrator::new(
                Arc::new(EventAggregator::new(event_sources)),
                RequestCache::new(store.clone(), EVENT_AGGREGATE_NAMESPACE),
                config.aggregate_ttl(),
            ),
            groups: RefreshOrchestrator::new(
                Arc::new(GroupAggregator::new(group_sources)),
                RequestCache::new(store, GROUP_AGGREGATE_NAMESPACE),
                config.aggregate_ttl(),
            ),
            recent_days: config.recent_days,
            timezone,
        })
    }
}
