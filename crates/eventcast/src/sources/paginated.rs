//! Page-by-page reads from a paginated REST upstream with a per-page cache.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use eventcast_core::cache::{KeySource, Payload};
use eventcast_core::source::{Result, SourceError};

use crate::cache::RequestCache;

use super::http::PacedFetcher;

/// Records requested per page.
pub const PAGE_SIZE: u64 = 100;

/// Hard stop for upstreams that keep returning full pages.
pub const MAX_PAGES: u64 = 100;

/// A decoded page that reports how many records it carries.
pub trait Page: DeserializeOwned + Send {
    fn results_returned(&self) -> u64;
}

/// Everything a paginated read produced.
#[derive(Debug)]
pub struct Pages<P> {
    pub pages: Vec<P>,
    /// Latest provenance across pages; `None` when no page had one.
    pub last_modified: Option<DateTime<Utc>>,
}

#[derive(Clone)]
pub struct PaginatedClient {
    fetcher: PacedFetcher,
    cache: Option<RequestCache>,
    page_ttl: Duration,
}

impl PaginatedClient {
    pub fn new(fetcher: PacedFetcher) -> Self {
        Self {
            fetcher,
            cache: None,
            page_ttl: Duration::from_secs(3600),
        }
    }

    pub fn with_cache(mut self, cache: RequestCache, page_ttl: Duration) -> Self {
        self.cache = Some(cache);
        self.page_ttl = page_ttl;
        self
    }

    /// Reads pages of `url` in order until one comes back short.
    ///
    /// `params` is the base query; `count` and `start` are added per page.
    pub async fn fetch_all<P: Page>(&self, url: &str, params: &Map<String, Value>) -> Result<Pages<P>> {
        let mut query = params.clone();
        query.insert("count".to_string(), Value::from(PAGE_SIZE));

        let mut pages = Vec::new();
        let mut last_modified = None;

        for page in 0..MAX_PAGES {
            query.insert("start".to_string(), Value::from(page * PAGE_SIZE + 1));

            let (body, fetched_at) = self.fetch_page::<P>(url, &query).await?;
            last_modified = last_modified.max(fetched_at);

            let returned = body.results_returned();
            pages.push(body);

            if returned < PAGE_SIZE {
                return Ok(Pages {
                    pages,
                    last_modified,
                });
            }
        }

        tracing::warn!(url, pages = MAX_PAGES, "Stopped paging at the page limit");
        Ok(Pages {
            pages,
            last_modified,
        })
    }

    async fn fetch_page<P: Page>(
        &self,
        url: &str,
        query: &Map<String, Value>,
    ) -> Result<(P, Option<DateTime<Utc>>)> {
        let key_params = Value::Object(query.clone());
        let key = KeySource::Params(&key_params);

        if let Some(cache) = &self.cache {
            match cache.get(&key).await {
                Ok(Some(cached)) => match cached.json::<P>() {
                    Ok(page) => return Ok((page, cached.last_modified)),
                    Err(err) => {
                        tracing::warn!(url, error = %err, "Cached page unreadable, refetching")
                    }
                },
                Ok(None) => {}
                Err(err) => tracing::warn!(url, error = %err, "Page cache read failed"),
            }
        }

        let body = self.fetcher.get(url, &query_pairs(query)).await?;
        let value: Value =
            serde_json::from_str(&body).map_err(|e| SourceError::InvalidResponse(e.to_string()))?;
        let page = P::deserialize(&value).map_err(|e| SourceError::InvalidResponse(e.to_string()))?;
        let fetched_at = Utc::now();

        if let Some(cache) = &self.cache {
            if let Err(err) = cache
                .set(&key, Payload::Json(&value), Some(fetched_at), self.page_ttl)
                .await
            {
                tracing::warn!(url, error = %err, "Failed to cache page");
            }
        }

        Ok((page, Some(fetched_at)))
    }
}

/// Renders query parameters as URL pairs. Strings go out unquoted.
pub fn query_pairs(params: &Map<String, Value>) -> Vec<(String, String)> {
    params
        .iter()
        .map(|(key, value)| {
            let value = match value {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            (key.clone(), value)
        })
        .collect()
}
