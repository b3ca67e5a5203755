//! Group lookups: the REST groups endpoint and groups defined by configured
//! feeds.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Map, Value};

use eventcast_core::group::{Group, GroupFilter};
use eventcast_core::serde::deserialize_optional_string;
use eventcast_core::source::{GroupSource, Result, SourceBatch};

use super::paginated::{Page, PaginatedClient};

#[derive(Debug, Deserialize)]
pub struct GroupPage {
    pub results_returned: u64,
    #[serde(default)]
    pub groups: Vec<ConnpassGroup>,
}

impl Page for GroupPage {
    fn results_returned(&self) -> u64 {
        self.results_returned
    }
}

/// A group record as the upstream sends it.
#[derive(Debug, Clone, Deserialize)]
pub struct ConnpassGroup {
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub subdomain: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub sub_title: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub url: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub website_url: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub twitter_username: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub facebook_url: Option<String>,
    #[serde(default, deserialize_with = "deserialize_optional_string")]
    pub image_url: Option<String>,
    pub member_users_count: Option<u32>,
}

impl ConnpassGroup {
    /// `None` when the record has no subdomain or title.
    pub fn into_group(self) -> Option<Group> {
        Some(Group {
            key: self.subdomain?,
            title: self.title?,
            subtitle: self.sub_title,
            url: self.url,
            website_url: self.website_url,
            twitter_url: self
                .twitter_username
                .map(|name| format!("https://twitter.com/{name}")),
            facebook_url: self.facebook_url,
            image_url: self.image_url,
            description: self.description,
            member_count: self.member_users_count,
            feed_url: None,
        })
    }
}

/// Groups looked up by subdomain on the REST endpoint.
pub struct ConnpassGroupSource {
    client: PaginatedClient,
    url: String,
    subdomains: Vec<String>,
}

impl ConnpassGroupSource {
    pub fn new(client: PaginatedClient, url: impl Into<String>, subdomains: Vec<String>) -> Self {
        Self {
            client,
            url: url.into(),
            subdomains,
        }
    }
}

#[async_trait]
impl GroupSource for ConnpassGroupSource {
    fn name(&self) -> &str {
        "connpass-groups"
    }

    async fn fetch_groups(&self, _filter: &GroupFilter) -> Result<SourceBatch<Group>> {
        if self.subdomains.is_empty() {
            return Ok(SourceBatch::empty());
        }

        let mut query = Map::new();
        query.insert("subdomain".to_string(), Value::from(self.subdomains.join(",")));

        let result = self.client.fetch_all::<GroupPage>(&self.url, &query).await?;
        let groups: Vec<Group> = result
            .pages
            .into_iter()
            .flat_map(|page| page.groups)
            .filter_map(|raw| {
                let group = raw.into_group();
                if group.is_none() {
                    tracing::warn!(source = self.name(), "Skipping group without key or title");
                }
                group
            })
            .collect();

        tracing::debug!(source = self.name(), count = groups.len(), "Fetched groups");
        Ok(SourceBatch::new(groups, result.last_modified))
    }
}

/// Groups that exist only as configured calendar feeds.
pub struct FeedGroupSource {
    groups: Vec<Group>,
}

impl FeedGroupSource {
    pub fn new(groups: Vec<Group>) -> Self {
        Self { groups }
    }
}

#[async_trait]
impl GroupSource for FeedGroupSource {
    fn name(&self) -> &str {
        "feeds"
    }

    async fn fetch_groups(&self, _filter: &GroupFilter) -> Result<SourceBatch<Group>> {
        Ok(SourceBatch::new(self.groups.clone(), None))
    }
}
