use serde::{Deserialize, Serialize};

/// A community or organizer that events belong to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub key: String,
    pub title: String,
    pub subtitle: Option<String>,
    pub url: Option<String>,
    pub website_url: Option<String>,
    pub twitter_url: Option<String>,
    pub facebook_url: Option<String>,
    pub image_url: Option<String>,
    pub description: Option<String>,
    pub member_count: Option<u32>,
    /// Calendar feed the group's events are sourced from, for groups defined
    /// in configuration.
    pub feed_url: Option<String>,
}

/// Query constraints for a group read.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct GroupFilter {
    #[serde(skip_serializing_if = "Option::is_none")]
    key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    keyword: Option<String>,
}

impl GroupFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn by_key(key: impl Into<String>) -> Self {
        Self {
            key: Some(key.into()),
            keyword: None,
        }
    }

    /// Attaches a keyword query. Blank queries are ignored.
    pub fn with_keyword(mut self, keyword: Option<&str>) -> Self {
        self.keyword = keyword
            .map(str::trim)
            .filter(|k| !k.is_empty())
            .map(str::to_string);
        self
    }

    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    pub fn keyword(&self) -> Option<&str> {
        self.keyword.as_deref()
    }
}
