use std::{env, path::Path, time::Duration};

use chrono_tz::Tz;
use serde::{Deserialize, Deserializer};
use thiserror::Error;

use eventcast_core::group::Group;

use crate::aggregate::AGGREGATE_TTL;
use crate::sources::IcalFeed;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Invalid configuration: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("Unknown timezone: {0}")]
    Timezone(String),
}

/// Application configuration: a YAML document plus environment overrides.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub metadata: Metadata,
    /// Half-width in days of the window served by `/events` (default: 90)
    #[serde(default = "default_recent_days")]
    pub recent_days: u64,
    #[serde(default)]
    pub api_client: ApiClient,
    #[serde(default)]
    pub scope: Scope,
    #[serde(default)]
    pub feeds: Vec<FeedConfig>,
    #[serde(default)]
    pub upstream: Upstream,
    #[serde(default)]
    pub cache: CacheSettings,
    #[serde(default)]
    pub rate_limit: RateLimit,
    /// IANA name used for feeds without their own timezone (default: "Asia/Tokyo")
    #[serde(default = "default_timezone")]
    pub default_timezone: String,
    /// Redis connection URL, from `REDIS_URL` only.
    #[serde(skip)]
    pub redis_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Metadata {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub version: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiClient {
    /// User-Agent template; `{version}` becomes `metadata.version`.
    pub user_agent: Option<String>,
}

/// Which REST records to pull.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Scope {
    /// Region strings matched against event addresses.
    #[serde(default, deserialize_with = "deserialize_string_list")]
    pub prefecture: Vec<String>,
    #[serde(default, deserialize_with = "deserialize_string_list")]
    pub series_id: Vec<String>,
    #[serde(default, deserialize_with = "deserialize_string_list")]
    pub group_subdomains: Vec<String>,
}

/// A calendar feed and the group it represents.
#[derive(Debug, Clone, Deserialize)]
pub struct FeedConfig {
    pub key: String,
    pub name: String,
    pub url: Option<String>,
    pub feed_url: String,
    pub image_url: Option<String>,
    pub subtitle: Option<String>,
    pub description: Option<String>,
    pub timezone: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Upstream {
    pub events_url: String,
    pub groups_url: String,
}

impl Default for Upstream {
    fn default() -> Self {
        Self {
            events_url: "https://connpass.com/api/v1/event/".to_string(),
            groups_url: "https://connpass.com/api/v1/group/".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    /// Per-page and per-feed TTL in seconds (default: 3600)
    pub page_ttl_secs: u64,
    /// Aggregate TTL in seconds (default: 259200, 72 hours)
    pub aggregate_ttl_secs: u64,
    /// Maximum number of in-memory cache entries (default: 10,000)
    pub max_entries: usize,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            page_ttl_secs: 3600,
            aggregate_ttl_secs: AGGREGATE_TTL.as_secs(),
            max_entries: 10_000,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RateLimit {
    /// Seconds the gate stays closed around REST calls (default: 5)
    pub rest_interval_secs: u64,
    /// Seconds the gate stays closed around feed downloads (default: 1)
    pub feed_interval_secs: u64,
}

impl Default for RateLimit {
    fn default() -> Self {
        Self {
            rest_interval_secs: 5,
            feed_interval_secs: 1,
        }
    }
}

fn default_recent_days() -> u64 {
    90
}

fn default_timezone() -> String {
    "Asia/Tokyo".to_string()
}

/// Accepts a list of strings and integers, or a single comma-separated string.
fn deserialize_string_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Scalar {
        Int(i64),
        Str(String),
    }

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        Many(Vec<Scalar>),
        One(String),
    }

    let items = match Option::<OneOrMany>::deserialize(deserializer)? {
        None => Vec::new(),
        Some(OneOrMany::One(joined)) => joined.split(',').map(|s| s.trim().to_string()).collect(),
        Some(OneOrMany::Many(items)) => items
            .into_iter()
            .map(|item| match item {
                Scalar::Int(n) => n.to_string(),
                Scalar::Str(s) => s.trim().to_string(),
            })
            .collect(),
    };
    Ok(items.into_iter().filter(|s| !s.is_empty()).collect())
}

impl Config {
    /// Reads the YAML file at `path`, then applies environment overrides.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let mut config = Self::from_yaml(&raw)?;
        config.apply_env();
        Ok(config)
    }

    pub fn from_yaml(raw: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(raw)?)
    }

    /// Environment variables:
    /// - `REDIS_URL` - Redis connection URL
    /// - `CACHE_MAX_ENTRIES` - Maximum in-memory cache entries
    /// - `RECENT_DAYS` - Window served by `/events`
    ///
    /// Unparsable values are ignored.
    pub fn apply_env(&mut self) {
        if let Ok(url) = env::var("REDIS_URL") {
            self.redis_url = Some(url);
        }
        if let Some(max_entries) = env::var("CACHE_MAX_ENTRIES")
            .ok()
            .and_then(|v| v.parse().ok())
        {
            self.cache.max_entries = max_entries;
        }
        if let Some(days) = env::var("RECENT_DAYS").ok().and_then(|v| v.parse().ok()) {
            self.recent_days = days;
        }
    }

    /// The User-Agent sent upstream, with `{version}` filled in.
    pub fn user_agent(&self) -> Option<String> {
        self.api_client
            .user_agent
            .as_ref()
            .map(|template| template.replace("{version}", &self.metadata.version))
    }

    pub fn timezone(&self) -> Result<Tz, ConfigError> {
        parse_timezone(&self.default_timezone)
    }

    pub fn page_ttl(&self) -> Duration {
        Duration::from_secs(self.cache.page_ttl_secs)
    }

    pub fn aggregate_ttl(&self) -> Duration {
        Duration::from_secs(self.cache.aggregate_ttl_secs)
    }
}

impl FeedConfig {
    /// Source settings for this feed, falling back to `default_timezone`.
    pub fn to_ical_feed(&self, default_timezone: Tz) -> Result<IcalFeed, ConfigError> {
        let timezone = match &self.timezone {
            Some(name) => parse_timezone(name)?,
            None => default_timezone,
        };
        Ok(IcalFeed {
            key: self.key.clone(),
            name: self.name.clone(),
            group_url: self.url.clone(),
            feed_url: self.feed_url.clone(),
            timezone,
        })
    }

    pub fn to_group(&self) -> Group {
        Group {
            key: self.key.clone(),
            title: self.name.clone(),
            subtitle: self.subtitle.clone(),
            url: self.url.clone(),
            website_url: None,
            twitter_url: None,
            facebook_url: None,
            image_url: self.image_url.clone(),
            description: self.description.clone(),
            member_count: None,
            feed_url: Some(self.feed_url.clone()),
        }
    }
}

fn parse_timezone(name: &str) -> Result<Tz, ConfigError> {
    name.parse()
        .map_err(|_| ConfigError::Timezone(name.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const YAML: &str = r#"
metadata:
  title: Yamanashi Events
  description: Community events around Yamanashi
  version: 1.2.0
recent_days: 30
api_client:
  user_agent: eventcast/{version} (+https://example.com)
scope:
  prefecture:
    - Yamanashi
    - 山梨
  series_id: [42, "77"]
  group_subdomains: kofurs, yamanashi-js
feeds:
  - key: kofurs
    name: Kofu.rs
    url: https://kofurs.example.com/
    feed_url: https://kofurs.example.com/events.ics
  - key: nyc
    name: NYC Rust
    feed_url: https://nyc.example.com/events.ics
    timezone: America/New_York
rate_limit:
  rest_interval_secs: 3
"#;

    #[test]
    fn test_parse_full_document() {
        let config = Config::from_yaml(YAML).unwrap();

        assert_eq!(config.metadata.title, "Yamanashi Events");
        assert_eq!(config.recent_days, 30);
        assert_eq!(config.scope.prefecture, vec!["Yamanashi", "山梨"]);
        assert_eq!(config.scope.series_id, vec!["42", "77"]);
        assert_eq!(config.scope.group_subdomains, vec!["kofurs", "yamanashi-js"]);
        assert_eq!(config.feeds.len(), 2);
        assert_eq!(config.rate_limit.rest_interval_secs, 3);
        assert_eq!(config.rate_limit.feed_interval_secs, 1);
        assert_eq!(config.upstream.events_url, "https://connpass.com/api/v1/event/");
    }

    #[test]
    fn test_defaults_for_minimal_document() {
        let config = Config::from_yaml("metadata: {title: t, version: '0.1'}").unwrap();

        assert_eq!(config.recent_days, 90);
        assert_eq!(config.cache.page_ttl_secs, 3600);
        assert_eq!(config.aggregate_ttl(), Duration::from_secs(259_200));
        assert_eq!(config.cache.max_entries, 10_000);
        assert_eq!(config.timezone().unwrap(), chrono_tz::Asia::Tokyo);
        assert_eq!(config.user_agent(), None);
        assert!(config.scope.prefecture.is_empty());
    }

    #[test]
    fn test_user_agent_template() {
        let config = Config::from_yaml(YAML).unwrap();
        assert_eq!(
            config.user_agent().as_deref(),
            Some("eventcast/1.2.0 (+https://example.com)")
        );
    }

    #[test]
    fn test_feed_conversion() {
        let config = Config::from_yaml(YAML).unwrap();
        let default = config.timezone().unwrap();

        let kofurs = config.feeds[0].to_ical_feed(default).unwrap();
        assert_eq!(kofurs.timezone, chrono_tz::Asia::Tokyo);
        assert_eq!(kofurs.group_url.as_deref(), Some("https://kofurs.example.com/"));

        let nyc = config.feeds[1].to_ical_feed(default).unwrap();
        assert_eq!(nyc.timezone, chrono_tz::America::New_York);

        let group = config.feeds[0].to_group();
        assert_eq!(group.key, "kofurs");
        assert_eq!(group.title, "Kofu.rs");
        assert_eq!(group.feed_url.as_deref(), Some("https://kofurs.example.com/events.ics"));
    }

    #[test]
    fn test_unknown_timezone_is_rejected() {
        let mut config = Config::from_yaml(YAML).unwrap();
        config.default_timezone = "Mars/Olympus".to_string();
        assert!(matches!(config.timezone(), Err(ConfigError::Timezone(_))));
    }

    #[test]
    fn test_missing_metadata_is_an_error() {
        assert!(matches!(
            Config::from_yaml("recent_days: 10"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_missing_file() {
        let result = Config::load(Path::new("/nonexistent/eventcast.yaml"));
        assert!(matches!(result, Err(ConfigError::Read { .. })));
    }
}
