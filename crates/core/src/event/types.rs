use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// Registration status of an event relative to the current time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OpenStatus {
    Preopen,
    Open,
    Close,
}

/// Summary view of an event, normalized across every upstream.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Provider-qualified identity, unique within an aggregate.
    pub uid: String,
    /// Provider-local integer id, only for sources that have one.
    pub event_id: Option<i64>,
    pub title: String,
    pub catch: Option<String>,
    pub hash_tag: Option<String>,
    pub event_url: String,
    pub started_at: DateTime<FixedOffset>,
    pub ended_at: DateTime<FixedOffset>,
    pub updated_at: DateTime<FixedOffset>,
    pub open_status: OpenStatus,
    pub limit: Option<u32>,
    pub accepted: Option<u32>,
    pub waiting: Option<u32>,
    pub owner_name: Option<String>,
    pub place: Option<String>,
    pub address: Option<String>,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub group_key: Option<String>,
    pub group_name: Option<String>,
    pub group_url: Option<String>,
}

/// Detail view: the summary plus the free-text description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventDetail {
    #[serde(flatten)]
    pub event: Event,
    pub description: Option<String>,
}

impl EventDetail {
    pub fn uid(&self) -> &str {
        &self.event.uid
    }

    /// Drops the description.
    pub fn into_summary(self) -> Event {
        self.event
    }
}
