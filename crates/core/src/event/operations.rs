use std::collections::HashMap;
use std::hash::Hash;

use chrono::{DateTime, FixedOffset, Utc};

use super::error::EventError;
use super::types::{Event, EventDetail, OpenStatus};

/// Removes duplicates by key. A later item replaces an earlier one with the
/// same key but keeps the earlier item's position.
pub fn distinct_by<T, K, F>(items: Vec<T>, key: F) -> Vec<T>
where
    K: Eq + Hash,
    F: Fn(&T) -> K,
{
    let mut positions: HashMap<K, usize> = HashMap::new();
    let mut distinct: Vec<T> = Vec::with_capacity(items.len());

    for item in items {
        let k = key(&item);
        if let Some(&index) = positions.get(&k) {
            distinct[index] = item;
        } else {
            positions.insert(k, distinct.len());
            distinct.push(item);
        }
    }

    distinct
}

/// Deduplicates events by uid, last one wins.
pub fn distinct_by_uid(events: Vec<EventDetail>) -> Vec<EventDetail> {
    distinct_by(events, |e| e.event.uid.clone())
}

/// Splits a keyword query on commas and whitespace (full-width included) and
/// lower-cases each token.
pub fn keyword_tokens(query: &str) -> Vec<String> {
    query
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|token| !token.is_empty())
        .map(str::to_lowercase)
        .collect()
}

/// True when every token appears in at least one searchable field.
pub fn matches_keywords(detail: &EventDetail, tokens: &[String]) -> bool {
    let event = &detail.event;
    let fields: Vec<String> = [
        Some(event.title.as_str()),
        event.catch.as_deref(),
        event.owner_name.as_deref(),
        event.place.as_deref(),
        event.address.as_deref(),
        event.group_name.as_deref(),
        detail.description.as_deref(),
    ]
    .into_iter()
    .map(|field| field.unwrap_or_default().to_lowercase())
    .collect();

    tokens
        .iter()
        .all(|token| fields.iter().any(|field| field.contains(token.as_str())))
}

/// Keeps the events matching `query`. `None` keeps everything.
pub fn filter_by_keyword(events: Vec<EventDetail>, query: Option<&str>) -> Vec<EventDetail> {
    let Some(query) = query else {
        return events;
    };
    let tokens = keyword_tokens(query);
    events
        .into_iter()
        .filter(|event| matches_keywords(event, &tokens))
        .collect()
}

/// Sorts ascending by start instant; equal starts keep their order.
pub fn sort_by_start(events: &mut [EventDetail]) {
    events.sort_by(|a, b| a.event.started_at.cmp(&b.event.started_at));
}

/// Derives the registration status from `now`.
pub fn open_status_at(
    started_at: DateTime<FixedOffset>,
    ended_at: DateTime<FixedOffset>,
    now: DateTime<Utc>,
) -> OpenStatus {
    let now = now.fixed_offset();
    if started_at > now {
        OpenStatus::Preopen
    } else if ended_at > now {
        OpenStatus::Open
    } else {
        OpenStatus::Close
    }
}

/// Checks the start date against year-month (`YYYYMM`) and exact-date
/// (`YYYYMMDD`) buckets. No buckets means no restriction.
pub fn in_date_buckets(started_at: DateTime<FixedOffset>, ym: &[String], ymd: &[String]) -> bool {
    if ym.is_empty() && ymd.is_empty() {
        return true;
    }
    let date = started_at.format("%Y%m%d").to_string();
    ym.iter().any(|bucket| date.starts_with(bucket.as_str()))
        || ymd.iter().any(|bucket| date.starts_with(bucket.as_str()))
}

/// True when the address contains any of the region strings.
pub fn in_regions(address: Option<&str>, regions: &[String]) -> bool {
    let Some(address) = address else {
        return false;
    };
    regions.iter().any(|region| address.contains(region.as_str()))
}

/// Rejects events whose mandatory display fields are empty.
pub fn validate_event(event: &Event) -> Result<(), EventError> {
    if event.uid.trim().is_empty() {
        return Err(EventError::MissingField("uid"));
    }
    if event.title.trim().is_empty() {
        return Err(EventError::MissingField("title"));
    }
    if event.event_url.trim().is_empty() {
        return Err(EventError::MissingField("event_url"));
    }
    Ok(())
}

/// Parses an upstream ISO-8601 timestamp.
pub fn parse_timestamp(
    field: &'static str,
    value: Option<&str>,
) -> Result<DateTime<FixedOffset>, EventError> {
    let value = value.ok_or(EventError::MissingField(field))?;
    DateTime::parse_from_rfc3339(value).map_err(|_| EventError::InvalidTimestamp {
        field,
        value: value.to_string(),
    })
}
