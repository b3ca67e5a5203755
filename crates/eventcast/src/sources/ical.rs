//! iCalendar feed source.
//!
//! One document per feed, cached under the feed URL. Every VEVENT becomes an
//! event attributed to the feed's group. Date values are normalized to the
//! feed's timezone.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, TimeZone, Utc};
use chrono_tz::Tz;
use icalendar::{
    parser::{read_calendar, unfold, Component},
    CalendarDateTime, DatePerhapsTime,
};

use eventcast_core::cache::{KeySource, Payload};
use eventcast_core::event::{
    in_date_buckets, open_status_at, validate_event, Event, EventDetail, EventError, EventFilter,
};
use eventcast_core::source::{EventSource, Result, SourceBatch, SourceError};

use crate::cache::RequestCache;

use super::http::PacedFetcher;

/// Display metadata and location of one feed.
#[derive(Debug, Clone)]
pub struct IcalFeed {
    pub key: String,
    pub name: String,
    pub group_url: Option<String>,
    pub feed_url: String,
    pub timezone: Tz,
}

pub struct IcalFeedSource {
    feed: IcalFeed,
    fetcher: PacedFetcher,
    cache: Option<RequestCache>,
    ttl: Duration,
}

impl IcalFeedSource {
    pub fn new(feed: IcalFeed, fetcher: PacedFetcher) -> Self {
        Self {
            feed,
            fetcher,
            cache: None,
            ttl: Duration::from_secs(3600),
        }
    }

    pub fn with_cache(mut self, cache: RequestCache, ttl: Duration) -> Self {
        self.cache = Some(cache);
        self.ttl = ttl;
        self
    }

    /// The feed document and the time it was fetched.
    async fn document(&self) -> Result<(String, Option<DateTime<Utc>>)> {
        let key = KeySource::Raw(&self.feed.feed_url);

        if let Some(cache) = &self.cache {
            match cache.get(&key).await {
                Ok(Some(cached)) => return Ok((cached.content, cached.last_modified)),
                Ok(None) => {}
                Err(err) => {
                    tracing::warn!(feed = %self.feed.key, error = %err, "Feed cache read failed")
                }
            }
        }

        let body = self.fetcher.get(&self.feed.feed_url, &[]).await?;
        let fetched_at = Utc::now();

        if let Some(cache) = &self.cache {
            if let Err(err) = cache
                .set(&key, Payload::Text(&body), Some(fetched_at), self.ttl)
                .await
            {
                tracing::warn!(feed = %self.feed.key, error = %err, "Failed to cache feed");
            }
        }

        Ok((body, Some(fetched_at)))
    }
}

#[async_trait]
impl EventSource for IcalFeedSource {
    fn name(&self) -> &str {
        &self.feed.key
    }

    async fn fetch_events(&self, filter: &EventFilter) -> Result<SourceBatch<EventDetail>> {
        // Feed events have no provider-local id.
        if filter.event_id().is_some() {
            return Ok(SourceBatch::empty());
        }

        let (document, fetched_at) = self.document().await?;
        let events: Vec<EventDetail> = parse_feed(&document, &self.feed, Utc::now())?
            .into_iter()
            .filter(|detail| in_date_buckets(detail.event.started_at, filter.ym(), filter.ymd()))
            .collect();

        tracing::debug!(feed = %self.feed.key, count = events.len(), "Parsed feed events");
        Ok(SourceBatch::new(events, fetched_at))
    }
}

/// Parses every VEVENT in `document`. Events missing a required property are
/// skipped.
pub fn parse_feed(document: &str, feed: &IcalFeed, now: DateTime<Utc>) -> Result<Vec<EventDetail>> {
    let unfolded = unfold(document);
    let calendar =
        read_calendar(&unfolded).map_err(|e| SourceError::InvalidResponse(e.to_string()))?;

    Ok(calendar
        .components
        .iter()
        .filter(|component| component.name == "VEVENT")
        .filter_map(|vevent| match to_detail(vevent, feed, now) {
            Ok(detail) => Some(detail),
            Err(err) => {
                tracing::warn!(feed = %feed.key, error = %err, "Skipping feed event");
                None
            }
        })
        .collect())
}

fn to_detail(
    vevent: &Component<'_>,
    feed: &IcalFeed,
    now: DateTime<Utc>,
) -> std::result::Result<EventDetail, EventError> {
    let text = |name: &str| {
        vevent
            .find_prop(name)
            .map(|p| unescape_text(p.val.as_ref()))
            .filter(|value| !value.trim().is_empty())
    };
    let timestamp = |name: &'static str| date_property(vevent, name, feed.timezone);

    let started_at = timestamp("DTSTART")?.ok_or(EventError::MissingField("started_at"))?;
    let ended_at = timestamp("DTEND")?.unwrap_or(started_at);
    let updated_at = match timestamp("LAST-MODIFIED")? {
        Some(updated) => updated,
        None => timestamp("DTSTAMP")?.ok_or(EventError::MissingField("updated_at"))?,
    };

    let event = Event {
        uid: text("UID").ok_or(EventError::MissingField("uid"))?,
        event_id: None,
        title: text("SUMMARY").unwrap_or_default(),
        catch: None,
        hash_tag: None,
        event_url: text("URL").unwrap_or_default(),
        started_at,
        ended_at,
        updated_at,
        open_status: open_status_at(started_at, ended_at, now),
        limit: None,
        accepted: None,
        waiting: None,
        owner_name: None,
        place: text("LOCATION"),
        address: None,
        lat: None,
        lon: None,
        group_key: Some(feed.key.clone()),
        group_name: Some(feed.name.clone()),
        group_url: feed.group_url.clone(),
    };
    validate_event(&event)?;

    Ok(EventDetail {
        event,
        description: text("DESCRIPTION"),
    })
}

fn date_property(
    vevent: &Component<'_>,
    name: &'static str,
    timezone: Tz,
) -> std::result::Result<Option<DateTime<FixedOffset>>, EventError> {
    let Some(prop) = vevent.find_prop(name) else {
        return Ok(None);
    };
    let invalid = || EventError::InvalidTimestamp {
        field: name,
        value: prop.val.to_string(),
    };
    let value = DatePerhapsTime::try_from(prop).map_err(|_| invalid())?;
    normalize(value, timezone).map(Some).ok_or_else(invalid)
}

/// Resolves an iCalendar date or date-time to an instant in `timezone`.
///
/// Date-only and floating values are read as local time in `timezone`;
/// ambiguous local times take the earlier instant.
fn normalize(value: DatePerhapsTime, timezone: Tz) -> Option<DateTime<FixedOffset>> {
    let resolved = match value {
        DatePerhapsTime::Date(date) => timezone
            .from_local_datetime(&date.and_hms_opt(0, 0, 0)?)
            .earliest(),
        DatePerhapsTime::DateTime(CalendarDateTime::Utc(utc)) => Some(utc.with_timezone(&timezone)),
        DatePerhapsTime::DateTime(CalendarDateTime::Floating(naive)) => {
            timezone.from_local_datetime(&naive).earliest()
        }
        DatePerhapsTime::DateTime(CalendarDateTime::WithTimezone { date_time, tzid }) => {
            let zone = tzid.parse::<Tz>().unwrap_or(timezone);
            zone.from_local_datetime(&date_time)
                .earliest()
                .map(|zoned| zoned.with_timezone(&timezone))
        }
    };
    resolved.map(|dt| dt.fixed_offset())
}

/// Reverses iCalendar TEXT escaping.
fn unescape_text(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n' | 'N') => out.push('\n'),
            Some(escaped) => out.push(escaped),
            None => out.push('\\'),
        }
    }
    out
}
