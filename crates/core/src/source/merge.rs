use crate::event::{
    distinct_by_uid, filter_by_keyword, sort_by_start, validate_event, EventDetail,
};
use crate::group::{distinct_by_key, filter_groups, sort_by_key, Group, GroupFilter};

use super::{max_last_modified, Aggregate, SourceBatch};

/// Merges event batches in source order: drops invalid records, deduplicates
/// by uid (later batches win), applies the keyword query and sorts by start.
pub fn merge_events(
    batches: Vec<SourceBatch<EventDetail>>,
    keyword: Option<&str>,
) -> Aggregate<EventDetail> {
    let last_modified = max_last_modified(batches.iter().map(|b| b.last_modified));
    let events: Vec<EventDetail> = batches
        .into_iter()
        .flat_map(|b| b.items)
        .filter(|e| validate_event(&e.event).is_ok())
        .collect();

    let mut events = filter_by_keyword(distinct_by_uid(events), keyword);
    sort_by_start(&mut events);

    Aggregate::new(events, last_modified)
}

/// Merges group batches in source order: deduplicates by key (later batches
/// win), applies the filter and sorts by key.
pub fn merge_groups(batches: Vec<SourceBatch<Group>>, filter: &GroupFilter) -> Aggregate<Group> {
    let last_modified = max_last_modified(batches.iter().map(|b| b.last_modified));
    let groups: Vec<Group> = batches.into_iter().flat_map(|b| b.items).collect();

    let mut groups = filter_groups(distinct_by_key(groups), filter);
    sort_by_key(&mut groups);

    Aggregate::new(groups, last_modified)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{Event, OpenStatus};
    use chrono::{DateTime, FixedOffset, TimeZone, Utc};

    fn ts(s: &str) -> DateTime<FixedOffset> {
        DateTime::parse_from_rfc3339(s).unwrap()
    }

    fn detail(uid: &str, title: &str, start: &str) -> EventDetail {
        EventDetail {
            event: Event {
                uid: uid.to_string(),
                event_id: None,
                title: title.to_string(),
                catch: None,
                hash_tag: None,
                event_url: format!("https://example.com/{uid}"),
                started_at: ts(start),
                ended_at: ts(start),
                updated_at: ts(start),
                open_status: OpenStatus::Open,
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

    #[test]
    fn test_later_source_wins_on_shared_identity() {
        let region = SourceBatch::new(
            vec![detail("1@connpass.com", "from region", "2024-01-02T10:00:00+09:00")],
            None,
        );
        let series = SourceBatch::new(
            vec![
                detail("1@connpass.com", "from series", "2024-01-02T10:00:00+09:00"),
                detail("2@connpass.com", "other", "2024-01-01T10:00:00+09:00"),
            ],
            None,
        );

        let merged = merge_events(vec![region, series], None);

        assert_eq!(merged.items.len(), 2);
        let shared: Vec<&EventDetail> = merged
            .items
            .iter()
            .filter(|e| e.event.uid == "1@connpass.com")
            .collect();
        assert_eq!(shared.len(), 1);
        assert_eq!(shared[0].event.title, "from series");
        assert_eq!(merged.items[0].event.uid, "2@connpass.com");
    }

    #[test]
    fn test_provenance_is_max_and_defaults_to_epoch() {
        let early = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let late = Utc.with_ymd_and_hms(2024, 1, 5, 0, 0, 0).unwrap();

        let merged = merge_events(
            vec![
                SourceBatch::new(Vec::new(), Some(late)),
                SourceBatch::new(Vec::new(), Some(early)),
            ],
            None,
        );
        assert_eq!(merged.last_modified, late);

        let empty = merge_events(Vec::new(), None);
        assert_eq!(empty.last_modified, DateTime::UNIX_EPOCH);
        assert!(empty.items.is_empty());
    }

    #[test]
    fn test_invalid_records_are_dropped() {
        let mut untitled = detail("bad", "", "2024-01-01T10:00:00+09:00");
        untitled.event.title = String::new();
        let batch = SourceBatch::new(
            vec![untitled, detail("ok", "fine", "2024-01-01T10:00:00+09:00")],
            None,
        );

        let merged = merge_events(vec![batch], None);
        assert_eq!(merged.items.len(), 1);
        assert_eq!(merged.items[0].event.uid, "ok");
    }

    #[test]
    fn test_keyword_is_applied_after_merge() {
        let mut matching = detail("a", "Event", "2024-01-01T10:00:00+09:00");
        matching.event.catch = Some("Catch".to_string());
        let batch = SourceBatch::new(
            vec![matching, detail("b", "Event", "2024-01-01T11:00:00+09:00")],
            None,
        );

        let merged = merge_events(vec![batch], Some("Event,Catch"));
        assert_eq!(merged.items.len(), 1);
        assert_eq!(merged.items[0].event.uid, "a");
    }

    #[test]
    fn test_merge_groups_sorts_and_dedups() {
        let group = |key: &str, title: &str| Group {
            key: key.to_string(),
            title: title.to_string(),
            subtitle: None,
            url: None,
            website_url: None,
            twitter_url: None,
            facebook_url: None,
            image_url: None,
            description: None,
            member_count: None,
            feed_url: None,
        };
        let batches = vec![
            SourceBatch::new(vec![group("z", "Z"), group("a", "old")], None),
            SourceBatch::new(vec![group("a", "new")], None),
        ];

        let merged = merge_groups(batches, &GroupFilter::all());
        let titles: Vec<&str> = merged.items.iter().map(|g| g.title.as_str()).collect();
        assert_eq!(titles, ["new", "Z"]);
        assert_eq!(merged.last_modified, DateTime::UNIX_EPOCH);
    }
}
