use crate::event::{distinct_by, keyword_tokens};

use super::types::{Group, GroupFilter};

/// Deduplicates groups by key, last one wins.
pub fn distinct_by_key(groups: Vec<Group>) -> Vec<Group> {
    distinct_by(groups, |g| g.key.clone())
}

/// True when every keyword token appears in the title, subtitle or
/// description.
pub fn group_matches_keywords(group: &Group, tokens: &[String]) -> bool {
    let fields: Vec<String> = [
        Some(group.title.as_str()),
        group.subtitle.as_deref(),
        group.description.as_deref(),
    ]
    .into_iter()
    .map(|field| field.unwrap_or_default().to_lowercase())
    .collect();

    tokens
        .iter()
        .all(|token| fields.iter().any(|field| field.contains(token.as_str())))
}

/// Applies the key and keyword constraints of `filter`.
pub fn filter_groups(groups: Vec<Group>, filter: &GroupFilter) -> Vec<Group> {
    let tokens = filter.keyword().map(keyword_tokens).unwrap_or_default();
    groups
        .into_iter()
        .filter(|g| filter.key().is_none_or(|key| g.key == key))
        .filter(|g| group_matches_keywords(g, &tokens))
        .collect()
}

/// Sorts groups by key.
pub fn sort_by_key(groups: &mut [Group]) {
    groups.sort_by(|a, b| a.key.cmp(&b.key));
}
