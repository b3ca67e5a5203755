//! Group records and their filter.

mod operations;
mod types;

pub use operations::{distinct_by_key, filter_groups, group_matches_keywords, sort_by_key};
pub use types::{Group, GroupFilter};
