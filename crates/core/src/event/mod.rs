//! Event records, filters and the pure operations applied when merging them.

mod error;
mod filter;
mod http_mapping;
mod operations;
mod types;

pub use error::{EventError, FilterError};
pub use filter::{EventFilter, MAX_YEAR, MIN_YEAR};
pub use http_mapping::filter_error_to_status_code;
pub use operations::{
    distinct_by, distinct_by_uid, filter_by_keyword, in_date_buckets, in_regions,
    keyword_tokens, matches_keywords, open_status_at, parse_timestamp, sort_by_start,
    validate_event,
};
pub use types::{Event, EventDetail, OpenStatus};
