//! Upstream source contracts, batch and aggregate types, and the pure merge
//! step shared by every aggregator.

mod error;
mod http_mapping;
mod merge;
mod response;
mod traits;
mod types;

pub use error::{Result, SourceError};
pub use http_mapping::source_error_to_status_code;
pub use merge::{merge_events, merge_groups};
pub use response::{check_status, extract_error_message, HttpResponse};
pub use traits::{Aggregator, EventSource, GroupSource, HttpFetch};
pub use types::{max_last_modified, Aggregate, SourceBatch};
