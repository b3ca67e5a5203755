//! Aggregators over the configured sources and the refresh orchestrator that
//! serves them.

mod events;
mod groups;
mod refresh;

pub use events::EventAggregator;
pub use groups::GroupAggregator;
pub use refresh::{RefreshOrchestrator, AGGREGATE_TTL};
