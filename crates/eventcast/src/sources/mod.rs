//! Upstream source clients.

pub mod connpass;
pub mod groups;
pub mod http;
pub mod ical;
pub mod paginated;

pub use connpass::ConnpassEventSource;
pub use groups::{ConnpassGroupSource, FeedGroupSource};
pub use http::{PacedFetcher, ReqwestFetcher};
pub use ical::{IcalFeed, IcalFeedSource};
pub use paginated::PaginatedClient;
