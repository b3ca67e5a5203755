//! Functional core for eventcast.
//!
//! Domain types, pure operations and the contracts (traits, errors) shared by
//! the cache backends, upstream sources and the HTTP server.

pub mod cache;
pub mod event;
pub mod group;
pub mod serde;
pub mod source;
