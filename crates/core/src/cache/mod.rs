//! Cache contracts: the store trait, key derivation and payload encoding.

mod error;
mod keys;
mod payload;
mod serialization;
mod traits;

pub use error::{CacheError, Result};
pub use keys::{
    cache_key, content_key, last_modified_key, KeySource, EVENT_AGGREGATE_NAMESPACE,
    GROUP_AGGREGATE_NAMESPACE, PAGE_NAMESPACE, RATE_GATE_KEY,
};
pub use payload::{decode_timestamp, encode_timestamp, CachedPayload, Payload};
pub use serialization::{canonical_json, canonical_string};
pub use traits::{Cache, KeyTtl};
