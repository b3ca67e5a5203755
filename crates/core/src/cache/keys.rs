use serde_json::Value;
use sha2::{Digest, Sha256};

use super::serialization::{canonical_json, canonical_string};

/// Namespace for per-page upstream responses.
pub const PAGE_NAMESPACE: &str = "event-request:";

/// Namespace for aggregated event lists keyed on a full event filter.
pub const EVENT_AGGREGATE_NAMESPACE: &str = "event-aggregate:";

/// Namespace for aggregated group lists keyed on a full group filter.
pub const GROUP_AGGREGATE_NAMESPACE: &str = "group-aggregate:";

/// Well-known key of the shared rate gate flag.
pub const RATE_GATE_KEY: &str = "request_wait_sec";

/// The input a cache key is derived from.
#[derive(Debug, Clone, Copy)]
pub enum KeySource<'a> {
    /// A structured parameter mapping (usually an upstream query).
    Params(&'a Value),
    /// A raw string such as a feed URL.
    Raw(&'a str),
}

impl KeySource<'_> {
    /// Canonical text that gets hashed.
    pub fn canonical_text(&self) -> String {
        match self {
            KeySource::Params(value) => canonical_json(value),
            KeySource::Raw(raw) => canonical_string(raw),
        }
    }
}

/// Derives the cache key for `source` under `namespace`.
///
/// The key is the namespace followed by the hex SHA-256 of the canonical text,
/// so parameter mappings that differ only in insertion order share a key.
///
/// # Examples
///
/// ```
/// use eventcast_core::cache::{cache_key, KeySource};
/// use serde_json::json;
///
/// let params = json!({"param": "value"});
/// assert_eq!(
///     cache_key("request_", &KeySource::Params(&params)),
///     "request_5647d15eb1d32d1548f1504fcc64134946cd1c401c87bb9636b34606441b8ae6"
/// );
/// ```
pub fn cache_key(namespace: &str, source: &KeySource<'_>) -> String {
    let digest = Sha256::digest(source.canonical_text().as_bytes());
    format!("{namespace}{digest:x}")
}

/// Returns the sub-key holding the content blob.
pub fn content_key(key: &str) -> String {
    format!("{key}:content")
}

/// Returns the sub-key holding the provenance timestamp.
pub fn last_modified_key(key: &str) -> String {
    format!("{key}:last_modified")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Map};

    #[test]
    fn test_known_digest_for_flat_params() {
        let params = json!({"param": "value"});
        assert_eq!(
            cache_key("request_", &KeySource::Params(&params)),
            "request_5647d15eb1d32d1548f1504fcc64134946cd1c401c87bb9636b34606441b8ae6"
        );
    }

    #[test]
    fn test_insertion_order_does_not_change_key() {
        let mut forward = Map::new();
        forward.insert("count".to_string(), json!(100));
        forward.insert("order".to_string(), json!(2));
        forward.insert("start".to_string(), json!(1));

        let mut backward = Map::new();
        backward.insert("start".to_string(), json!(1));
        backward.insert("order".to_string(), json!(2));
        backward.insert("count".to_string(), json!(100));

        let a = cache_key(PAGE_NAMESPACE, &KeySource::Params(&Value::Object(forward)));
        let b = cache_key(PAGE_NAMESPACE, &KeySource::Params(&Value::Object(backward)));

        assert_eq!(a, b);
        assert_eq!(
            a,
            "event-request:9ac3ee39b12ab7afc5db14e880ba6859954484cc183e6729db017edd4c636b22"
        );
    }

    #[test]
    fn test_non_ascii_params_hash_their_escaped_form() {
        let params = json!({"keyword_or": "\u{5c71}\u{68a8}"});
        assert_eq!(
            cache_key("", &KeySource::Params(&params)),
            "5a7cbccb08f89beb5d633180c297d6a04d7a20e444a67fd6d53843a715e8ec04"
        );
    }

    #[test]
    fn test_raw_key_hashes_quoted_string() {
        let key = cache_key("", &KeySource::Raw("https://example.com/feed.ics"));
        assert_eq!(
            key,
            "226a6cec2df266e7d437855a04e4bfa3474c846f8ea3b5725a31b6303624a88b"
        );
    }

    #[test]
    fn test_namespaces_separate_identical_params() {
        let params = json!({"ym": ["202401"]});
        let page = cache_key(PAGE_NAMESPACE, &KeySource::Params(&params));
        let aggregate = cache_key(EVENT_AGGREGATE_NAMESPACE, &KeySource::Params(&params));
        assert_ne!(page, aggregate);
        assert_eq!(page[PAGE_NAMESPACE.len()..], aggregate[EVENT_AGGREGATE_NAMESPACE.len()..]);
    }

    #[test]
    fn test_sub_keys() {
        assert_eq!(content_key("event-request:abc"), "event-request:abc:content");
        assert_eq!(
            last_modified_key("event-request:abc"),
            "event-request:abc:last_modified"
        );
    }
}
