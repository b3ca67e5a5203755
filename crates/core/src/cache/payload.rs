use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::serialization::{canonical_json, canonical_string};
use super::{CacheError, Result};

/// A value about to be written to the cache.
#[derive(Debug, Clone, Copy)]
pub enum Payload<'a> {
    /// Structured content. Only objects, arrays and strings are accepted.
    Json(&'a Value),
    /// Text stored verbatim (feed documents).
    Text(&'a str),
}

impl Payload<'_> {
    /// Encodes the payload into the text that gets stored.
    ///
    /// Fails with [`CacheError::InvalidPayload`] for JSON scalars other than
    /// strings.
    pub fn encode(&self) -> Result<String> {
        match self {
            Payload::Json(value @ (Value::Object(_) | Value::Array(_))) => Ok(canonical_json(value)),
            Payload::Json(Value::String(s)) => Ok(canonical_string(s)),
            Payload::Json(other) => Err(CacheError::InvalidPayload(json_kind(other).to_string())),
            Payload::Text(text) => Ok((*text).to_string()),
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// A cache hit: raw content plus its optional provenance timestamp.
///
/// Content is returned as stored; interpreting it is up to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedPayload {
    pub content: String,
    pub last_modified: Option<DateTime<Utc>>,
}

impl CachedPayload {
    /// Parses the content as JSON into `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_str(&self.content).map_err(|e| CacheError::Decode(e.to_string()))
    }
}

/// Encodes a provenance timestamp as whole UNIX seconds.
pub fn encode_timestamp(at: DateTime<Utc>) -> String {
    at.timestamp().to_string()
}

/// Decodes a timestamp written by [`encode_timestamp`].
pub fn decode_timestamp(raw: &[u8]) -> Result<DateTime<Utc>> {
    let text = std::str::from_utf8(raw).map_err(|e| CacheError::Decode(e.to_string()))?;
    let seconds: i64 = text
        .trim()
        .parse()
        .map_err(|_| CacheError::Decode(format!("invalid timestamp: {text}")))?;
    DateTime::from_timestamp(seconds, 0)
        .ok_or_else(|| CacheError::Decode(format!("timestamp out of range: {seconds}")))
}
