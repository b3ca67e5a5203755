//! Canonical JSON text used for cache keys and cached content.
//!
//! Object keys are sorted by code point, items are separated by `", "` and
//! keys by `": "`, and every character outside printable ASCII is escaped as
//! `\uXXXX`. Deployments sharing one Redis store must agree on this format
//! byte for byte, or their keys stop hashing identically.

use std::io;

use serde::Serialize;
use serde_json::ser::{Formatter, Serializer};
use serde_json::Value;

/// Renders a JSON value in canonical form.
///
/// Key order comes from `serde_json::Map`, which is sorted unless the
/// `preserve_order` feature is enabled.
///
/// # Examples
///
/// ```
/// use eventcast_core::cache::canonical_json;
/// use serde_json::json;
///
/// let value = json!({"b": 1, "a": [true, null]});
/// assert_eq!(canonical_json(&value), r#"{"a": [true, null], "b": 1}"#);
/// ```
pub fn canonical_json(value: &Value) -> String {
    render(value)
}

/// Renders a bare string the way [`canonical_json`] renders string values.
pub fn canonical_string(value: &str) -> String {
    render(value)
}

fn render<T: Serialize + ?Sized>(value: &T) -> String {
    let mut out = Vec::new();
    let mut serializer = Serializer::with_formatter(&mut out, CanonicalFormatter);
    // Writing into a Vec cannot fail and the formatter only emits ASCII.
    if value.serialize(&mut serializer).is_err() {
        return String::new();
    }
    String::from_utf8(out).unwrap_or_default()
}

/// Compact JSON with spaced separators and ASCII-only output.
struct CanonicalFormatter;

impl Formatter for CanonicalFormatter {
    fn begin_array_value<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_key<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b", ")
        }
    }

    fn begin_object_value<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        writer.write_all(b": ")
    }

    // Control characters, quotes and backslashes never reach this point;
    // the serializer escapes them itself.
    fn write_string_fragment<W>(&mut self, writer: &mut W, fragment: &str) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        for c in fragment.chars() {
            if matches!(c, ' '..='~') {
                writer.write_all(&[c as u8])?;
            } else {
                let mut units = [0u16; 2];
                for unit in c.encode_utf16(&mut units) {
                    write!(writer, "\\u{unit:04x}")?;
                }
            }
        }
        Ok(())
    }
}
