//! Serde helpers for loosely typed upstream payloads.

use serde::{Deserialize, Deserializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Number(f64),
    String(String),
}

/// Deserialize an optional float that upstreams send either as a JSON number
/// or as a numeric string. Null, blank and unparsable strings become `None`.
pub fn deserialize_lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<NumberOrString> = Option::deserialize(deserializer)?;
    Ok(match value {
        Some(NumberOrString::Number(n)) => Some(n),
        Some(NumberOrString::String(s)) => s.trim().parse().ok(),
        None => None,
    })
}

/// Deserialize an optional string, treating empty strings as None.
pub fn deserialize_optional_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    Ok(s.filter(|s| !s.trim().is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Coordinates {
        #[serde(default, deserialize_with = "deserialize_lenient_f64")]
        lat: Option<f64>,
        #[serde(default, deserialize_with = "deserialize_lenient_f64")]
        lon: Option<f64>,
        #[serde(default, deserialize_with = "deserialize_optional_string")]
        label: Option<String>,
    }

    #[test]
    fn test_numbers_and_numeric_strings() {
        let parsed: Coordinates =
            serde_json::from_str(r#"{"lat": "35.6622", "lon": 138.5683, "label": "Kofu"}"#)
                .unwrap();
        assert_eq!(
            parsed,
            Coordinates {
                lat: Some(35.6622),
                lon: Some(138.5683),
                label: Some("Kofu".to_string()),
            }
        );
    }

    #[test]
    fn test_null_blank_and_missing() {
        let parsed: Coordinates = serde_json::from_str(r#"{"lat": null, "lon": " ", "label": ""}"#).unwrap();
        assert_eq!(
            parsed,
            Coordinates {
                lat: None,
                lon: None,
                label: None,
            }
        );

        let parsed: Coordinates = serde_json::from_str("{}").unwrap();
        assert_eq!(parsed.lat, None);
    }

    #[test]
    fn test_garbage_string_is_none() {
        let parsed: Coordinates = serde_json::from_str(r#"{"lat": "north"}"#).unwrap();
        assert_eq!(parsed.lat, None);
    }
}
