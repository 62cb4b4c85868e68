//! Tolerant serde adapters for result documents.
//!
//! Result collections are schema-less: game clients have written numbers as
//! strings, years as integers and left optional fields empty. These adapters
//! accept what is there and fall back to "absent" instead of rejecting the
//! whole document.

use serde::{Deserialize, Deserializer, Serializer};
use serde_json::Value;
use time::{OffsetDateTime, format_description::well_known::Rfc3339};

/// Numeric fields such as `timeTaken` and `cgpa`.
pub mod number {
    use super::*;

    /// Numbers and numeric strings; anything else or a non-finite value is absent.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<Value>::deserialize(deserializer)?;
        Ok(raw.and_then(|value| match value {
            Value::Number(number) => number.as_f64(),
            Value::String(text) => text.trim().parse::<f64>().ok(),
            _ => None,
        })
        .filter(|value| value.is_finite()))
    }
}

/// Free-form identity fields (`name`, `rollNo`, `year`, ...).
pub mod text {
    use super::*;

    /// Strings as-is, numbers and booleans as text, everything else empty.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<String, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<Value>::deserialize(deserializer)?;
        Ok(match raw {
            Some(Value::String(text)) => text,
            Some(Value::Number(number)) => number.to_string(),
            Some(Value::Bool(flag)) => flag.to_string(),
            _ => String::new(),
        })
    }
}

/// Optional text where an empty string means "not provided".
pub mod optional_text {
    use super::*;

    /// Like [`super::text::deserialize`], with an empty result mapped to `None`.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = text::deserialize(deserializer)?;
        Ok(Some(value).filter(|value| !value.is_empty()))
    }
}

/// Server-assigned creation time, stored as an RFC 3339 string.
pub mod timestamp {
    use super::*;

    /// Write the time as RFC 3339, or null.
    pub fn serialize<S>(value: &Option<OffsetDateTime>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(time) => {
                let formatted = time.format(&Rfc3339).map_err(serde::ser::Error::custom)?;
                serializer.serialize_some(&formatted)
            }
            None => serializer.serialize_none(),
        }
    }

    /// Parse RFC 3339 text; anything else is absent.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<OffsetDateTime>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<Value>::deserialize(deserializer)?;
        Ok(match raw {
            Some(Value::String(text)) => OffsetDateTime::parse(&text, &Rfc3339).ok(),
            _ => None,
        })
    }
}
