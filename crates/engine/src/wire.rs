//! Serde helpers for the permissive persisted format.
//!
//! The local blobs and the remote snapshot share one wire format. Reads are
//! forgiving: a malformed date becomes `None` and a malformed amount becomes
//! `0.0`, so a single bad record never takes a whole collection down with it.

/// ISO calendar dates (`YYYY-MM-DD`). Unparseable or non-string input
/// deserializes to `None`.
pub(crate) mod date {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%Y-%m-%d";

    pub fn serialize<S>(value: &Option<NaiveDate>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(date) => serializer.serialize_str(&date.format(FORMAT).to_string()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
        Ok(raw
            .as_ref()
            .and_then(serde_json::Value::as_str)
            .and_then(|text| NaiveDate::parse_from_str(text.trim(), FORMAT).ok()))
    }
}

/// Monetary values. Numbers pass through, numeric strings are parsed with
/// `.` or `,` as decimal separator, everything else coerces to `0.0`.
pub(crate) mod amount {
    use serde::{Deserialize, Deserializer, Serializer};

    use crate::money;

    pub fn serialize<S>(value: &f64, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_f64(*value)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<f64, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<serde_json::Value>::deserialize(deserializer)?;
        Ok(match raw {
            Some(serde_json::Value::Number(number)) => number.as_f64().unwrap_or(0.0),
            Some(serde_json::Value::String(text)) => money::parse_amount(&text),
            _ => 0.0,
        })
    }
}

/// Binary logo data, base64 at rest. Invalid base64 deserializes to `None`.
pub(crate) mod logo {
    use base64::Engine as _;
    use base64::engine::general_purpose::STANDARD;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &Option<Vec<u8>>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(bytes) => serializer.serialize_str(&STANDARD.encode(bytes)),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Vec<u8>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.and_then(|encoded| STANDARD.decode(encoded).ok()))
    }
}
