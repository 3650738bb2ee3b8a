//! Serde helper functions for request deserialization.
//!
//! Request payloads come from loosely typed clients: blank strings stand in
//! for absent optional fields, and receipt dates may arrive either as a full
//! timestamp or as a bare `YYYY-MM-DD` date.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};

use crate::expense::parse_receipt_date;

/// Deserialize an optional string, treating empty strings as None.
pub fn deserialize_optional_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    Ok(s.filter(|s| !s.trim().is_empty()))
}

/// Deserialize a clearable string field.
///
/// Only runs when the field is present: `null` or a blank string clears it
/// (`Some(None)`), a missing field stays `None` through `#[serde(default)]`.
pub fn deserialize_clearable_string<'de, D>(
    deserializer: D,
) -> Result<Option<Option<String>>, D::Error>
where
    D: Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    Ok(Some(s.filter(|s| !s.trim().is_empty())))
}

/// Deserialize a clearable field, mapping an explicit `null` to `Some(None)`.
pub fn deserialize_clearable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Deserialize a receipt date.
/// Accepts RFC 3339 timestamps or YYYY-MM-DD (midnight UTC).
pub fn deserialize_receipt_date<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    parse_receipt_date(&s).map_err(serde::de::Error::custom)
}

/// Deserialize an optional receipt date, treating empty strings as None.
pub fn deserialize_optional_receipt_date<'de, D>(
    deserializer: D,
) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    match s {
        Some(s) if !s.trim().is_empty() => parse_receipt_date(&s)
            .map(Some)
            .map_err(serde::de::Error::custom),
        _ => Ok(None),
    }
}
