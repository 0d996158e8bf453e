//! Deserialization helpers for query strings and request bodies.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer};
use uuid::Uuid;

use crate::dates::parse_day;

/// Empty query values are treated as absent.
pub fn deserialize_optional_uuid<'de, D>(deserializer: D) -> Result<Option<Uuid>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt: Option<String> = Option::deserialize(deserializer)?;
    match opt {
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => Uuid::parse_str(s.trim())
            .map(Some)
            .map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}

/// Accepts `YYYY-MM-DD` or an RFC 3339 timestamp and keeps only the day.
pub fn deserialize_day<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    parse_day(&s).ok_or_else(|| {
        serde::de::Error::custom(format!(
            "invalid date '{s}', expected YYYY-MM-DD or an RFC 3339 timestamp"
        ))
    })
}

pub fn deserialize_optional_day<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt: Option<String> = Option::deserialize(deserializer)?;
    match opt {
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => parse_day(&s).map(Some).ok_or_else(|| {
            serde::de::Error::custom(format!(
                "invalid date '{s}', expected YYYY-MM-DD or an RFC 3339 timestamp"
            ))
        }),
        None => Ok(None),
    }
}
