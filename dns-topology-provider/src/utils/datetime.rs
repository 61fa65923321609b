//! Date/time helpers
//!
//! - Serialize: `DateTime<Utc>` -> RFC3339 string
//! - Deserialize: RFC3339 string or Unix timestamp (seconds) -> `DateTime<Utc>`
//! - [`parse_timestamp`] for the ISO-8601 strings embedded in XML responses

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serializer};

/// Serialize `Option<DateTime<Utc>>` as an optional RFC3339 string.
#[allow(clippy::ref_option)]
pub fn serialize<S>(dt: &Option<DateTime<Utc>>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    match dt {
        Some(dt) => serializer.serialize_some(&dt.to_rfc3339()),
        None => serializer.serialize_none(),
    }
}

/// Deserialize from an RFC3339 string or a Unix timestamp in seconds.
pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OptionalTimestamp {
        String(String),
        I64(i64),
    }

    match Option::<OptionalTimestamp>::deserialize(deserializer)? {
        Some(OptionalTimestamp::String(s)) => parse_timestamp(&s)
            .map(Some)
            .ok_or_else(|| Error::custom(format!("Invalid RFC3339 timestamp: {s}"))),
        Some(OptionalTimestamp::I64(ts)) => DateTime::from_timestamp(ts, 0)
            .map(Some)
            .ok_or_else(|| Error::custom("Invalid Unix timestamp")),
        None => Ok(None),
    }
}

/// Parse an ISO-8601 timestamp such as `2017-03-10T01:36:41.958Z`.
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value.trim())
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}
