//! Field-level decoders shared by the JSON and XML response types.
//!
//! Used through `#[serde(deserialize_with = "...")]` on the specific fields
//! that carry pipe-delimited lists or UNIX timestamps.

use chrono::{DateTime, Utc};
use serde::de::Error;
use serde::{Deserialize, Deserializer};

/// Splits a pipe-delimited list.
///
/// Leading and trailing `|` are trimmed before splitting, so `"|a|b|"` and
/// `"a|b"` both yield `["a", "b"]`. An empty or pipe-only input yields `[""]`.
#[must_use]
pub fn split_pipe_list(raw: &str) -> Vec<String> {
    raw.trim_matches('|').split('|').map(String::from).collect()
}

/// Deserializes a pipe-delimited string into a list. `null` becomes `[]`.
///
/// # Errors
///
/// Returns an error if the value is neither a string nor `null`.
pub fn pipe_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.map_or_else(Vec::new, |s| split_pipe_list(&s)))
}

/// Deserializes a JSON array, treating `null` as an empty list.
///
/// # Errors
///
/// Returns an error if the value is neither an array nor `null`.
pub fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    let items: Option<Vec<T>> = Option::deserialize(deserializer)?;
    Ok(items.unwrap_or_default())
}

/// Converts UNIX seconds into an absolute instant.
fn from_unix_seconds<E: Error>(secs: i64) -> Result<DateTime<Utc>, E> {
    DateTime::from_timestamp(secs, 0)
        .ok_or_else(|| E::custom(format!("UNIX timestamp out of range: {secs}")))
}

/// Deserializes integer UNIX seconds into a `DateTime<Utc>`.
///
/// # Errors
///
/// Returns an error for non-numeric input or an out-of-range timestamp.
pub fn unix_time<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let secs = i64::deserialize(deserializer)?;
    from_unix_seconds(secs)
}

/// Like [`unix_time`], but `null` becomes `None`.
///
/// # Errors
///
/// Returns an error for non-numeric input or an out-of-range timestamp.
pub fn unix_time_opt<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let secs: Option<i64> = Option::deserialize(deserializer)?;
    secs.map(from_unix_seconds::<D::Error>).transpose()
}

/// Deserializes a UNIX-seconds text node (legacy XML). Empty text becomes `None`.
///
/// # Errors
///
/// Returns an error for non-numeric text or an out-of-range timestamp.
pub fn unix_time_text<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(v) => {
            let secs = v
                .parse::<i64>()
                .map_err(|e| D::Error::custom(format!("failed to parse UNIX timestamp: {e}")))?;
            from_unix_seconds(secs).map(Some)
        }
    }
}

/// Deserializes a pipe-delimited text node (legacy XML). An empty or
/// absent element becomes `[]`.
///
/// # Errors
///
/// Returns an error if the node does not hold text.
pub fn pipe_list_text<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(Vec::new()),
        Some(v) => Ok(split_pipe_list(v)),
    }
}
