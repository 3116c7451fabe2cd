//! XML response wrapper and text-node deserializers.

use std::fmt::Display;
use std::str::FromStr;

use serde::de::Error;
use serde::{Deserialize, Deserializer};

use super::types::{LegacyEpisode, LegacySeries};

/// Deserializes empty text nodes as `None` (for `String` fields).
pub fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    Ok(s.filter(|s| !s.trim().is_empty()))
}

/// Deserializes empty text nodes as `None`, parsing the rest as `T`.
pub fn empty_as_none_parsed<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: Display,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    match s.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(v) => v
            .parse::<T>()
            .map(Some)
            .map_err(|e| D::Error::custom(format!("failed to parse {v:?}: {e}"))),
    }
}

/// `<Data>` document returned by every legacy endpoint.
#[derive(Debug, Default, Deserialize)]
#[serde(rename = "Data")]
pub struct DataResponse {
    /// `<Series>` records.
    #[serde(rename = "Series", default)]
    pub series: Vec<LegacySeries>,
    /// `<Episode>` records (only in the `all` document).
    #[serde(rename = "Episode", default)]
    pub episodes: Vec<LegacyEpisode>,
}
