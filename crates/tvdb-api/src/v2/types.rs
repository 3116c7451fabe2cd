//! TheTVDB JSON API response types and search parameters.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::decode::{null_as_empty, pipe_list, unix_time_opt};

// --- Envelopes ---

/// The `{"data": ...}` wrapper around every successful resource body.
#[derive(Debug, Deserialize)]
pub(crate) struct DataEnvelope<T> {
    pub data: T,
}

/// Body of `/login` and `/refresh_token` responses.
#[derive(Debug, Deserialize)]
pub(crate) struct TokenResponse {
    pub token: String,
}

/// Body sent to `/login`.
#[derive(Debug, Serialize)]
pub(crate) struct LoginRequest<'a> {
    pub apikey: &'a str,
}

/// `data` of `/search/series/params`.
#[derive(Debug, Deserialize)]
pub(crate) struct SearchParamsData {
    #[serde(default)]
    pub params: Vec<String>,
}

/// Error body returned alongside non-success statuses.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorResponse {
    #[serde(rename = "Error")]
    pub error: String,
}

// --- Series ---

/// A TV series.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Series {
    /// TheTVDB series ID.
    pub id: u64,
    /// Localized name.
    pub series_name: String,
    /// Alternative names.
    #[serde(deserialize_with = "null_as_empty")]
    pub aliases: Vec<String>,
    /// Banner image path.
    pub banner: Option<String>,
    /// Legacy series ID.
    pub series_id: Option<String>,
    /// Status (e.g. "Continuing", "Ended").
    pub status: Option<String>,
    /// First air date (YYYY-MM-DD).
    pub first_aired: Option<String>,
    /// Network name.
    pub network: Option<String>,
    /// Network ID.
    pub network_id: Option<String>,
    /// Runtime in minutes, as text.
    pub runtime: Option<String>,
    /// Genres.
    #[serde(rename = "genre", deserialize_with = "null_as_empty")]
    pub genres: Vec<String>,
    /// Overview text.
    pub overview: Option<String>,
    /// Last update instant.
    #[serde(deserialize_with = "unix_time_opt")]
    pub last_updated: Option<DateTime<Utc>>,
    /// Day of week the series airs.
    pub airs_day_of_week: Option<String>,
    /// Time of day the series airs.
    pub airs_time: Option<String>,
    /// Content rating (e.g. "TV-PG").
    pub rating: Option<String>,
    /// IMDb ID.
    pub imdb_id: Option<String>,
    /// Zap2it ID.
    pub zap2it_id: Option<String>,
    /// When the series was added.
    pub added: Option<String>,
    /// User ID that added the series.
    pub added_by: Option<u64>,
    /// Site rating.
    pub site_rating: Option<f64>,
    /// Number of site ratings.
    pub site_rating_count: Option<u64>,
}

// --- Episodes ---

/// Translated fields of an episode.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EpisodeLanguage {
    /// Language of `episodeName`.
    pub episode_name: Option<String>,
    /// Language of `overview`.
    pub overview: Option<String>,
}

/// A single episode of a series.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Episode {
    /// TheTVDB episode ID.
    pub id: u64,
    /// Aired season number.
    pub aired_season: Option<u64>,
    /// Aired episode number within the season.
    pub aired_episode_number: Option<u64>,
    /// Episode name.
    pub episode_name: Option<String>,
    /// First air date.
    pub first_aired: Option<String>,
    /// Guest stars.
    #[serde(deserialize_with = "null_as_empty")]
    pub guest_stars: Vec<String>,
    /// Directors (pipe list).
    #[serde(deserialize_with = "pipe_list")]
    pub director: Vec<String>,
    /// Writers.
    #[serde(rename = "writers", deserialize_with = "null_as_empty")]
    pub writers: Vec<String>,
    /// Overview text.
    pub overview: Option<String>,
    /// Languages of the translated fields.
    pub language: EpisodeLanguage,
    /// Production code.
    pub production_code: Option<String>,
    /// Show URL.
    pub show_url: Option<String>,
    /// Last update instant.
    #[serde(deserialize_with = "unix_time_opt")]
    pub last_updated: Option<DateTime<Utc>>,
    /// DVD disc ID.
    #[serde(rename = "dvdDiscid")]
    pub dvd_disc_id: Option<String>,
    /// DVD season number.
    pub dvd_season: Option<u64>,
    /// DVD episode number (may be fractional).
    pub dvd_episode_number: Option<f64>,
    /// DVD chapter.
    pub dvd_chapter: Option<String>,
    /// Absolute episode number.
    pub absolute_number: Option<u64>,
    /// Thumbnail path.
    pub filename: Option<String>,
    /// Owning series ID.
    pub series_id: u64,
    /// User ID of the last editor.
    pub last_updated_by: Option<u64>,
    /// Season this special airs after.
    pub airs_after_season: Option<u64>,
    /// Season this special airs before.
    pub airs_before_season: Option<u64>,
    /// Episode this special airs before.
    pub airs_before_episode: Option<u64>,
    /// Thumbnail author user ID.
    pub thumb_author: Option<u64>,
    /// When the thumbnail was added.
    pub thumb_added: Option<String>,
    /// Thumbnail width.
    pub thumb_width: Option<String>,
    /// Thumbnail height.
    pub thumb_height: Option<String>,
    /// IMDb ID.
    pub imdb_id: Option<String>,
    /// Site rating.
    pub site_rating: Option<f64>,
}

// --- Actors / Images / Languages ---

/// An actor credited on a series.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Actor {
    /// Actor ID.
    pub id: u64,
    /// Series ID.
    pub series_id: u64,
    /// Actor name.
    pub name: String,
    /// Roles played (pipe list).
    #[serde(deserialize_with = "pipe_list")]
    pub role: Vec<String>,
    /// Billing order.
    pub sort_order: u64,
    /// Image path.
    pub image: Option<String>,
    /// Image author user ID.
    pub image_author: Option<u64>,
    /// When the image was added.
    pub image_added: Option<String>,
    /// Last update timestamp, as text.
    pub last_updated: Option<String>,
}

/// Image counts per image type for a series.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Image {
    /// Fan art images.
    pub fanart: u64,
    /// Poster images.
    pub poster: u64,
    /// Season images.
    pub season: u64,
    /// Wide season images.
    pub seasonwide: u64,
    /// Series banner images.
    pub series: u64,
}

/// A language supported by TheTVDB.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Language {
    /// Language ID.
    pub id: u64,
    /// ISO 639-1 abbreviation.
    pub abbreviation: String,
    /// Native name.
    pub name: String,
    /// English name.
    pub english_name: String,
}

// --- Search ---

/// Query parameters for `search/series`.
///
/// The server accepts one of these keys per request; the valid names are
/// listed by `search/series/params`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchSeriesParams {
    /// Series name.
    pub name: Option<String>,
    /// IMDb ID (e.g. `tt0096697`).
    pub imdb_id: Option<String>,
    /// Zap2it ID.
    pub zap2it_id: Option<String>,
    /// URL slug.
    pub slug: Option<String>,
}

impl SearchSeriesParams {
    /// Searches by series name.
    #[must_use]
    pub fn by_name(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Searches by IMDb ID.
    #[must_use]
    pub fn by_imdb_id(imdb_id: impl Into<String>) -> Self {
        Self {
            imdb_id: Some(imdb_id.into()),
            ..Self::default()
        }
    }

    /// Searches by Zap2it ID.
    #[must_use]
    pub fn by_zap2it_id(zap2it_id: impl Into<String>) -> Self {
        Self {
            zap2it_id: Some(zap2it_id.into()),
            ..Self::default()
        }
    }

    /// Searches by slug.
    #[must_use]
    pub fn by_slug(slug: impl Into<String>) -> Self {
        Self {
            slug: Some(slug.into()),
            ..Self::default()
        }
    }

    /// Converts to query pairs using the server's parameter names.
    pub(crate) fn to_query(&self) -> Vec<(&'static str, String)> {
        [
            ("name", &self.name),
            ("imdbId", &self.imdb_id),
            ("zap2itId", &self.zap2it_id),
            ("slug", &self.slug),
        ]
        .into_iter()
        .filter_map(|(key, value)| value.clone().map(|v| (key, v)))
        .collect()
    }
}
