//! Legacy XML API data types.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::xml::{empty_as_none, empty_as_none_parsed};
use crate::decode::{pipe_list_text, unix_time_text};

/// `<Series>` record.
///
/// Search results carry only a subset of the fields; the rest stay empty.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
#[allow(clippy::module_name_repetitions)]
pub struct LegacySeries {
    /// TheTVDB series ID.
    pub id: u64,
    /// Series name.
    #[serde(rename = "SeriesName")]
    pub series_name: String,
    /// Main cast.
    #[serde(rename = "Actors", deserialize_with = "pipe_list_text")]
    pub actors: Vec<String>,
    /// Day of week the series airs.
    #[serde(rename = "Airs_DayOfWeek", deserialize_with = "empty_as_none")]
    pub airs_day_of_week: Option<String>,
    /// Time of day the series airs.
    #[serde(rename = "Airs_Time", deserialize_with = "empty_as_none")]
    pub airs_time: Option<String>,
    /// Content rating.
    #[serde(rename = "ContentRating", deserialize_with = "empty_as_none")]
    pub content_rating: Option<String>,
    /// First air date.
    #[serde(rename = "FirstAired", deserialize_with = "empty_as_none")]
    pub first_aired: Option<String>,
    /// Genres.
    #[serde(rename = "Genre", deserialize_with = "pipe_list_text")]
    pub genres: Vec<String>,
    /// IMDb ID.
    #[serde(rename = "IMDB_ID", deserialize_with = "empty_as_none")]
    pub imdb_id: Option<String>,
    /// Language abbreviation.
    #[serde(rename = "Language", alias = "language", deserialize_with = "empty_as_none")]
    pub language: Option<String>,
    /// Network name.
    #[serde(rename = "Network", deserialize_with = "empty_as_none")]
    pub network: Option<String>,
    /// Overview text.
    #[serde(rename = "Overview", deserialize_with = "empty_as_none")]
    pub overview: Option<String>,
    /// Average rating.
    #[serde(rename = "Rating", deserialize_with = "empty_as_none")]
    pub rating: Option<String>,
    /// Number of ratings.
    #[serde(rename = "RatingCount", deserialize_with = "empty_as_none_parsed")]
    pub rating_count: Option<u64>,
    /// Runtime in minutes, as text.
    #[serde(rename = "Runtime", deserialize_with = "empty_as_none")]
    pub runtime: Option<String>,
    /// Status.
    #[serde(rename = "Status", deserialize_with = "empty_as_none")]
    pub status: Option<String>,
    /// Banner path.
    #[serde(deserialize_with = "empty_as_none")]
    pub banner: Option<String>,
    /// Fan art path.
    #[serde(deserialize_with = "empty_as_none")]
    pub fanart: Option<String>,
    /// Poster path.
    #[serde(deserialize_with = "empty_as_none")]
    pub poster: Option<String>,
    /// Last update instant.
    #[serde(rename = "lastupdated", deserialize_with = "unix_time_text")]
    pub last_updated: Option<DateTime<Utc>>,
    /// Zap2it ID.
    #[serde(deserialize_with = "empty_as_none")]
    pub zap2it_id: Option<String>,
}

/// `<Episode>` record.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
#[allow(clippy::module_name_repetitions)]
pub struct LegacyEpisode {
    /// TheTVDB episode ID.
    pub id: u64,
    /// Episode number across DVD and aired order.
    #[serde(rename = "Combined_episodenumber", deserialize_with = "empty_as_none")]
    pub combined_episode_number: Option<String>,
    /// Season across DVD and aired order.
    #[serde(rename = "Combined_season", deserialize_with = "empty_as_none_parsed")]
    pub combined_season: Option<u64>,
    /// DVD chapter.
    #[serde(rename = "DVD_chapter", deserialize_with = "empty_as_none")]
    pub dvd_chapter: Option<String>,
    /// DVD disc ID.
    #[serde(rename = "DVD_discid", deserialize_with = "empty_as_none")]
    pub dvd_disc_id: Option<String>,
    /// DVD episode number.
    #[serde(rename = "DVD_episodenumber", deserialize_with = "empty_as_none")]
    pub dvd_episode_number: Option<String>,
    /// DVD season.
    #[serde(rename = "DVD_season", deserialize_with = "empty_as_none")]
    pub dvd_season: Option<String>,
    /// Directors.
    #[serde(rename = "Director", deserialize_with = "pipe_list_text")]
    pub director: Vec<String>,
    /// Thumbnail flag.
    #[serde(rename = "EpImgFlag", deserialize_with = "empty_as_none")]
    pub ep_img_flag: Option<String>,
    /// Episode name.
    #[serde(rename = "EpisodeName", deserialize_with = "empty_as_none")]
    pub episode_name: Option<String>,
    /// Episode number within the season.
    #[serde(rename = "EpisodeNumber")]
    pub episode_number: u64,
    /// First air date.
    #[serde(rename = "FirstAired", deserialize_with = "empty_as_none")]
    pub first_aired: Option<String>,
    /// Guest stars.
    #[serde(rename = "GuestStars", deserialize_with = "pipe_list_text")]
    pub guest_stars: Vec<String>,
    /// IMDb ID.
    #[serde(rename = "IMDB_ID", deserialize_with = "empty_as_none")]
    pub imdb_id: Option<String>,
    /// Language abbreviation.
    #[serde(rename = "Language", deserialize_with = "empty_as_none")]
    pub language: Option<String>,
    /// Overview text.
    #[serde(rename = "Overview", deserialize_with = "empty_as_none")]
    pub overview: Option<String>,
    /// Production code.
    #[serde(rename = "ProductionCode", deserialize_with = "empty_as_none")]
    pub production_code: Option<String>,
    /// Average rating.
    #[serde(rename = "Rating", deserialize_with = "empty_as_none")]
    pub rating: Option<String>,
    /// Number of ratings.
    #[serde(rename = "RatingCount", deserialize_with = "empty_as_none_parsed")]
    pub rating_count: Option<u64>,
    /// Season number (0 for specials).
    #[serde(rename = "SeasonNumber")]
    pub season_number: u64,
    /// Writers.
    #[serde(rename = "Writer", deserialize_with = "pipe_list_text")]
    pub writer: Vec<String>,
    /// Absolute episode number.
    #[serde(rename = "absolute_number", deserialize_with = "empty_as_none_parsed")]
    pub absolute_number: Option<u64>,
    /// Thumbnail path.
    #[serde(deserialize_with = "empty_as_none")]
    pub filename: Option<String>,
    /// Last update instant.
    #[serde(rename = "lastupdated", deserialize_with = "unix_time_text")]
    pub last_updated: Option<DateTime<Utc>>,
    /// Season ID.
    #[serde(rename = "seasonid")]
    pub season_id: u64,
    /// Owning series ID.
    #[serde(rename = "seriesid")]
    pub series_id: u64,
    /// When the thumbnail was added.
    #[serde(deserialize_with = "empty_as_none")]
    pub thumb_added: Option<String>,
    /// Thumbnail height.
    #[serde(deserialize_with = "empty_as_none_parsed")]
    pub thumb_height: Option<u32>,
    /// Thumbnail width.
    #[serde(deserialize_with = "empty_as_none_parsed")]
    pub thumb_width: Option<u32>,
}

/// A series with all its episodes, grouped by season number.
#[derive(Debug, Clone, Default, PartialEq)]
#[allow(clippy::module_name_repetitions)]
pub struct LegacySeriesDetail {
    /// Series record.
    pub series: LegacySeries,
    /// Episodes keyed by season number, in document order within a season.
    pub seasons: BTreeMap<u64, Vec<LegacyEpisode>>,
}

impl LegacySeriesDetail {
    /// Groups `episodes` by season.
    #[must_use]
    pub fn new(series: LegacySeries, episodes: Vec<LegacyEpisode>) -> Self {
        let mut seasons: BTreeMap<u64, Vec<LegacyEpisode>> = BTreeMap::new();
        for episode in episodes {
            seasons.entry(episode.season_number).or_default().push(episode);
        }
        Self { series, seasons }
    }

    /// Total number of episodes across all seasons.
    #[must_use]
    pub fn episode_count(&self) -> usize {
        self.seasons.values().map(Vec::len).sum()
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::indexing_slicing)]

    use super::*;

    fn make_episode(id: u64, season_number: u64) -> LegacyEpisode {
        LegacyEpisode {
            id,
            season_number,
            ..LegacyEpisode::default()
        }
    }

    #[test]
    fn test_detail_groups_by_season_in_order() {
        // Arrange
        let episodes = vec![
            make_episode(1, 1),
            make_episode(2, 2),
            make_episode(3, 1),
            make_episode(4, 0),
        ];

        // Act
        let detail = LegacySeriesDetail::new(LegacySeries::default(), episodes);

        // Assert
        assert_eq!(detail.seasons.keys().copied().collect::<Vec<_>>(), vec![0, 1, 2]);
        assert_eq!(
            detail.seasons[&1].iter().map(|e| e.id).collect::<Vec<_>>(),
            vec![1, 3]
        );
        assert_eq!(detail.episode_count(), 4);
    }
}
