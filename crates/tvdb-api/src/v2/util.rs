//! TheTVDB JSON API utility functions.

use tracing::instrument;

use super::api::LocalTvdbApi;
use super::types::{Episode, SearchSeriesParams, Series};
use crate::error::{Result, TvdbError};

/// Fetches every episode of a series, requesting pages 1, 2, ... until the
/// API returns an empty page.
///
/// A 404 for any page after the first is treated as the end of the list.
/// At most `max_pages + 1` pages are requested: the last one may only be the
/// empty (or missing) terminator.
///
/// # Errors
///
/// Returns an error if any page request fails, or
/// [`TvdbError::InvalidResponse`] if more than `max_pages` non-empty pages
/// are returned.
#[instrument(skip_all, fields(series_id = series_id))]
pub async fn lookup_all_episodes(
    api: &(impl LocalTvdbApi + Sync),
    series_id: u64,
    max_pages: u32,
) -> Result<Vec<Episode>> {
    let mut all_episodes: Vec<Episode> = Vec::new();
    let mut page: u32 = 0;

    loop {
        page = page
            .checked_add(1)
            .ok_or_else(|| TvdbError::InvalidResponse(String::from("page counter overflow")))?;

        let episodes = match api.series_episodes_page(series_id, page).await {
            Ok(episodes) => episodes,
            Err(TvdbError::Api { status: 404, .. }) if page > 1 => {
                tracing::debug!(page = page, "episode page not found, treating as last page");
                break;
            }
            Err(e) => return Err(e),
        };

        tracing::debug!(page = page, fetched = episodes.len(), "episode page completed");

        if episodes.is_empty() {
            break;
        }
        if page > max_pages {
            return Err(TvdbError::InvalidResponse(format!(
                "series {series_id} returned more than {max_pages} episode pages"
            )));
        }
        all_episodes.extend(episodes);
    }

    tracing::info!(
        total = all_episodes.len(),
        pages = page,
        "episode pagination completed"
    );

    Ok(all_episodes)
}

/// Finds the single series carrying the given IMDb ID.
///
/// # Errors
///
/// Returns an error if the search fails, or
/// [`TvdbError::InvalidResponse`] unless exactly one series matches.
#[instrument(skip_all)]
pub async fn find_series_by_imdb_id(
    api: &(impl LocalTvdbApi + Sync),
    imdb_id: &str,
) -> Result<Series> {
    let mut results = api
        .search_series(&SearchSeriesParams::by_imdb_id(imdb_id))
        .await?;

    if results.len() != 1 {
        return Err(TvdbError::InvalidResponse(format!(
            "expected exactly one series for IMDb ID {imdb_id}, got {}",
            results.len()
        )));
    }

    results
        .pop()
        .ok_or_else(|| TvdbError::InvalidResponse(format!("no series for IMDb ID {imdb_id}")))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::indexing_slicing)]

    use std::sync::atomic::{AtomicU32, Ordering};

    use super::*;
    use crate::v2::types::{Actor, Image, Language};

    /// Mock API that returns pre-configured episode pages in order.
    ///
    /// Pages past the configured batches fail with `past_end_status`, or are
    /// empty when it is `None`.
    struct MockTvdbApi {
        batches: Vec<Vec<Episode>>,
        past_end_status: Option<u16>,
        search_results: Vec<Series>,
        call_count: AtomicU32,
    }

    impl MockTvdbApi {
        fn new(batches: Vec<Vec<Episode>>) -> Self {
            Self {
                batches,
                past_end_status: None,
                search_results: vec![],
                call_count: AtomicU32::new(0),
            }
        }

        fn with_search_results(search_results: Vec<Series>) -> Self {
            Self {
                search_results,
                ..Self::new(vec![])
            }
        }
    }

    impl LocalTvdbApi for MockTvdbApi {
        async fn series_by_id(&self, id: u64) -> Result<Series> {
            Ok(Series {
                id,
                ..Series::default()
            })
        }

        async fn series_episodes_page(&self, _series_id: u64, page: u32) -> Result<Vec<Episode>> {
            self.call_count.fetch_add(1, Ordering::SeqCst);
            #[allow(clippy::as_conversions)]
            let idx = (page - 1) as usize;
            if idx < self.batches.len() {
                return Ok(self.batches[idx].clone());
            }
            match self.past_end_status {
                Some(status) => Err(TvdbError::Api {
                    status,
                    message: String::from("Resource not found"),
                }),
                None => Ok(vec![]),
            }
        }

        async fn series_actors(&self, _series_id: u64) -> Result<Vec<Actor>> {
            Ok(vec![])
        }

        async fn series_images(&self, _series_id: u64) -> Result<Image> {
            Ok(Image::default())
        }

        async fn languages(&self) -> Result<Vec<Language>> {
            Ok(vec![])
        }

        async fn language_by_id(&self, id: u64) -> Result<Language> {
            Ok(Language {
                id,
                ..Language::default()
            })
        }

        async fn search_series_params(&self) -> Result<Vec<String>> {
            Ok(vec![])
        }

        async fn search_series(&self, _params: &SearchSeriesParams) -> Result<Vec<Series>> {
            Ok(self.search_results.clone())
        }
    }

    fn make_episode(id: u64) -> Episode {
        Episode {
            id,
            series_id: 71663,
            ..Episode::default()
        }
    }

    fn make_series(id: u64) -> Series {
        Series {
            id,
            imdb_id: Some(String::from("tt0096697")),
            ..Series::default()
        }
    }

    #[tokio::test]
    async fn test_lookup_all_episodes_stops_at_empty_page() {
        // Arrange
        let mock = MockTvdbApi::new(vec![
            vec![make_episode(1), make_episode(2)],
            vec![make_episode(3), make_episode(4)],
            vec![],
        ]);

        // Act
        let result = lookup_all_episodes(&mock, 71663, 1_000).await.unwrap();

        // Assert
        assert_eq!(result.len(), 4);
        assert_eq!(
            result.iter().map(|e| e.id).collect::<Vec<_>>(),
            vec![1, 2, 3, 4]
        );
        assert_eq!(mock.call_count.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_lookup_all_episodes_empty_first_page() {
        // Arrange
        let mock = MockTvdbApi::new(vec![vec![]]);

        // Act
        let result = lookup_all_episodes(&mock, 71663, 1_000).await.unwrap();

        // Assert
        assert!(result.is_empty());
        assert_eq!(mock.call_count.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_lookup_all_episodes_not_found_after_first_page_ends() {
        // Arrange
        let mut mock = MockTvdbApi::new(vec![vec![make_episode(1)]]);
        mock.past_end_status = Some(404);

        // Act
        let result = lookup_all_episodes(&mock, 71663, 1_000).await.unwrap();

        // Assert
        assert_eq!(result.len(), 1);
        assert_eq!(mock.call_count.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_lookup_all_episodes_not_found_on_first_page_is_error() {
        // Arrange
        let mut mock = MockTvdbApi::new(vec![]);
        mock.past_end_status = Some(404);

        // Act
        let result = lookup_all_episodes(&mock, 71663, 1_000).await;

        // Assert
        assert!(matches!(result, Err(TvdbError::Api { status: 404, .. })));
    }

    #[tokio::test]
    async fn test_lookup_all_episodes_other_errors_propagate() {
        // Arrange
        let mut mock = MockTvdbApi::new(vec![vec![make_episode(1)]]);
        mock.past_end_status = Some(500);

        // Act
        let result = lookup_all_episodes(&mock, 71663, 1_000).await;

        // Assert
        assert!(matches!(result, Err(TvdbError::Api { status: 500, .. })));
    }

    #[tokio::test]
    async fn test_lookup_all_episodes_page_cap() {
        // Arrange: three non-empty pages, cap of two
        let mock = MockTvdbApi::new(vec![
            vec![make_episode(1)],
            vec![make_episode(2)],
            vec![make_episode(3)],
        ]);

        // Act
        let result = lookup_all_episodes(&mock, 71663, 2).await;

        // Assert
        assert!(matches!(result, Err(TvdbError::InvalidResponse(msg)) if msg.contains("more than 2")));
        assert_eq!(mock.call_count.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_lookup_all_episodes_exactly_at_page_cap() {
        // Arrange: two non-empty pages then the empty terminator, cap of two
        let mock = MockTvdbApi::new(vec![
            vec![make_episode(1)],
            vec![make_episode(2)],
            vec![],
        ]);

        // Act
        let episodes = lookup_all_episodes(&mock, 71663, 2).await.unwrap();

        // Assert
        assert_eq!(episodes.iter().map(|e| e.id).collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(mock.call_count.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_lookup_all_episodes_at_page_cap_ends_on_not_found() {
        // Arrange: two non-empty pages, page 3 is a 404, cap of two
        let mut mock = MockTvdbApi::new(vec![vec![make_episode(1)], vec![make_episode(2)]]);
        mock.past_end_status = Some(404);

        // Act
        let episodes = lookup_all_episodes(&mock, 71663, 2).await.unwrap();

        // Assert
        assert_eq!(episodes.len(), 2);
        assert_eq!(mock.call_count.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_find_series_by_imdb_id_single_match() {
        // Arrange
        let mock = MockTvdbApi::with_search_results(vec![make_series(71663)]);

        // Act
        let series = find_series_by_imdb_id(&mock, "tt0096697").await.unwrap();

        // Assert
        assert_eq!(series.id, 71663);
    }

    #[tokio::test]
    async fn test_find_series_by_imdb_id_wrong_cardinality() {
        // Arrange
        let none = MockTvdbApi::with_search_results(vec![]);
        let two = MockTvdbApi::with_search_results(vec![make_series(1), make_series(2)]);

        // Act
        let none_result = find_series_by_imdb_id(&none, "tt0096697").await;
        let two_result = find_series_by_imdb_id(&two, "tt0096697").await;

        // Assert
        assert!(matches!(none_result, Err(TvdbError::InvalidResponse(_))));
        assert!(matches!(two_result, Err(TvdbError::InvalidResponse(msg)) if msg.contains("got 2")));
    }
}
