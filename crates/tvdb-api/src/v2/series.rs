//! Series bound to the client that fetched it.

use std::ops::Deref;

use super::api::LocalTvdbApi;
use super::client::TvdbClient;
use super::types::{Actor, Episode, Image, Series};
use super::util::lookup_all_episodes;
use crate::error::Result;

/// A [`Series`] paired with a borrowed [`TvdbClient`], so it can fetch its
/// own episodes, actors and images.
///
/// Dereferences to the underlying [`Series`].
#[derive(Debug)]
pub struct SeriesHandle<'c> {
    client: &'c TvdbClient,
    series: Series,
}

impl<'c> SeriesHandle<'c> {
    /// Pairs a series with a client.
    pub(crate) const fn new(client: &'c TvdbClient, series: Series) -> Self {
        Self { client, series }
    }

    /// The series record.
    #[must_use]
    pub const fn series(&self) -> &Series {
        &self.series
    }

    /// Drops the client association and returns the series record.
    #[must_use]
    pub fn into_inner(self) -> Series {
        self.series
    }

    /// Fetches every episode, following pages until an empty one.
    ///
    /// # Errors
    ///
    /// Returns an error if any page request fails or the client's page cap
    /// is exceeded.
    pub async fn episodes(&self) -> Result<Vec<Episode>> {
        lookup_all_episodes(self.client, self.series.id, self.client.max_episode_pages()).await
    }

    /// Fetches one page of episodes (pages start at 1).
    ///
    /// # Errors
    ///
    /// Returns an error if authentication, the HTTP request or JSON decoding fails.
    pub async fn episodes_page(&self, page: u32) -> Result<Vec<Episode>> {
        self.client.series_episodes_page(self.series.id, page).await
    }

    /// Fetches the series' actors.
    ///
    /// # Errors
    ///
    /// Returns an error if authentication, the HTTP request or JSON decoding fails.
    pub async fn actors(&self) -> Result<Vec<Actor>> {
        self.client.series_actors(self.series.id).await
    }

    /// Fetches the series' image counts.
    ///
    /// # Errors
    ///
    /// Returns an error if authentication, the HTTP request or JSON decoding fails.
    pub async fn images(&self) -> Result<Image> {
        self.client.series_images(self.series.id).await
    }
}

impl Deref for SeriesHandle<'_> {
    type Target = Series;

    fn deref(&self) -> &Series {
        &self.series
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::indexing_slicing)]

    use chrono::Utc;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;
    use crate::error::TvdbError;
    use crate::v2::token::tests::make_token;

    async fn setup() -> (MockServer, TvdbClient) {
        let mock_server = MockServer::start().await;
        let token = make_token(Utc::now().timestamp() + 3600);
        Mock::given(method("POST"))
            .and(path("/login"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "token": token })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = TvdbClient::builder()
            .base_url(format!("{}/", mock_server.uri()).parse().unwrap())
            .api_key("TESTKEY")
            .build()
            .unwrap();
        (mock_server, client)
    }

    fn episodes_body(ids: &[u64]) -> serde_json::Value {
        let data: Vec<serde_json::Value> = ids
            .iter()
            .map(|id| json!({ "id": id, "seriesId": 71663 }))
            .collect();
        json!({ "data": data })
    }

    async fn mount_page(server: &MockServer, page: &str, template: ResponseTemplate) {
        Mock::given(method("GET"))
            .and(path("/series/71663/episodes"))
            .and(query_param("page", page))
            .respond_with(template)
            .expect(1)
            .mount(server)
            .await;
    }

    #[tokio::test]
    async fn test_series_handle_derefs_to_series() {
        // Arrange
        let (mock_server, client) = setup().await;
        let json_body = include_str!("../../../../fixtures/v2/series_71663.json");
        Mock::given(method("GET"))
            .and(path("/series/71663"))
            .respond_with(ResponseTemplate::new(200).set_body_string(json_body))
            .mount(&mock_server)
            .await;

        // Act
        let handle = client.series(71663).await.unwrap();

        // Assert
        assert_eq!(handle.id, 71663);
        assert_eq!(handle.series().series_name, "The Simpsons");
        assert_eq!(handle.into_inner().genres, vec!["Animation", "Comedy"]);
    }

    #[tokio::test]
    async fn test_episodes_follows_pages_until_empty() {
        // Arrange
        let (mock_server, client) = setup().await;
        mount_page(&mock_server, "1", ResponseTemplate::new(200).set_body_json(episodes_body(&[1, 2]))).await;
        mount_page(&mock_server, "2", ResponseTemplate::new(200).set_body_json(episodes_body(&[3, 4]))).await;
        mount_page(&mock_server, "3", ResponseTemplate::new(200).set_body_json(episodes_body(&[]))).await;

        let handle = client.attach(Series {
            id: 71663,
            ..Series::default()
        });

        // Act
        let episodes = handle.episodes().await.unwrap();

        // Assert
        assert_eq!(
            episodes.iter().map(|e| e.id).collect::<Vec<_>>(),
            vec![1, 2, 3, 4]
        );
    }

    #[tokio::test]
    async fn test_episodes_treats_not_found_page_as_end() {
        // Arrange
        let (mock_server, client) = setup().await;
        let json_body = include_str!("../../../../fixtures/v2/episodes_71663_page1.json");
        mount_page(&mock_server, "1", ResponseTemplate::new(200).set_body_string(json_body)).await;
        mount_page(
            &mock_server,
            "2",
            ResponseTemplate::new(404).set_body_string(r#"{"Error":"No results for your query"}"#),
        )
        .await;

        let handle = client.attach(Series {
            id: 71663,
            ..Series::default()
        });

        // Act
        let episodes = handle.episodes().await.unwrap();

        // Assert
        assert_eq!(episodes.len(), 2);
        assert_eq!(episodes[0].director, vec!["David Silverman"]);
        assert_eq!(episodes[1].director, vec!["Wes Archer", "Rich Moore"]);
    }

    #[tokio::test]
    async fn test_episodes_respects_client_page_cap() {
        // Arrange
        let mock_server = MockServer::start().await;
        let token = make_token(Utc::now().timestamp() + 3600);
        Mock::given(method("POST"))
            .and(path("/login"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "token": token })))
            .mount(&mock_server)
            .await;
        Mock::given(method("GET"))
            .and(path("/series/71663/episodes"))
            .respond_with(ResponseTemplate::new(200).set_body_json(episodes_body(&[1])))
            .expect(4)
            .mount(&mock_server)
            .await;

        let client = TvdbClient::builder()
            .base_url(format!("{}/", mock_server.uri()).parse().unwrap())
            .api_key("TESTKEY")
            .max_episode_pages(3)
            .build()
            .unwrap();
        let handle = client.attach(Series {
            id: 71663,
            ..Series::default()
        });

        // Act
        let result = handle.episodes().await;

        // Assert
        assert!(matches!(result, Err(TvdbError::InvalidResponse(_))));
    }

    #[tokio::test]
    async fn test_actors_and_images() {
        // Arrange
        let (mock_server, client) = setup().await;
        let actors_body = include_str!("../../../../fixtures/v2/actors_71663.json");
        Mock::given(method("GET"))
            .and(path("/series/71663/actors"))
            .respond_with(ResponseTemplate::new(200).set_body_string(actors_body))
            .mount(&mock_server)
            .await;
        Mock::given(method("GET"))
            .and(path("/series/71663/images"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"{"data":{"fanart":12,"poster":30,"season":40,"seasonwide":5,"series":9}}"#,
            ))
            .mount(&mock_server)
            .await;

        let handle = client.attach(Series {
            id: 71663,
            ..Series::default()
        });

        // Act
        let actors = handle.actors().await.unwrap();
        let images = handle.images().await.unwrap();

        // Assert
        assert_eq!(actors.len(), 2);
        assert_eq!(
            actors[1].role,
            vec!["Bart Simpson", "Nelson Muntz", "Ralph Wiggum"]
        );
        assert_eq!(images.poster, 30);
        assert_eq!(images.series, 9);
    }

    #[tokio::test]
    async fn test_episodes_page_single_request() {
        // Arrange
        let (mock_server, client) = setup().await;
        mount_page(&mock_server, "2", ResponseTemplate::new(200).set_body_json(episodes_body(&[7]))).await;

        let handle = client.attach(Series {
            id: 71663,
            ..Series::default()
        });

        // Act
        let episodes = handle.episodes_page(2).await.unwrap();

        // Assert
        assert_eq!(episodes.len(), 1);
        assert_eq!(episodes[0].series_id, 71663);
    }
}
