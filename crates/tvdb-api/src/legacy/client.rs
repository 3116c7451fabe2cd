//! `LegacyClient` - TheTVDB legacy XML API client implementation.

use std::time::Duration;

use reqwest::Client;
use tracing::instrument;
use url::Url;

use super::types::{LegacySeries, LegacySeriesDetail};
use super::xml::DataResponse;
use crate::error::{Result, TvdbError};

/// Default base URL for the legacy XML API.
const DEFAULT_BASE_URL: &str = "https://thetvdb.com/";

/// Default language of series documents.
const DEFAULT_LANGUAGE: &str = "en";

/// Default per-request timeout.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// TheTVDB legacy XML API client.
///
/// Authenticates by API key in the URL path; there is no token.
#[derive(Debug)]
#[allow(clippy::module_name_repetitions)]
pub struct LegacyClient {
    /// HTTP client.
    http_client: Client,
    /// Base URL.
    base_url: Url,
    /// API key embedded in series document paths.
    api_key: String,
    /// Language of series documents.
    language: String,
}

/// Builder for `LegacyClient`.
#[derive(Debug)]
#[allow(clippy::module_name_repetitions)]
pub struct LegacyClientBuilder {
    base_url: Option<Url>,
    api_key: Option<String>,
    user_agent: Option<String>,
    language: Option<String>,
    timeout: Option<Duration>,
}

impl LegacyClientBuilder {
    /// Creates a new builder.
    const fn new() -> Self {
        Self {
            base_url: None,
            api_key: None,
            user_agent: None,
            language: None,
            timeout: None,
        }
    }

    /// Overrides the base URL (for wiremock in tests). Must end with `/`.
    #[must_use]
    pub fn base_url(mut self, url: Url) -> Self {
        self.base_url = Some(url);
        self
    }

    /// Sets the API key (required).
    #[must_use]
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// Sets the User-Agent (default: `tvdb-api/<version>`).
    #[must_use]
    pub fn user_agent(mut self, ua: impl Into<String>) -> Self {
        self.user_agent = Some(ua.into());
        self
    }

    /// Sets the document language (default: `en`).
    #[must_use]
    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    /// Sets the per-request timeout (default: 30s).
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Builds the client.
    ///
    /// # Errors
    ///
    /// - `api_key` is not set, or is not a single path segment.
    /// - `language` is not a single path segment.
    /// - `reqwest::Client` build fails.
    pub fn build(self) -> Result<LegacyClient> {
        let api_key = self.api_key.ok_or(TvdbError::Builder("api_key is required"))?;
        if !is_path_segment(&api_key) {
            return Err(TvdbError::Builder(
                "api_key must only contain ASCII letters, digits, '-' or '_'",
            ));
        }

        let language = self
            .language
            .unwrap_or_else(|| String::from(DEFAULT_LANGUAGE));
        if !is_path_segment(&language) {
            return Err(TvdbError::Builder(
                "language must only contain ASCII letters, digits, '-' or '_'",
            ));
        }

        let base_url = if let Some(url) = self.base_url {
            url
        } else {
            Url::parse(DEFAULT_BASE_URL)?
        };

        let user_agent = self
            .user_agent
            .unwrap_or_else(|| String::from(concat!("tvdb-api/", env!("CARGO_PKG_VERSION"))));

        let http_client = Client::builder()
            .user_agent(&user_agent)
            .timeout(self.timeout.unwrap_or(DEFAULT_TIMEOUT))
            .gzip(true)
            .build()?;

        Ok(LegacyClient {
            http_client,
            base_url,
            api_key,
            language,
        })
    }
}

/// Whether `value` can be placed in a URL path without changing its shape.
fn is_path_segment(value: &str) -> bool {
    !value.is_empty()
        && value
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}

/// Unwraps a document that must hold exactly one series.
fn exactly_one(series: Vec<LegacySeries>, what: &str) -> Result<LegacySeries> {
    match <[LegacySeries; 1]>::try_from(series) {
        Ok([one]) => Ok(one),
        Err(rest) => Err(TvdbError::InvalidResponse(format!(
            "incorrect number of series for {what}: got {}",
            rest.len()
        ))),
    }
}

impl LegacyClient {
    /// Creates a new builder.
    #[must_use]
    pub const fn builder() -> LegacyClientBuilder {
        LegacyClientBuilder::new()
    }

    /// Parses a `<Data>` document.
    pub(crate) fn parse_data_response(xml: &str, endpoint: &str) -> Result<DataResponse> {
        quick_xml::de::from_str(xml).map_err(|source| TvdbError::XmlDecode {
            endpoint: String::from(endpoint),
            source,
        })
    }

    /// Sends a GET and parses the `<Data>` document.
    ///
    /// `endpoint` names the request in logs and errors without the API key.
    async fn get_data(
        &self,
        url: Url,
        query: &[(&str, &str)],
        endpoint: &str,
    ) -> Result<DataResponse> {
        tracing::debug!(endpoint = %endpoint, "TheTVDB legacy API request");

        let response = self.http_client.get(url).query(query).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(TvdbError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        Self::parse_data_response(&body, endpoint)
    }

    /// URL of a keyed series document (`api/{key}/series/{id}/...`).
    fn series_url(&self, id: u64, document: &str) -> Result<Url> {
        Ok(self
            .base_url
            .join(&format!("api/{}/series/{id}/{document}", self.api_key))?)
    }

    /// Searches series by name.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP request or XML decoding fails.
    #[instrument(skip_all)]
    pub async fn search_series(&self, name: &str) -> Result<Vec<LegacySeries>> {
        let url = self.base_url.join("api/GetSeries.php")?;
        let data = self
            .get_data(url, &[("seriesname", name)], "GetSeries.php")
            .await?;
        Ok(data.series)
    }

    /// Fetches the base record of a series.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP request or XML decoding fails, or
    /// [`TvdbError::InvalidResponse`] unless the document holds exactly one series.
    #[instrument(skip_all)]
    pub async fn series_by_id(&self, id: u64) -> Result<LegacySeries> {
        let document = format!("{}.xml", self.language);
        let url = self.series_url(id, &document)?;
        let data = self
            .get_data(url, &[], &format!("series/{id}/{document}"))
            .await?;
        exactly_one(data.series, &format!("series ID {id}"))
    }

    /// Fetches the series carrying an IMDb ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP request or XML decoding fails, or
    /// [`TvdbError::InvalidResponse`] unless exactly one series matches.
    #[instrument(skip_all)]
    pub async fn series_by_imdb_id(&self, imdb_id: &str) -> Result<LegacySeries> {
        let url = self.base_url.join("api/GetSeriesByRemoteID.php")?;
        let data = self
            .get_data(url, &[("imdbid", imdb_id)], "GetSeriesByRemoteID.php")
            .await?;
        exactly_one(data.series, &format!("IMDb ID {imdb_id}"))
    }

    /// Fetches a series with all its episodes grouped by season.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP request or XML decoding fails, or
    /// [`TvdbError::InvalidResponse`] unless the document holds exactly one series.
    #[instrument(skip_all)]
    pub async fn series_detail(&self, id: u64) -> Result<LegacySeriesDetail> {
        let document = format!("all/{}.xml", self.language);
        let url = self.series_url(id, &document)?;
        let data = self
            .get_data(url, &[], &format!("series/{id}/{document}"))
            .await?;

        let series = exactly_one(data.series, &format!("series ID {id}"))?;
        let detail = LegacySeriesDetail::new(series, data.episodes);

        tracing::debug!(
            series_id = id,
            seasons = detail.seasons.len(),
            episodes = detail.episode_count(),
            "legacy series detail parsed"
        );

        Ok(detail)
    }
}
