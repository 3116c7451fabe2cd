//! `TvdbClient` - TheTVDB JSON API client implementation.

use std::time::Duration;

use chrono::{TimeDelta, Utc};
use reqwest::header::{ACCEPT_LANGUAGE, CONTENT_TYPE};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use tokio::sync::Mutex;
use tracing::instrument;
use url::Url;

use super::api::LocalTvdbApi;
use super::auth::AuthAction;
use super::series::SeriesHandle;
use super::token::Token;
use super::types::{
    Actor, DataEnvelope, Episode, ErrorResponse, Image, Language, LoginRequest, SearchParamsData,
    SearchSeriesParams, Series, TokenResponse,
};
use crate::error::{Result, TvdbError};

/// Default base URL for TheTVDB JSON API.
const DEFAULT_BASE_URL: &str = "https://api.thetvdb.com/";

/// Default `Accept-Language`.
const DEFAULT_LANGUAGE: &str = "en";

/// Default per-request timeout.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default lookahead before expiry in which the token is refreshed.
const DEFAULT_REFRESH_WINDOW: Duration = Duration::from_secs(5 * 60);

/// Default cap on episode pages fetched by one pagination run.
pub const DEFAULT_MAX_EPISODE_PAGES: u32 = 1_000;

/// TheTVDB JSON API client.
///
/// Holds the API key and the current bearer token. The token slot is
/// guarded by a mutex held across the whole check-then-renew sequence, so a
/// shared client renews at most once per expiry even under concurrent use.
#[derive(Debug)]
#[allow(clippy::module_name_repetitions)]
pub struct TvdbClient {
    /// HTTP client.
    http_client: Client,
    /// Base URL for API requests.
    base_url: Url,
    /// API key posted to `/login`.
    api_key: String,
    /// `Accept-Language` sent with authenticated requests.
    language: String,
    /// Refresh lookahead.
    refresh_window: TimeDelta,
    /// Pagination cap for `episodes()`.
    max_episode_pages: u32,
    /// Current token, `None` until the first login.
    token: Mutex<Option<Token>>,
}

/// Builder for `TvdbClient`.
#[derive(Debug)]
#[allow(clippy::module_name_repetitions)]
pub struct TvdbClientBuilder {
    base_url: Option<Url>,
    api_key: Option<String>,
    user_agent: Option<String>,
    language: Option<String>,
    timeout: Option<Duration>,
    refresh_window: Option<Duration>,
    max_episode_pages: Option<u32>,
    token: Option<Token>,
}

impl TvdbClientBuilder {
    /// Creates a new builder.
    const fn new() -> Self {
        Self {
            base_url: None,
            api_key: None,
            user_agent: None,
            language: None,
            timeout: None,
            refresh_window: None,
            max_episode_pages: None,
            token: None,
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

    /// Sets the response language (default: `en`).
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

    /// Sets the refresh lookahead (default: 5 minutes).
    #[must_use]
    pub const fn refresh_window(mut self, window: Duration) -> Self {
        self.refresh_window = Some(window);
        self
    }

    /// Sets the episode pagination cap (default: 1,000 pages).
    #[must_use]
    pub const fn max_episode_pages(mut self, pages: u32) -> Self {
        self.max_episode_pages = Some(pages);
        self
    }

    /// Starts the client with an already issued token.
    #[must_use]
    pub fn token(mut self, token: Token) -> Self {
        self.token = Some(token);
        self
    }

    /// Builds the client.
    ///
    /// # Errors
    ///
    /// - `api_key` is not set.
    /// - `refresh_window` does not fit a signed duration.
    /// - `reqwest::Client` build fails.
    pub fn build(self) -> Result<TvdbClient> {
        let api_key = self.api_key.ok_or(TvdbError::Builder("api_key is required"))?;

        let base_url = if let Some(url) = self.base_url {
            url
        } else {
            Url::parse(DEFAULT_BASE_URL)?
        };

        let refresh_window =
            TimeDelta::from_std(self.refresh_window.unwrap_or(DEFAULT_REFRESH_WINDOW))
                .map_err(|_| TvdbError::Builder("refresh_window is out of range"))?;

        let user_agent = self
            .user_agent
            .unwrap_or_else(|| String::from(concat!("tvdb-api/", env!("CARGO_PKG_VERSION"))));

        let http_client = Client::builder()
            .user_agent(&user_agent)
            .timeout(self.timeout.unwrap_or(DEFAULT_TIMEOUT))
            .gzip(true)
            .build()?;

        Ok(TvdbClient {
            http_client,
            base_url,
            api_key,
            language: self
                .language
                .unwrap_or_else(|| String::from(DEFAULT_LANGUAGE)),
            refresh_window,
            max_episode_pages: self.max_episode_pages.unwrap_or(DEFAULT_MAX_EPISODE_PAGES),
            token: Mutex::new(self.token),
        })
    }
}

/// Extracts the server's `{"Error": ...}` message, or returns the raw body.
fn error_message(body: String) -> String {
    serde_json::from_str::<ErrorResponse>(&body).map_or(body, |e| e.error)
}

/// Decodes a JSON body, tagging failures with the endpoint path.
fn decode_json<T: DeserializeOwned>(body: &str, path: &str) -> Result<T> {
    serde_json::from_str(body).map_err(|source| TvdbError::Decode {
        endpoint: String::from(path),
        source,
    })
}

/// Reads the full body, mapping non-success statuses to errors.
async fn read_body(response: Response) -> Result<String> {
    let status = response.status();
    let body = response.text().await?;

    if status.is_success() {
        return Ok(body);
    }

    let message = error_message(body);
    if status == StatusCode::UNAUTHORIZED {
        return Err(TvdbError::Authentication {
            status: status.as_u16(),
            message,
        });
    }
    Err(TvdbError::Api {
        status: status.as_u16(),
        message,
    })
}

impl TvdbClient {
    /// Creates a new builder.
    #[must_use]
    pub const fn builder() -> TvdbClientBuilder {
        TvdbClientBuilder::new()
    }

    /// Pagination cap used by [`SeriesHandle::episodes`].
    #[must_use]
    pub const fn max_episode_pages(&self) -> u32 {
        self.max_episode_pages
    }

    /// Returns a copy of the current token, if any.
    pub async fn token(&self) -> Option<Token> {
        self.token.lock().await.clone()
    }

    /// Fetches a series and binds it to this client.
    ///
    /// # Errors
    ///
    /// Returns an error if authentication, the HTTP request or JSON decoding fails.
    pub async fn series(&self, id: u64) -> Result<SeriesHandle<'_>> {
        let series = self.series_by_id(id).await?;
        Ok(SeriesHandle::new(self, series))
    }

    /// Binds an already fetched series (e.g. a search result) to this client.
    #[must_use]
    pub const fn attach(&self, series: Series) -> SeriesHandle<'_> {
        SeriesHandle::new(self, series)
    }

    /// Logs in with the API key and replaces the stored token.
    ///
    /// # Errors
    ///
    /// Returns an error if the login is rejected or the response cannot be
    /// decoded. The stored token is left unchanged on failure.
    #[instrument(skip_all)]
    pub async fn login(&self) -> Result<()> {
        let mut slot = self.token.lock().await;
        let token = self.request_login_token().await?;
        *slot = Some(token);
        Ok(())
    }

    /// Refreshes the stored token.
    ///
    /// Falls back to [`TvdbClient::login`] when there is no token or it has
    /// already expired.
    ///
    /// # Errors
    ///
    /// Returns an error if the refresh or login fails. The stored token is
    /// left unchanged on failure.
    #[instrument(skip_all)]
    pub async fn refresh_token(&self) -> Result<()> {
        let mut slot = self.token.lock().await;
        let token = self.renew(slot.as_ref(), AuthAction::Refresh).await?;
        *slot = Some(token);
        Ok(())
    }

    /// Makes sure a usable token is stored and returns it for the
    /// `Authorization` header.
    ///
    /// Logs in when there is no token or it has expired, refreshes when it
    /// expires within the refresh window, and does nothing otherwise.
    ///
    /// # Errors
    ///
    /// Returns an error if the login or refresh fails. The stored token is
    /// left unchanged on failure.
    #[instrument(skip_all)]
    pub async fn ensure_authenticated(&self) -> Result<String> {
        let mut slot = self.token.lock().await;
        let action = AuthAction::decide(slot.as_ref(), Utc::now(), self.refresh_window);

        if let (AuthAction::None, Some(token)) = (action, slot.as_ref()) {
            return Ok(String::from(token.as_str()));
        }

        let token = self.renew(slot.as_ref(), action).await?;
        let bearer = String::from(token.as_str());
        *slot = Some(token);
        Ok(bearer)
    }

    /// Obtains a replacement token without touching the stored one.
    async fn renew(&self, current: Option<&Token>, action: AuthAction) -> Result<Token> {
        match (action, current) {
            (AuthAction::Refresh, Some(current)) if !current.is_expired(Utc::now()) => {
                self.request_refreshed_token(current).await
            }
            _ => self.request_login_token().await,
        }
    }

    /// Joins a path onto the base URL.
    fn endpoint(&self, path: &str) -> Result<Url> {
        Ok(self.base_url.join(path)?)
    }

    /// Starts a request with the headers every call carries.
    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        self.http_client
            .request(method, url)
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT_LANGUAGE, self.language.as_str())
    }

    /// POSTs the API key to `/login` and decodes the issued token.
    async fn request_login_token(&self) -> Result<Token> {
        let path = "login";
        let url = self.endpoint(path)?;
        tracing::debug!(url = %url, "TheTVDB login request");

        let response = self
            .request(Method::POST, url)
            .json(&LoginRequest {
                apikey: &self.api_key,
            })
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(TvdbError::Authentication {
                status: status.as_u16(),
                message: error_message(body),
            });
        }

        let issued: TokenResponse = decode_json(&body, path)?;
        let token = Token::decode(&issued.token)?;
        tracing::info!(expires_at = %token.expires_at(), "Logged in to TheTVDB");
        Ok(token)
    }

    /// GETs `/refresh_token` using `current` as the bearer credential.
    async fn request_refreshed_token(&self, current: &Token) -> Result<Token> {
        let path = "refresh_token";
        let url = self.endpoint(path)?;
        tracing::debug!(url = %url, "TheTVDB token refresh request");

        let response = self
            .request(Method::GET, url)
            .bearer_auth(current.as_str())
            .send()
            .await?;
        let body = read_body(response).await?;

        let issued: TokenResponse = decode_json(&body, path)?;
        let token = Token::decode(&issued.token)?;
        tracing::info!(expires_at = %token.expires_at(), "Refreshed TheTVDB token");
        Ok(token)
    }

    /// Sends an authenticated GET and unwraps the `{"data": ...}` envelope.
    #[instrument(skip_all, fields(path = %path))]
    async fn get_data<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<T> {
        let bearer = self.ensure_authenticated().await?;
        let url = self.endpoint(path)?;

        let request = self
            .request(Method::GET, url)
            .bearer_auth(bearer)
            .query(query)
            .build()?;

        tracing::debug!(url = %request.url(), "TheTVDB API request");

        let response = self.http_client.execute(request).await?;
        let body = read_body(response).await?;
        let envelope: DataEnvelope<T> = decode_json(&body, path)?;
        Ok(envelope.data)
    }
}

impl LocalTvdbApi for TvdbClient {
    #[instrument(skip_all)]
    async fn series_by_id(&self, id: u64) -> Result<Series> {
        self.get_data(&format!("series/{id}"), &[]).await
    }

    #[instrument(skip_all)]
    async fn series_episodes_page(&self, series_id: u64, page: u32) -> Result<Vec<Episode>> {
        let query = [("page", page.to_string())];
        self.get_data(&format!("series/{series_id}/episodes"), &query)
            .await
    }

    #[instrument(skip_all)]
    async fn series_actors(&self, series_id: u64) -> Result<Vec<Actor>> {
        self.get_data(&format!("series/{series_id}/actors"), &[])
            .await
    }

    #[instrument(skip_all)]
    async fn series_images(&self, series_id: u64) -> Result<Image> {
        self.get_data(&format!("series/{series_id}/images"), &[])
            .await
    }

    #[instrument(skip_all)]
    async fn languages(&self) -> Result<Vec<Language>> {
        self.get_data("languages", &[]).await
    }

    #[instrument(skip_all)]
    async fn language_by_id(&self, id: u64) -> Result<Language> {
        self.get_data(&format!("languages/{id}"), &[]).await
    }

    #[instrument(skip_all)]
    async fn search_series_params(&self) -> Result<Vec<String>> {
        let data: SearchParamsData = self.get_data("search/series/params", &[]).await?;
        Ok(data.params)
    }

    #[instrument(skip_all)]
    async fn search_series(&self, params: &SearchSeriesParams) -> Result<Vec<Series>> {
        self.get_data("search/series", &params.to_query()).await
    }
}
