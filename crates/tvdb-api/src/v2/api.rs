//! `TvdbApi` trait definition.
#![allow(clippy::future_not_send)]

use crate::error::Result;

use super::types::{Actor, Episode, Image, Language, SearchSeriesParams, Series};

/// TheTVDB JSON API trait.
///
/// Abstracts resource operations for mock substitution in tests.
/// Uses `trait_variant::make` to generate a `Send`-bound async trait.
/// Implementations authenticate on their own before each call.
#[allow(clippy::module_name_repetitions)]
#[trait_variant::make(TvdbApi: Send)]
pub trait LocalTvdbApi {
    /// Fetches a series by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if authentication, the HTTP request or JSON decoding fails.
    async fn series_by_id(&self, id: u64) -> Result<Series>;

    /// Fetches one page of a series' episodes (pages start at 1).
    ///
    /// # Errors
    ///
    /// Returns an error if authentication, the HTTP request or JSON decoding fails.
    async fn series_episodes_page(&self, series_id: u64, page: u32) -> Result<Vec<Episode>>;

    /// Fetches the actors of a series.
    ///
    /// # Errors
    ///
    /// Returns an error if authentication, the HTTP request or JSON decoding fails.
    async fn series_actors(&self, series_id: u64) -> Result<Vec<Actor>>;

    /// Fetches image counts of a series.
    ///
    /// # Errors
    ///
    /// Returns an error if authentication, the HTTP request or JSON decoding fails.
    async fn series_images(&self, series_id: u64) -> Result<Image>;

    /// Lists all languages.
    ///
    /// # Errors
    ///
    /// Returns an error if authentication, the HTTP request or JSON decoding fails.
    async fn languages(&self) -> Result<Vec<Language>>;

    /// Fetches a language by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if authentication, the HTTP request or JSON decoding fails.
    async fn language_by_id(&self, id: u64) -> Result<Language>;

    /// Lists the parameter names accepted by `search_series`.
    ///
    /// # Errors
    ///
    /// Returns an error if authentication, the HTTP request or JSON decoding fails.
    async fn search_series_params(&self) -> Result<Vec<String>>;

    /// Searches for series.
    ///
    /// # Errors
    ///
    /// Returns an error if authentication, the HTTP request or JSON decoding fails.
    async fn search_series(&self, params: &SearchSeriesParams) -> Result<Vec<Series>>;
}
