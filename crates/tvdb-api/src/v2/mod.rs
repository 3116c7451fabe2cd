//! TheTVDB JSON API client module.
//!
//! Authenticates with an API key, keeps the issued bearer token fresh and
//! decodes series, episode, actor, image and language resources.

mod api;
mod auth;
mod client;
mod series;
pub(crate) mod token;
mod types;
mod util;

#[allow(clippy::module_name_repetitions)]
pub use api::{LocalTvdbApi, TvdbApi};
pub use auth::AuthAction;
#[allow(clippy::module_name_repetitions)]
pub use client::{DEFAULT_MAX_EPISODE_PAGES, TvdbClient, TvdbClientBuilder};
pub use series::SeriesHandle;
pub use token::{Token, TokenClaims, TokenHeader, TokenState};
pub use types::{Actor, Episode, EpisodeLanguage, Image, Language, SearchSeriesParams, Series};
pub use util::{find_series_by_imdb_id, lookup_all_episodes};
