//! TheTVDB legacy XML API client module.
//!
//! Fetches `<Data>` documents keyed by API key in the URL path and decodes
//! series and episode records, including pipe-delimited lists.

mod client;
mod types;
pub(crate) mod xml;

#[allow(clippy::module_name_repetitions)]
pub use client::{LegacyClient, LegacyClientBuilder};
#[allow(clippy::module_name_repetitions)]
pub use types::{LegacyEpisode, LegacySeries, LegacySeriesDetail};
