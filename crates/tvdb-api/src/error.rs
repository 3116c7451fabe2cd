//! Error types for TheTVDB clients.

use thiserror::Error;

/// Errors returned by the TheTVDB clients.
///
/// Every accessor hands these back to its caller unchanged; the library
/// never retries or recovers locally.
#[derive(Debug, Error)]
#[allow(clippy::module_name_repetitions)]
pub enum TvdbError {
    /// Network, DNS, connection, timeout or body-read failure.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// JSON body was malformed or had the wrong shape.
    #[error("failed to decode JSON response from {endpoint}: {source}")]
    Decode {
        /// Endpoint path the body came from.
        endpoint: String,
        /// Underlying parser error.
        #[source]
        source: serde_json::Error,
    },

    /// Legacy XML body was malformed or had the wrong shape.
    #[error("failed to decode XML response from {endpoint}: {source}")]
    XmlDecode {
        /// Endpoint path the body came from.
        endpoint: String,
        /// Underlying parser error.
        #[source]
        source: quick_xml::DeError,
    },

    /// Token string is not three valid segments.
    #[error("malformed token: {0}")]
    MalformedToken(String),

    /// Login was rejected or the server answered 401.
    #[error("authentication failed (HTTP {status}): {message}")]
    Authentication {
        /// HTTP status code.
        status: u16,
        /// Server supplied message, or the raw body.
        message: String,
    },

    /// Response had an unexpected cardinality.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// Any other non-success HTTP status.
    #[error("TheTVDB API error (HTTP {status}): {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Server supplied message, or the raw body.
        message: String,
    },

    /// Endpoint path could not be joined onto the base URL.
    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// Required builder field was missing.
    #[error("{0}")]
    Builder(&'static str),
}

impl TvdbError {
    /// Returns the HTTP status carried by the error, if any.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Authentication { status, .. } | Self::Api { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, TvdbError>;
