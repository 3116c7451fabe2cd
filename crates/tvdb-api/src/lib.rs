//! API client library for TheTVDB.
//!
//! Provides a client for the token-authenticated JSON API and one for the
//! legacy XML API.

/// Field-level decoders for pipe lists and UNIX timestamps.
pub mod decode;

/// Error type shared by both clients.
pub mod error;

/// Legacy XML API client.
pub mod legacy;

/// JSON API client.
pub mod v2;

pub use error::{Result, TvdbError};
