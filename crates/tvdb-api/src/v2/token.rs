//! Bearer token decoding and expiry checks.

use std::str::FromStr;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, TimeDelta, Utc};
use serde::Deserialize;

use crate::decode::{unix_time, unix_time_opt};
use crate::error::{Result, TvdbError};

/// Decoded token header.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TokenHeader {
    /// Signing algorithm (e.g. `RS256`).
    #[serde(default)]
    pub alg: String,
}

/// Decoded token claims.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TokenClaims {
    /// Original issue instant (`orig_iat`).
    #[serde(rename = "orig_iat", default, deserialize_with = "unix_time_opt")]
    pub issued_at: Option<DateTime<Utc>>,
    /// Expiry instant (`exp`).
    #[serde(rename = "exp", deserialize_with = "unix_time")]
    pub expires: DateTime<Utc>,
    /// Subject id.
    #[serde(default)]
    pub id: String,
}

/// Lifecycle state of a token at a given instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenState {
    /// Usable and outside the refresh window.
    Valid,
    /// Still usable, but expiry falls inside the refresh window.
    AboutToExpire,
    /// Past its expiry instant.
    Expired,
}

/// A bearer token as issued by `/login` or `/refresh_token`.
///
/// Replaced wholesale on every login or refresh, never mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    raw: String,
    header: TokenHeader,
    claims: TokenClaims,
    signature: Vec<u8>,
}

/// Decodes one base64 segment, accepting both alphabets, padded or not.
fn decode_segment(segment: &str, name: &str) -> Result<Vec<u8>> {
    let normalized: String = segment
        .trim_end_matches('=')
        .chars()
        .map(|c| match c {
            '+' => '-',
            '/' => '_',
            other => other,
        })
        .collect();
    URL_SAFE_NO_PAD
        .decode(normalized.as_bytes())
        .map_err(|e| TvdbError::MalformedToken(format!("{name} segment is not valid base64: {e}")))
}

impl Token {
    /// Decodes a `{header}.{claims}.{signature}` token string.
    ///
    /// # Errors
    ///
    /// Returns [`TvdbError::MalformedToken`] if the string does not have
    /// exactly three segments, a segment is not base64, or the header or
    /// claims segment is not the expected JSON.
    pub fn decode(raw: &str) -> Result<Self> {
        let segments: Vec<&str> = raw.split('.').collect();
        let [header, claims, signature] = segments.as_slice() else {
            return Err(TvdbError::MalformedToken(format!(
                "expected 3 segments, got {}",
                segments.len()
            )));
        };

        let header_bytes = decode_segment(header, "header")?;
        let claims_bytes = decode_segment(claims, "claims")?;
        let signature = decode_segment(signature, "signature")?;

        let header: TokenHeader = serde_json::from_slice(&header_bytes)
            .map_err(|e| TvdbError::MalformedToken(format!("header is not valid JSON: {e}")))?;
        let claims: TokenClaims = serde_json::from_slice(&claims_bytes)
            .map_err(|e| TvdbError::MalformedToken(format!("claims are not valid JSON: {e}")))?;

        Ok(Self {
            raw: String::from(raw),
            header,
            claims,
            signature,
        })
    }

    /// The encoded token, as sent in the `Authorization` header.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Decoded header.
    #[must_use]
    pub const fn header(&self) -> &TokenHeader {
        &self.header
    }

    /// Decoded claims.
    #[must_use]
    pub const fn claims(&self) -> &TokenClaims {
        &self.claims
    }

    /// Raw signature bytes.
    #[must_use]
    pub fn signature(&self) -> &[u8] {
        &self.signature
    }

    /// Expiry instant.
    #[must_use]
    pub const fn expires_at(&self) -> DateTime<Utc> {
        self.claims.expires
    }

    /// `true` iff `now >= exp`.
    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.claims.expires
    }

    /// `true` iff the token is not expired and expires within `window`.
    #[must_use]
    pub fn is_about_to_expire(&self, now: DateTime<Utc>, window: TimeDelta) -> bool {
        !self.is_expired(now) && self.claims.expires.signed_duration_since(now) <= window
    }

    /// Classifies the token at `now`.
    #[must_use]
    pub fn state(&self, now: DateTime<Utc>, window: TimeDelta) -> TokenState {
        if self.is_expired(now) {
            TokenState::Expired
        } else if self.is_about_to_expire(now, window) {
            TokenState::AboutToExpire
        } else {
            TokenState::Valid
        }
    }
}

impl FromStr for Token {
    type Err = TvdbError;

    fn from_str(s: &str) -> Result<Self> {
        Self::decode(s)
    }
}
