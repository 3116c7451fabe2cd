//! Decision logic run before every authenticated request.

use chrono::{DateTime, TimeDelta, Utc};

use super::token::{Token, TokenState};

/// What the client must do before sending an authenticated request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthAction {
    /// No token, or the token has expired: POST `/login`.
    Login,
    /// Token expires inside the refresh window: GET `/refresh_token`.
    Refresh,
    /// Token is valid.
    None,
}

impl AuthAction {
    /// Decides the action for the stored token at `now`.
    ///
    /// Expired tokens always map to [`AuthAction::Login`]; they cannot
    /// refresh themselves.
    #[must_use]
    pub fn decide(token: Option<&Token>, now: DateTime<Utc>, window: TimeDelta) -> Self {
        match token.map(|t| t.state(now, window)) {
            None | Some(TokenState::Expired) => Self::Login,
            Some(TokenState::AboutToExpire) => Self::Refresh,
            Some(TokenState::Valid) => Self::None,
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use crate::v2::token::tests::make_token;

    fn at(secs: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(secs, 0).unwrap()
    }

    #[test]
    fn test_no_token_logs_in() {
        // Arrange & Act
        let action = AuthAction::decide(None, at(0), TimeDelta::minutes(5));

        // Assert
        assert_eq!(action, AuthAction::Login);
    }

    #[test]
    fn test_expired_token_logs_in() {
        // Arrange
        let token = Token::decode(&make_token(1_000)).unwrap();

        // Act
        let action = AuthAction::decide(Some(&token), at(1_001), TimeDelta::minutes(5));

        // Assert
        assert_eq!(action, AuthAction::Login);
    }

    #[test]
    fn test_token_inside_window_refreshes() {
        // Arrange: expiry is 2 minutes away
        let token = Token::decode(&make_token(1_120)).unwrap();

        // Act
        let action = AuthAction::decide(Some(&token), at(1_000), TimeDelta::minutes(5));

        // Assert
        assert_eq!(action, AuthAction::Refresh);
    }

    #[test]
    fn test_valid_token_does_nothing() {
        // Arrange
        let token = Token::decode(&make_token(5_000)).unwrap();

        // Act
        let action = AuthAction::decide(Some(&token), at(1_000), TimeDelta::minutes(5));

        // Assert
        assert_eq!(action, AuthAction::None);
    }
}
