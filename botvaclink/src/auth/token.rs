//! Access tokens and their lifetime.

use chrono::{DateTime, Duration, Utc};
use std::fmt;

/// Safety margin subtracted from the reported lifetime so a token is
/// never presented in its final second.
const EXPIRY_MARGIN_SECS: i64 = 1;

/// A bearer token for the account-level endpoints.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken {
    token: String,
    /// Absolute expiry; `None` means the server reported no lifetime
    /// (legacy session tokens) and the token is used until rejected.
    expires_at: Option<DateTime<Utc>>,
}

impl AccessToken {
    /// Wraps a token with a lifetime in seconds, as reported by the
    /// token endpoint.
    pub fn new(token: impl Into<String>, expires_in_secs: Option<i64>) -> Self {
        Self {
            token: token.into(),
            expires_at: expires_in_secs.map(|secs| Utc::now() + Duration::seconds(secs)),
        }
    }

    /// The raw token value for an `Authorization: Bearer` header.
    pub fn secret(&self) -> &str {
        &self.token
    }

    /// True once the token is within one second of its expiry.
    pub fn is_expired(&self) -> bool {
        match self.expires_at {
            Some(at) => Utc::now() + Duration::seconds(EXPIRY_MARGIN_SECS) >= at,
            None => false,
        }
    }
}

// Token values never appear in Debug output or logs.
impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessToken")
            .field("expires_at", &self.expires_at)
            .finish_non_exhaustive()
    }
}

/// An access token plus the refresh token that can replace it.
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access: AccessToken,
    pub refresh_token: Option<String>,
}
