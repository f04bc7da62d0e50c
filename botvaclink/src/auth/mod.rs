//! Account authentication.
//!
//! Two ways in: the OAuth2 authorization-code flow (current apps) and the
//! legacy email/password session login (older accounts). Both produce an
//! [`AccessToken`] that authorizes the account-level endpoints; per-robot
//! traffic is signed separately and never uses these tokens.

mod oauth;
mod token;

pub use oauth::{OAuthClient, OAuthConfig, DEFAULT_OAUTH_BASE_URL};
pub use token::{AccessToken, TokenPair};

use crate::http::HttpError;
use thiserror::Error;

/// Errors from token acquisition and refresh.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The token endpoint could not be reached or answered with an error.
    #[error("token request failed: {0}")]
    Http(#[from] HttpError),
    /// The token endpoint answered with something other than a token.
    #[error("malformed token response: {0}")]
    Protocol(String),
    /// The access token has expired and no refresh token is held.
    #[error("access token expired and no refresh token available")]
    Expired,
}
