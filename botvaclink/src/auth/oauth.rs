//! OAuth2 authorization-code flow against the vendor's identity service.

use super::token::{AccessToken, TokenPair};
use super::AuthError;
use crate::http::AsyncHttpClient;
use serde::Deserialize;
use tracing::{debug, info};
use url::form_urlencoded;

/// Production OAuth2 endpoint root.
pub const DEFAULT_OAUTH_BASE_URL: &str = "https://apps.neatorobotics.com/oauth2";

/// Application credentials and redirect target registered with the vendor.
#[derive(Debug, Clone)]
pub struct OAuthConfig {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
    /// Requested scopes, joined with spaces in the authorization URL.
    pub scopes: Vec<String>,
}

/// Wire shape of a token endpoint response.
#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    refresh_token: Option<String>,
}

/// Client for the authorization-code and refresh grants.
pub struct OAuthClient<C> {
    http: C,
    config: OAuthConfig,
    base_url: String,
}

impl<C: AsyncHttpClient> OAuthClient<C> {
    /// Creates a client against the production identity service.
    pub fn new(http: C, config: OAuthConfig) -> Self {
        Self::with_base_url(http, config, DEFAULT_OAUTH_BASE_URL)
    }

    /// Creates a client against a custom endpoint (tests, staging).
    pub fn with_base_url(http: C, config: OAuthConfig, base_url: &str) -> Self {
        Self {
            http,
            config,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// The URL to send the user to for consent.
    ///
    /// `state` is echoed back on the redirect and must be checked by the
    /// caller before exchanging the code.
    pub fn authorization_url(&self, state: &str) -> String {
        let query: String = form_urlencoded::Serializer::new(String::new())
            .append_pair("response_type", "code")
            .append_pair("client_id", &self.config.client_id)
            .append_pair("redirect_uri", &self.config.redirect_uri)
            .append_pair("scope", &self.config.scopes.join(" "))
            .append_pair("state", state)
            .finish();
        format!("{}/authorize?{}", self.base_url, query)
    }

    /// Exchanges an authorization code for tokens.
    pub async fn exchange_code(&self, code: &str) -> Result<TokenPair, AuthError> {
        debug!("exchanging authorization code for tokens");
        let pair = self
            .token_request(&[
                ("grant_type", "authorization_code"),
                ("client_id", &self.config.client_id),
                ("client_secret", &self.config.client_secret),
                ("redirect_uri", &self.config.redirect_uri),
                ("code", code),
            ])
            .await?;
        info!("authorization code exchanged");
        Ok(pair)
    }

    /// Obtains a fresh access token using a refresh token.
    pub async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, AuthError> {
        debug!("refreshing access token");
        let mut pair = self
            .token_request(&[
                ("grant_type", "refresh_token"),
                ("client_id", &self.config.client_id),
                ("client_secret", &self.config.client_secret),
                ("refresh_token", refresh_token),
            ])
            .await?;

        // Some deployments omit the refresh token on renewal; keep the old one.
        if pair.refresh_token.is_none() {
            pair.refresh_token = Some(refresh_token.to_string());
        }
        info!("access token refreshed");
        Ok(pair)
    }

    /// Returns a usable token pair, refreshing first if the access token
    /// has expired.
    pub async fn ensure_fresh(&self, pair: &TokenPair) -> Result<TokenPair, AuthError> {
        if !pair.access.is_expired() {
            return Ok(pair.clone());
        }
        match &pair.refresh_token {
            Some(refresh_token) => self.refresh(refresh_token).await,
            None => Err(AuthError::Expired),
        }
    }

    async fn token_request(&self, form: &[(&str, &str)]) -> Result<TokenPair, AuthError> {
        let url = format!("{}/token", self.base_url);
        let bytes = self.http.post_form(&url, form).await?;

        let response: TokenResponse = serde_json::from_slice(&bytes)
            .map_err(|e| AuthError::Protocol(format!("token endpoint returned non-token: {}", e)))?;

        Ok(TokenPair {
            access: AccessToken::new(response.access_token, response.expires_in),
            refresh_token: response.refresh_token,
        })
    }
}
