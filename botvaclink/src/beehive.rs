//! Account endpoint: robot discovery and legacy session login.
//!
//! The account service (beehive) lists the robots paired to an account,
//! including the per-robot signing secret that all later robot traffic
//! is signed with. Discovery runs once per session; identities are
//! immutable afterwards.

use crate::auth::{AccessToken, AuthError};
use crate::http::AsyncHttpClient;
use crate::nucleo::ApiError;
use crate::robot::RobotIdentity;
use rand::RngCore;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info};

/// Production account endpoint root.
pub const DEFAULT_BEEHIVE_BASE_URL: &str = "https://beehive.neatocloud.com";

/// Errors from robot selection.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error("account has no paired robots")]
    NoRobots,
    #[error("no robot with serial {0} on this account")]
    UnknownSerial(String),
}

#[derive(Deserialize)]
struct SessionResponse {
    access_token: String,
}

/// Client for the account-level endpoints.
pub struct BeehiveClient<C> {
    http: C,
    base_url: String,
}

impl<C: AsyncHttpClient> BeehiveClient<C> {
    /// Creates a client against the production account service.
    pub fn new(http: C) -> Self {
        Self::with_base_url(http, DEFAULT_BEEHIVE_BASE_URL)
    }

    /// Creates a client against a custom endpoint (tests, staging).
    pub fn with_base_url(http: C, base_url: &str) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Lists every robot paired to the authenticated account.
    pub async fn list_robots(&self, token: &AccessToken) -> Result<Vec<RobotIdentity>, ApiError> {
        let url = format!("{}/users/me/robots", self.base_url);
        let bytes = self.http.get_with_bearer(&url, token.secret()).await?;

        let robots: Vec<RobotIdentity> = serde_json::from_slice(&bytes)
            .map_err(|e| ApiError::Protocol(format!("malformed robot listing: {}", e)))?;

        info!(count = robots.len(), "discovered paired robots");
        Ok(robots)
    }

    /// Selects one robot: by serial when given, otherwise the first on
    /// the account.
    pub async fn find_robot(
        &self,
        token: &AccessToken,
        serial: Option<&str>,
    ) -> Result<RobotIdentity, DiscoveryError> {
        let robots = self.list_robots(token).await?;

        match serial {
            Some(wanted) => robots
                .into_iter()
                .find(|r| r.serial.eq_ignore_ascii_case(wanted))
                .ok_or_else(|| DiscoveryError::UnknownSerial(wanted.to_string())),
            None => {
                let robot = robots.into_iter().next().ok_or(DiscoveryError::NoRobots)?;
                debug!(robot = %robot.name, serial = %robot.serial, "selected first robot");
                Ok(robot)
            }
        }
    }

    /// Legacy email/password login.
    ///
    /// Registers a fresh random device token and returns the session
    /// token. Session tokens carry no reported lifetime; they are used
    /// until the server rejects them.
    pub async fn login(&self, email: &str, password: &str) -> Result<AccessToken, AuthError> {
        let mut device = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut device);
        let device_token = hex::encode(device);

        let url = format!("{}/sessions", self.base_url);
        let bytes = self
            .http
            .post_form(
                &url,
                &[
                    ("email", email),
                    ("password", password),
                    ("platform", "ios"),
                    ("token", &device_token),
                ],
            )
            .await?;

        let session: SessionResponse = serde_json::from_slice(&bytes)
            .map_err(|e| AuthError::Protocol(format!("malformed session response: {}", e)))?;

        info!("session login succeeded");
        Ok(AccessToken::new(session.access_token, None))
    }
}
