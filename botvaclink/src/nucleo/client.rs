//! Signed message client for one robot.

use super::command::RobotCommand;
use super::signing;
use super::{ApiError, RobotApi};
use crate::http::AsyncHttpClient;
use crate::robot::{RawRobotState, RobotIdentity};
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, trace};

/// Default nucleo endpoint (state and commands).
pub const DEFAULT_NUCLEO_BASE_URL: &str = "https://nucleo.neatocloud.com:4443";

const NUCLEO_ACCEPT: &str = "application/vnd.neato.nucleo.v1";

/// Message envelope posted to the robot endpoint.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct MessageEnvelope<'a> {
    req_id: u64,
    cmd: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    params: Option<serde_json::Value>,
}

/// Authenticated client for one robot's message endpoint.
///
/// Owns the robot identity and a monotonically increasing request id;
/// nothing is shared between robots (no global client singleton).
pub struct NucleoClient<C> {
    http: C,
    identity: RobotIdentity,
    message_url: String,
    request_id: AtomicU64,
}

impl<C: AsyncHttpClient> NucleoClient<C> {
    /// Creates a client for the given robot against the production endpoint.
    pub fn new(http: C, identity: RobotIdentity) -> Self {
        Self::with_base_url(http, identity, DEFAULT_NUCLEO_BASE_URL)
    }

    /// Creates a client against a custom endpoint (tests, staging).
    pub fn with_base_url(http: C, identity: RobotIdentity, base_url: &str) -> Self {
        let message_url = format!(
            "{}/vendors/neato/robots/{}/messages",
            base_url.trim_end_matches('/'),
            identity.serial
        );
        Self {
            http,
            identity,
            message_url,
            request_id: AtomicU64::new(1),
        }
    }

    /// The robot this client talks to.
    pub fn identity(&self) -> &RobotIdentity {
        &self.identity
    }

    async fn send_message(
        &self,
        cmd: &str,
        params: Option<serde_json::Value>,
    ) -> Result<Vec<u8>, ApiError> {
        let req_id = self.request_id.fetch_add(1, Ordering::Relaxed);
        let envelope = MessageEnvelope {
            req_id,
            cmd,
            params,
        };
        let body = serde_json::to_string(&envelope)
            .map_err(|e| ApiError::Protocol(format!("failed to encode request: {}", e)))?;

        let date = signing::http_date(chrono::Utc::now());
        let signature = signing::sign(&self.identity.serial, &self.identity.secret, &date, &body);
        let authorization = format!("NEATOAPP {}", signature);
        let headers = [
            ("Accept", NUCLEO_ACCEPT),
            ("X-Date", date.as_str()),
            ("Authorization", authorization.as_str()),
        ];

        trace!(robot = %self.identity.name, req_id, cmd, "sending robot message");
        let response = self.http.post_json(&self.message_url, &body, &headers).await?;
        Ok(response)
    }
}

impl<C: AsyncHttpClient> RobotApi for NucleoClient<C> {
    async fn fetch_state(&self) -> Result<RawRobotState, ApiError> {
        let bytes = self.send_message("getRobotState", None).await?;

        let state: RawRobotState = serde_json::from_slice(&bytes).map_err(|e| {
            ApiError::Protocol(format!(
                "robot {} returned malformed state: {}",
                self.identity.serial, e
            ))
        })?;

        debug!(
            robot = %self.identity.name,
            state = ?state.state,
            action = ?state.action,
            charge = state.details.charge,
            "fetched robot state"
        );
        Ok(state)
    }

    async fn dispatch(&self, command: &RobotCommand) -> Result<(), ApiError> {
        // Fire-and-forget: the cloud acknowledges acceptance only. The
        // response body is not inspected beyond the HTTP status.
        self.send_message(command.name(), command.params()).await?;

        debug!(
            robot = %self.identity.name,
            command = command.name(),
            "dispatched robot command"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::tests::MockAsyncHttpClient;
    use crate::http::HttpError;
    use crate::robot::{RobotAction, RobotState};

    fn identity() -> RobotIdentity {
        RobotIdentity::new("Roberta", "OPS01234-5678", "secret")
    }

    const STATE_BODY: &str = r#"{
        "result": "ok",
        "state": 2,
        "action": 2,
        "details": {"isCharging": false, "isDocked": false, "charge": 55},
        "availableCommands": {"pause": true}
    }"#;

    #[tokio::test]
    async fn test_fetch_state_parses_payload() {
        let http = MockAsyncHttpClient::new(Ok(STATE_BODY.as_bytes().to_vec()));
        let client = NucleoClient::new(http, identity());

        let state = client.fetch_state().await.unwrap();

        assert_eq!(state.state, RobotState::Busy);
        assert_eq!(state.action, Some(RobotAction::SpotCleaning));
        assert_eq!(state.details.charge, 55);
    }

    #[tokio::test]
    async fn test_fetch_state_malformed_body_is_protocol_error() {
        let http = MockAsyncHttpClient::new(Ok(b"<html>502</html>".to_vec()));
        let client = NucleoClient::new(http, identity());

        let err = client.fetch_state().await.unwrap_err();
        assert!(matches!(err, ApiError::Protocol(_)));
    }

    #[tokio::test]
    async fn test_unauthorized_surfaces_auth_error() {
        let http = MockAsyncHttpClient::new(Err(HttpError::Status {
            code: 403,
            url: "https://nucleo.neatocloud.com".to_string(),
        }));
        let client = NucleoClient::new(http, identity());

        let err = client.fetch_state().await.unwrap_err();
        assert!(matches!(err, ApiError::Auth(_)));
    }

    #[tokio::test]
    async fn test_dispatch_is_fire_and_forget() {
        // Command responses are not parsed; any 2xx body is acceptance.
        let http = MockAsyncHttpClient::new(Ok(b"{\"result\":\"ok\"}".to_vec()));
        let client = NucleoClient::new(http, identity());

        client.dispatch(&RobotCommand::SendToBase).await.unwrap();
    }

    #[test]
    fn test_message_url_includes_serial() {
        let http = MockAsyncHttpClient::new(Ok(vec![]));
        let client = NucleoClient::new(http, identity());

        assert_eq!(
            client.message_url,
            "https://nucleo.neatocloud.com:4443/vendors/neato/robots/OPS01234-5678/messages"
        );
    }

    #[tokio::test]
    async fn test_request_ids_are_monotonic() {
        let http = MockAsyncHttpClient::new(Ok(STATE_BODY.as_bytes().to_vec()));
        let client = NucleoClient::new(http, identity());

        let before = client.request_id.load(Ordering::Relaxed);
        let _ = client.fetch_state().await;
        let _ = client.dispatch(&RobotCommand::PauseCleaning).await;
        let after = client.request_id.load(Ordering::Relaxed);

        assert_eq!(after, before + 2);
    }
}
