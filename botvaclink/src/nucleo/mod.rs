//! Nucleo robot message endpoint client.
//!
//! One robot, one client: every call is an HMAC-signed POST to the
//! per-robot `messages` endpoint. Command dispatch is fire-and-forget;
//! the cloud acknowledges acceptance, not completion, so callers must
//! poll state to observe the effect.

mod client;
mod command;
mod signing;

pub use client::{NucleoClient, DEFAULT_NUCLEO_BASE_URL};
pub use command::{
    CleaningCategory, CleaningMode, CleaningParams, NavigationMode, RobotCommand, SpotSize,
};

use crate::http::HttpError;
use crate::robot::RawRobotState;
use std::future::Future;
use thiserror::Error;

/// Errors from the robot API boundary.
///
/// Variants carry owned strings and derive `Clone` so a single fetch
/// result can be broadcast to every coalesced cache waiter.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ApiError {
    /// Network failure or server-side trouble; retryable.
    #[error("transport error: {0}")]
    Transport(String),
    /// Invalid or expired credential; the caller must re-authenticate.
    #[error("authentication rejected: {0}")]
    Auth(String),
    /// The response was not the expected JSON shape; not retryable.
    #[error("unexpected payload: {0}")]
    Protocol(String),
}

impl From<HttpError> for ApiError {
    fn from(e: HttpError) -> Self {
        if e.is_auth_failure() {
            ApiError::Auth(e.to_string())
        } else {
            ApiError::Transport(e.to_string())
        }
    }
}

/// The I/O seam between the robot cloud and the rest of the crate.
///
/// [`NucleoClient`] is the production implementation; tests inject
/// scripted fakes.
pub trait RobotApi: Send + Sync {
    /// Fetches a fresh state snapshot from the robot.
    fn fetch_state(&self) -> impl Future<Output = Result<RawRobotState, ApiError>> + Send;

    /// Dispatches one command. Acceptance, not completion: the physical
    /// state transition is only observable through subsequent polls.
    fn dispatch(&self, command: &RobotCommand) -> impl Future<Output = Result<(), ApiError>> + Send;
}
