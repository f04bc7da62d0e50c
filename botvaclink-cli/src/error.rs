//! CLI error handling with user-friendly messages.
//!
//! Centralizes error handling for the CLI, providing consistent
//! formatting and appropriate exit codes.

use botvaclink::auth::AuthError;
use botvaclink::beehive::DiscoveryError;
use botvaclink::config::ConfigError;
use botvaclink::controller::ControlError;
use botvaclink::http::HttpError;
use std::fmt;
use std::process;

/// CLI-specific errors with user-friendly messages.
#[derive(Debug)]
pub enum CliError {
    /// Failed to initialize logging
    LoggingInit(String),
    /// Settings file problem
    Config(ConfigError),
    /// No usable credentials in the environment
    MissingCredentials,
    /// Failed to create the HTTP client
    Http(HttpError),
    /// Login or token refresh failed
    Auth(AuthError),
    /// Robot discovery or selection failed
    Discovery(DiscoveryError),
    /// A robot command failed
    Control(ControlError),
}

impl CliError {
    /// Exit the process with an appropriate error message and code.
    pub fn exit(&self) -> ! {
        eprintln!("Error: {}", self);

        match self {
            CliError::MissingCredentials => {
                eprintln!();
                eprintln!("Provide credentials via the environment:");
                eprintln!("  NEATO_TOKEN              an existing account token, or");
                eprintln!("  NEATO_EMAIL + NEATO_PASSWORD for a session login");
            }
            CliError::Auth(_) => {
                eprintln!();
                eprintln!("Check that:");
                eprintln!("  1. The credentials are correct");
                eprintln!("  2. The token has not been revoked");
            }
            CliError::Discovery(DiscoveryError::NoRobots) => {
                eprintln!();
                eprintln!("Pair a robot with your account in the vendor app first.");
            }
            _ => {}
        }

        process::exit(1)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::LoggingInit(msg) => write!(f, "failed to initialize logging: {}", msg),
            CliError::Config(e) => write!(f, "{}", e),
            CliError::MissingCredentials => write!(f, "no credentials configured"),
            CliError::Http(e) => write!(f, "{}", e),
            CliError::Auth(e) => write!(f, "{}", e),
            CliError::Discovery(e) => write!(f, "{}", e),
            CliError::Control(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for CliError {}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        CliError::Config(e)
    }
}

impl From<HttpError> for CliError {
    fn from(e: HttpError) -> Self {
        CliError::Http(e)
    }
}

impl From<AuthError> for CliError {
    fn from(e: AuthError) -> Self {
        CliError::Auth(e)
    }
}

impl From<DiscoveryError> for CliError {
    fn from(e: DiscoveryError) -> Self {
        CliError::Discovery(e)
    }
}

impl From<ControlError> for CliError {
    fn from(e: ControlError) -> Self {
        CliError::Control(e)
    }
}
