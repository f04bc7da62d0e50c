//! User-facing settings.
//!
//! Settings arrive as JSON from the host (file or settings pane), are
//! validated once and then read-only. Out-of-range values are clamped
//! rather than rejected so a hand-edited file never bricks the bridge.

use crate::controller::CleaningOptions;
use crate::nucleo::NavigationMode;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use tracing::warn;

/// Bounds for the poll interval, seconds.
pub const MIN_POLL_INTERVAL_SECS: u64 = 10;
pub const MAX_POLL_INTERVAL_SECS: u64 = 600;

const DEFAULT_POLL_INTERVAL_SECS: u64 = 60;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read settings file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse settings: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Bridge settings; every field has a default.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Seconds between state polls, clamped to 10-600.
    pub poll_interval_secs: u64,
    /// Quieter, longer-running cleaning.
    pub eco_mode: bool,
    pub navigation_mode: NavigationMode,
    /// Honor persistent-map no-go lines during house cleaning.
    pub no_go_lines: bool,
    /// HTTP timeout for cloud calls, seconds.
    pub request_timeout_secs: u64,
    /// Serial of the robot to control; first robot on the account when
    /// unset.
    pub robot_serial: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            poll_interval_secs: DEFAULT_POLL_INTERVAL_SECS,
            eco_mode: false,
            navigation_mode: NavigationMode::Normal,
            no_go_lines: false,
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            robot_serial: None,
        }
    }
}

impl Settings {
    /// Parses settings from JSON and clamps out-of-range values.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let settings: Settings = serde_json::from_str(json)?;
        Ok(settings.clamped())
    }

    /// Loads settings from a JSON file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json(&contents)
    }

    fn clamped(mut self) -> Self {
        let wanted = self.poll_interval_secs;
        self.poll_interval_secs = wanted.clamp(MIN_POLL_INTERVAL_SECS, MAX_POLL_INTERVAL_SECS);
        if self.poll_interval_secs != wanted {
            warn!(
                requested = wanted,
                effective = self.poll_interval_secs,
                "poll interval out of range, clamped"
            );
        }
        self
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    /// Cleaning preferences derived from these settings.
    pub fn cleaning_options(&self) -> CleaningOptions {
        CleaningOptions {
            eco_mode: self.eco_mode,
            navigation_mode: self.navigation_mode,
            no_go_lines: self.no_go_lines,
            ..CleaningOptions::default()
        }
    }
}
