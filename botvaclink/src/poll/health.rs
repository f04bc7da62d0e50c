//! Poll backoff state.

use std::time::Duration;

/// Ceiling for the backed-off poll interval.
pub const MAX_POLL_INTERVAL: Duration = Duration::from_secs(600);

/// Tracks consecutive poll failures and derives the next poll interval.
///
/// The interval grows quadratically with the failure streak
/// (`base * n^2`), clamped between the base interval and
/// [`MAX_POLL_INTERVAL`]. One success resets the streak.
#[derive(Debug, Clone)]
pub struct PollingHealth {
    base: Duration,
    consecutive_errors: u32,
}

impl PollingHealth {
    pub fn new(base: Duration) -> Self {
        Self {
            base,
            consecutive_errors: 0,
        }
    }

    /// Replaces the base interval; the current failure streak is kept.
    pub fn set_base(&mut self, base: Duration) {
        self.base = base;
    }

    pub fn base(&self) -> Duration {
        self.base
    }

    pub fn consecutive_errors(&self) -> u32 {
        self.consecutive_errors
    }

    pub fn record_success(&mut self) {
        self.consecutive_errors = 0;
    }

    pub fn record_failure(&mut self) {
        self.consecutive_errors = self.consecutive_errors.saturating_add(1);
    }

    /// Interval until the next poll, given the current failure streak.
    pub fn current_interval(&self) -> Duration {
        if self.consecutive_errors == 0 {
            return self.base;
        }
        let factor = self.consecutive_errors.saturating_mul(self.consecutive_errors);
        let scaled = self.base.checked_mul(factor).unwrap_or(MAX_POLL_INTERVAL);
        scaled.clamp(self.base, MAX_POLL_INTERVAL)
    }
}
