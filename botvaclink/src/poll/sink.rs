//! Where poll results go.

use crate::status::VacuumStatus;

/// Receiver for state changes observed by the poll loop.
///
/// Implemented by the host-device glue; callbacks fire only when the
/// observed value actually changed, plus once on the first poll.
pub trait StatusSink: Send + Sync {
    fn status_changed(&self, status: VacuumStatus);

    fn battery_changed(&self, percent: u8);

    /// The robot recovered from an unavailable condition.
    fn available(&self);

    /// The robot cannot be controlled; `reason` is user-facing.
    fn unavailable(&self, reason: &str);
}
