//! Capability state derivation.
//!
//! Pure translation from a raw cloud snapshot to the small enumerated
//! status the host surfaces to automations. No I/O, no shared state:
//! the same snapshot always derives the same status.

use crate::robot::{RawRobotState, RobotAction, RobotState};

/// Enumerated vacuum status exposed to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VacuumStatus {
    Cleaning,
    SpotCleaning,
    Charging,
    Docked,
    Stopped,
}

impl VacuumStatus {
    /// Capability value string for the host device.
    pub fn as_str(&self) -> &'static str {
        match self {
            VacuumStatus::Cleaning => "cleaning",
            VacuumStatus::SpotCleaning => "spot_cleaning",
            VacuumStatus::Charging => "charging",
            VacuumStatus::Docked => "docked",
            VacuumStatus::Stopped => "stopped",
        }
    }
}

impl std::fmt::Display for VacuumStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status, battery and error derived from one raw snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DerivedState {
    pub status: VacuumStatus,
    /// Battery charge, 0-100.
    pub battery_percent: u8,
    /// Set when the robot reports an unrecoverable error; the host should
    /// mark the device unavailable with this reason.
    pub unavailable_reason: Option<String>,
}

/// Derives the host-facing state from a raw snapshot.
///
/// Priority order, first match wins:
/// 1. hard error -> unavailable (reason carried alongside `Stopped`)
/// 2. charging
/// 3. docked (docked-but-not-charging still counts as docked)
/// 4. busy + spot cleaning action -> spot cleaning
/// 5. busy otherwise -> cleaning
/// 6. everything else (idle, paused, unrecognized) -> stopped
pub fn derive(raw: &RawRobotState) -> DerivedState {
    let battery_percent = raw.details.charge.min(100);

    if raw.has_hard_error() {
        let reason = raw
            .error
            .clone()
            .unwrap_or_else(|| "robot reported an error".to_string());
        return DerivedState {
            status: VacuumStatus::Stopped,
            battery_percent,
            unavailable_reason: Some(reason),
        };
    }

    let status = if raw.details.is_charging {
        VacuumStatus::Charging
    } else if raw.details.is_docked {
        VacuumStatus::Docked
    } else if raw.state == RobotState::Busy && raw.action == Some(RobotAction::SpotCleaning) {
        VacuumStatus::SpotCleaning
    } else if raw.state == RobotState::Busy {
        VacuumStatus::Cleaning
    } else {
        VacuumStatus::Stopped
    };

    DerivedState {
        status,
        battery_percent,
        unavailable_reason: None,
    }
}
