//! Raw robot state as reported by the nucleo message endpoint.
//!
//! The cloud encodes `state` and `action` as small integers. They are
//! decoded into closed enums during deserialization; unknown action codes
//! (firmware newer than this crate) become `None` rather than an error so
//! a state snapshot is never rejected for an unrecognized activity.

use serde::{Deserialize, Deserializer};

/// Top-level robot state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RobotState {
    Idle,
    Busy,
    Paused,
    Error,
}

impl TryFrom<u8> for RobotState {
    type Error = u8;

    fn try_from(code: u8) -> Result<Self, u8> {
        match code {
            1 => Ok(RobotState::Idle),
            2 => Ok(RobotState::Busy),
            3 => Ok(RobotState::Paused),
            4 => Ok(RobotState::Error),
            other => Err(other),
        }
    }
}

impl<'de> Deserialize<'de> for RobotState {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let code = u8::deserialize(deserializer)?;
        RobotState::try_from(code)
            .map_err(|c| serde::de::Error::custom(format!("unknown robot state code {}", c)))
    }
}

/// Current robot activity, only meaningful while `state` is `Busy`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RobotAction {
    HouseCleaning,
    SpotCleaning,
    ManualCleaning,
    Docking,
    UserMenuActive,
    SuspendedCleaning,
    Updating,
    CopyingLogs,
    RecoveringLocation,
    IecTest,
}

impl RobotAction {
    fn from_code(code: u8) -> Option<Self> {
        match code {
            1 => Some(RobotAction::HouseCleaning),
            2 => Some(RobotAction::SpotCleaning),
            3 => Some(RobotAction::ManualCleaning),
            4 => Some(RobotAction::Docking),
            5 => Some(RobotAction::UserMenuActive),
            6 => Some(RobotAction::SuspendedCleaning),
            7 => Some(RobotAction::Updating),
            8 => Some(RobotAction::CopyingLogs),
            9 => Some(RobotAction::RecoveringLocation),
            10 => Some(RobotAction::IecTest),
            _ => None,
        }
    }
}

fn deserialize_action<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<RobotAction>, D::Error> {
    let code = Option::<u8>::deserialize(deserializer)?;
    Ok(code.and_then(RobotAction::from_code))
}

/// Commands the robot currently accepts.
///
/// Missing fields default to `false`: a command the payload does not
/// mention is a command the robot will reject.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AvailableCommands {
    pub start: bool,
    pub stop: bool,
    pub pause: bool,
    pub resume: bool,
    pub go_to_base: bool,
}

/// Charge and docking details.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StateDetails {
    pub is_charging: bool,
    pub is_docked: bool,
    /// Battery charge, 0-100.
    pub charge: u8,
}

/// One raw status snapshot fetched from the robot message endpoint.
///
/// Immutable once fetched; superseded by the next fetch.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawRobotState {
    pub state: RobotState,
    #[serde(default, deserialize_with = "deserialize_action")]
    pub action: Option<RobotAction>,
    /// Result code of the request itself, "ok" on success. Some firmware
    /// reports an error string alongside an "ok" result; see the mapper.
    #[serde(default)]
    pub result: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub details: StateDetails,
    #[serde(default)]
    pub available_commands: AvailableCommands,
}

impl RawRobotState {
    /// True when the reported error is a hard failure.
    ///
    /// Legacy firmware returns a non-null `error` together with
    /// `result: "ok"`; that combination is benign and must not mark the
    /// robot unavailable.
    pub fn has_hard_error(&self) -> bool {
        if self.state != RobotState::Error {
            return false;
        }
        !matches!(&self.result, Some(r) if r.eq_ignore_ascii_case("ok"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Full payload as the nucleo endpoint returns it.
    const BUSY_HOUSE_CLEANING: &str = r#"{
        "version": 1,
        "reqId": "7",
        "result": "ok",
        "state": 2,
        "action": 1,
        "error": null,
        "details": {"isCharging": false, "isDocked": false, "charge": 61},
        "availableCommands": {"start": false, "stop": true, "pause": true, "resume": false, "goToBase": false}
    }"#;

    #[test]
    fn test_deserialize_busy_house_cleaning() {
        let state: RawRobotState = serde_json::from_str(BUSY_HOUSE_CLEANING).unwrap();

        assert_eq!(state.state, RobotState::Busy);
        assert_eq!(state.action, Some(RobotAction::HouseCleaning));
        assert_eq!(state.details.charge, 61);
        assert!(state.available_commands.pause);
        assert!(!state.available_commands.go_to_base);
    }

    #[test]
    fn test_deserialize_docked_and_charging() {
        let json = r#"{
            "result": "ok",
            "state": 1,
            "action": 0,
            "details": {"isCharging": true, "isDocked": true, "charge": 42},
            "availableCommands": {"start": true}
        }"#;
        let state: RawRobotState = serde_json::from_str(json).unwrap();

        assert_eq!(state.state, RobotState::Idle);
        assert_eq!(state.action, None);
        assert!(state.details.is_charging);
        assert!(state.details.is_docked);
        assert!(state.available_commands.start);
        assert!(!state.available_commands.resume);
    }

    #[test]
    fn test_unknown_state_code_is_rejected() {
        let json = r#"{"state": 9, "details": {}, "availableCommands": {}}"#;
        let result: Result<RawRobotState, _> = serde_json::from_str(json);
        assert!(result.is_err());
    }

    #[test]
    fn test_unknown_action_code_becomes_none() {
        // Firmware newer than this crate may report actions we don't know.
        let json = r#"{"state": 2, "action": 42, "details": {}, "availableCommands": {}}"#;
        let state: RawRobotState = serde_json::from_str(json).unwrap();
        assert_eq!(state.action, None);
    }

    #[test]
    fn test_missing_sections_default() {
        let json = r#"{"state": 1}"#;
        let state: RawRobotState = serde_json::from_str(json).unwrap();

        assert_eq!(state.details.charge, 0);
        assert_eq!(state.available_commands, AvailableCommands::default());
    }

    #[test]
    fn test_hard_error_detection() {
        let hard: RawRobotState = serde_json::from_str(
            r#"{"state": 4, "result": "fail", "error": "ui_alert_dust_bin_full"}"#,
        )
        .unwrap();
        let benign: RawRobotState = serde_json::from_str(
            r#"{"state": 4, "result": "OK", "error": "ui_alert_dust_bin_full"}"#,
        )
        .unwrap();
        let healthy: RawRobotState = serde_json::from_str(r#"{"state": 2, "result": "ok"}"#).unwrap();

        assert!(hard.has_hard_error());
        assert!(!benign.has_hard_error());
        assert!(!healthy.has_hard_error());
    }

    #[test]
    fn test_error_state_without_result_is_hard() {
        let state: RawRobotState =
            serde_json::from_str(r#"{"state": 4, "error": "ui_error_brush_stuck"}"#).unwrap();
        assert!(state.has_hard_error());
    }
}
