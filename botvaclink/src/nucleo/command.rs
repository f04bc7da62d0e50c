//! Typed robot commands and their wire encoding.
//!
//! The vendor protocol identifies categories, modes and navigation
//! behavior by small integers. Those codes exist only in this module's
//! serialization layer; everything else works with the named variants.

use serde::{Deserialize, Serialize};

/// What kind of cleaning run to start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CleaningCategory {
    Manual,
    House,
    Spot,
    /// House cleaning honoring persistent-map no-go lines.
    PersistentMap,
}

impl From<CleaningCategory> for u8 {
    fn from(category: CleaningCategory) -> u8 {
        match category {
            CleaningCategory::Manual => 1,
            CleaningCategory::House => 2,
            CleaningCategory::Spot => 3,
            CleaningCategory::PersistentMap => 4,
        }
    }
}

/// Suction/runtime trade-off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CleaningMode {
    Eco,
    #[default]
    Turbo,
}

impl From<CleaningMode> for u8 {
    fn from(mode: CleaningMode) -> u8 {
        match mode {
            CleaningMode::Eco => 1,
            CleaningMode::Turbo => 2,
        }
    }
}

/// Navigation behavior around obstacles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NavigationMode {
    #[default]
    Normal,
    ExtraCare,
}

impl From<NavigationMode> for u8 {
    fn from(mode: NavigationMode) -> u8 {
        match mode {
            NavigationMode::Normal => 1,
            NavigationMode::ExtraCare => 2,
        }
    }
}

/// Spot-clean area in centimeters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpotSize {
    pub width_cm: u32,
    pub height_cm: u32,
}

impl Default for SpotSize {
    fn default() -> Self {
        Self {
            width_cm: 100,
            height_cm: 100,
        }
    }
}

/// Parameters for a `startCleaning` request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CleaningParams {
    pub category: CleaningCategory,
    pub mode: CleaningMode,
    pub navigation_mode: NavigationMode,
    /// Present only for spot cleaning.
    pub spot: Option<SpotSize>,
}

/// Wire shape of cleaning parameters; numeric codes live here only.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct WireParams {
    category: u8,
    mode: u8,
    /// How often to clean the area; always once.
    modifier: u8,
    navigation_mode: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    spot_width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    spot_height: Option<u32>,
}

/// One low-level command accepted by the robot message endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RobotCommand {
    StartCleaning(CleaningParams),
    ResumeCleaning,
    PauseCleaning,
    StopCleaning,
    SendToBase,
}

impl RobotCommand {
    /// Vendor command name for the message envelope.
    pub fn name(&self) -> &'static str {
        match self {
            RobotCommand::StartCleaning(_) => "startCleaning",
            RobotCommand::ResumeCleaning => "resumeCleaning",
            RobotCommand::PauseCleaning => "pauseCleaning",
            RobotCommand::StopCleaning => "stopCleaning",
            RobotCommand::SendToBase => "sendToBase",
        }
    }

    /// Wire parameters, if this command carries any.
    pub fn params(&self) -> Option<serde_json::Value> {
        match self {
            RobotCommand::StartCleaning(p) => {
                let wire = WireParams {
                    category: p.category.into(),
                    mode: p.mode.into(),
                    modifier: 1,
                    navigation_mode: p.navigation_mode.into(),
                    spot_width: p.spot.map(|s| s.width_cm),
                    spot_height: p.spot.map(|s| s.height_cm),
                };
                // WireParams contains only primitives; serialization cannot fail.
                Some(serde_json::to_value(wire).unwrap_or(serde_json::Value::Null))
            }
            _ => None,
        }
    }
}
