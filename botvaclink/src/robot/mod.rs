//! Robot identity and raw cloud state types.
//!
//! Everything the Neato cloud reports about a robot enters the crate
//! through this module: numeric state/action codes are decoded into
//! closed enums here and never travel further as raw integers.

mod identity;
mod state;

pub use identity::RobotIdentity;
pub use state::{
    AvailableCommands, RawRobotState, RobotAction, RobotState, StateDetails,
};
