//! `status` subcommand: one-shot state report.

use super::common::Bridge;
use crate::error::CliError;

pub async fn run(bridge: Bridge) -> Result<(), CliError> {
    let state = bridge.controller.refresh().await?;

    println!("Robot:    {} ({})", bridge.identity.name, bridge.identity.serial);
    println!("Status:   {}", state.status);
    println!("Battery:  {}%", state.battery_percent);
    match &state.unavailable_reason {
        Some(reason) => println!("Problem:  {}", reason),
        None => println!("Problem:  none"),
    }
    Ok(())
}
