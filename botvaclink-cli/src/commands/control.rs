//! Command subcommands: `clean`, `spot`, `stop`, `dock`.

use super::common::Bridge;
use crate::error::CliError;
use botvaclink::controller::CleaningOptions;
use botvaclink::nucleo::{NavigationMode, SpotSize};

/// Per-invocation overrides on top of the configured defaults.
#[derive(Debug, Clone, Copy, Default)]
pub struct CleanFlags {
    pub eco: bool,
    pub no_go_lines: bool,
    pub extra_care: bool,
}

fn options(bridge: &Bridge, flags: CleanFlags, spot: Option<SpotSize>) -> CleaningOptions {
    let mut options = bridge.settings.cleaning_options();
    if flags.eco {
        options.eco_mode = true;
    }
    if flags.no_go_lines {
        options.no_go_lines = true;
    }
    if flags.extra_care {
        options.navigation_mode = NavigationMode::ExtraCare;
    }
    if let Some(spot) = spot {
        options.spot = spot;
    }
    options
}

pub async fn clean(bridge: Bridge, flags: CleanFlags) -> Result<(), CliError> {
    let options = options(&bridge, flags, None);
    bridge.controller.start_cleaning(options).await?;
    println!("Cleaning started on {}.", bridge.identity.name);
    Ok(())
}

pub async fn spot(bridge: Bridge, flags: CleanFlags, size: SpotSize) -> Result<(), CliError> {
    let options = options(&bridge, flags, Some(size));
    bridge.controller.start_spot_cleaning(options).await?;
    println!(
        "Spot cleaning ({}x{} cm) started on {}.",
        size.width_cm, size.height_cm, bridge.identity.name
    );
    Ok(())
}

pub async fn stop(bridge: Bridge) -> Result<(), CliError> {
    bridge.controller.stop_cleaning().await?;
    println!("Cleaning stopped on {}.", bridge.identity.name);
    Ok(())
}

pub async fn dock(bridge: Bridge) -> Result<(), CliError> {
    println!("Sending {} to its base...", bridge.identity.name);
    bridge.controller.pause_and_dock().await?;
    println!("{} is heading home.", bridge.identity.name);
    Ok(())
}
