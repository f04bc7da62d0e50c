//! `watch` subcommand: follow state changes until interrupted.

use super::common::Bridge;
use crate::error::CliError;
use botvaclink::poll::{PollScheduler, StatusSink};
use botvaclink::status::VacuumStatus;
use std::sync::Arc;

/// Prints every observed change as one line.
struct PrintSink;

impl StatusSink for PrintSink {
    fn status_changed(&self, status: VacuumStatus) {
        println!("status:  {}", status);
    }

    fn battery_changed(&self, percent: u8) {
        println!("battery: {}%", percent);
    }

    fn available(&self) {
        println!("robot is available again");
    }

    fn unavailable(&self, reason: &str) {
        println!("robot unavailable: {}", reason);
    }
}

pub async fn run(bridge: Bridge) -> Result<(), CliError> {
    println!(
        "Watching {} ({}), polling every {}s. Ctrl-C to stop.",
        bridge.identity.name,
        bridge.identity.serial,
        bridge.settings.poll_interval_secs
    );

    let scheduler = Arc::new(PollScheduler::new(
        Arc::clone(bridge.controller.cache()),
        Arc::new(PrintSink),
        bridge.settings.poll_interval(),
    ));
    let handle = scheduler.start();

    // Poll until interrupted.
    let _ = tokio::signal::ctrl_c().await;
    println!();
    handle.stop().await;
    Ok(())
}
