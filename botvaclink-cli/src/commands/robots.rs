//! `robots` subcommand: list the robots paired to the account.

use super::common;
use crate::error::CliError;
use botvaclink::config::Settings;

pub async fn run(settings: Settings) -> Result<(), CliError> {
    let robots = common::list_robots(&settings).await?;

    if robots.is_empty() {
        println!("No robots paired to this account.");
        return Ok(());
    }

    println!("{} robot(s) on this account:", robots.len());
    for robot in &robots {
        println!("  {}  {}", robot.serial, robot.name);
    }
    Ok(())
}
