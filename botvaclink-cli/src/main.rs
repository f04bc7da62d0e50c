//! BotvacLink CLI - control and observe Neato Botvac robots.
//!
//! This binary provides a command-line interface to the BotvacLink
//! library. Credentials come from the environment (`NEATO_TOKEN` or
//! `NEATO_EMAIL`/`NEATO_PASSWORD`); behavior settings from an optional
//! JSON settings file.

mod commands;
mod error;

use clap::{Parser, Subcommand};
use commands::control::CleanFlags;
use error::CliError;
use std::path::PathBuf;

use botvaclink::config::Settings;
use botvaclink::logging::{default_log_dir, default_log_file, init_logging};
use botvaclink::nucleo::SpotSize;

#[derive(Parser)]
#[command(name = "botvaclink")]
#[command(version = botvaclink::VERSION)]
#[command(about = "Control and observe Neato Botvac robots", long_about = None)]
struct Args {
    /// Path to a JSON settings file
    #[arg(long, global = true)]
    settings: Option<PathBuf>,

    /// Serial of the robot to control (default: first on the account)
    #[arg(long, global = true)]
    serial: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List the robots paired to the account
    Robots,
    /// Show the robot's current status
    Status,
    /// Start (or resume) a house cleaning run
    Clean {
        /// Quieter, longer-running cleaning
        #[arg(long)]
        eco: bool,
        /// Honor persistent-map no-go lines
        #[arg(long)]
        no_go_lines: bool,
        /// Navigate more carefully around obstacles
        #[arg(long)]
        extra_care: bool,
    },
    /// Start (or resume) a spot cleaning run
    Spot {
        /// Quieter, longer-running cleaning
        #[arg(long)]
        eco: bool,
        /// Spot width in centimeters
        #[arg(long, default_value = "100")]
        width: u32,
        /// Spot height in centimeters
        #[arg(long, default_value = "100")]
        height: u32,
    },
    /// Stop the current run (pauses when the run can be resumed)
    Stop,
    /// Send the robot back to its base
    Dock,
    /// Follow state changes until interrupted
    Watch,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let _logging_guard = match init_logging(default_log_dir(), default_log_file()) {
        Ok(guard) => guard,
        Err(e) => CliError::LoggingInit(e.to_string()).exit(),
    };

    if let Err(e) = run(args).await {
        e.exit();
    }
}

async fn run(args: Args) -> Result<(), CliError> {
    let settings = match &args.settings {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    };
    let serial = args.serial.as_deref();

    match args.command {
        Command::Robots => commands::robots::run(settings).await,
        Command::Status => {
            let bridge = commands::common::connect(settings, serial).await?;
            commands::status::run(bridge).await
        }
        Command::Clean {
            eco,
            no_go_lines,
            extra_care,
        } => {
            let bridge = commands::common::connect(settings, serial).await?;
            let flags = CleanFlags {
                eco,
                no_go_lines,
                extra_care,
            };
            commands::control::clean(bridge, flags).await
        }
        Command::Spot { eco, width, height } => {
            let bridge = commands::common::connect(settings, serial).await?;
            let flags = CleanFlags {
                eco,
                ..CleanFlags::default()
            };
            let size = SpotSize {
                width_cm: width,
                height_cm: height,
            };
            commands::control::spot(bridge, flags, size).await
        }
        Command::Stop => {
            let bridge = commands::common::connect(settings, serial).await?;
            commands::control::stop(bridge).await
        }
        Command::Dock => {
            let bridge = commands::common::connect(settings, serial).await?;
            commands::control::dock(bridge).await
        }
        Command::Watch => {
            let bridge = commands::common::connect(settings, serial).await?;
            commands::watch::run(bridge).await
        }
    }
}
