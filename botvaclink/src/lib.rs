//! BotvacLink - Neato Botvac cloud bridge
//!
//! This library connects a smart-home hub to the Neato cloud: it
//! authenticates an account, discovers registered robots, polls per-robot
//! state on a schedule and issues cleaning/docking commands.
//!
//! # High-Level API
//!
//! ```ignore
//! use botvaclink::cache::StateCache;
//! use botvaclink::controller::{CleaningOptions, RobotController};
//! use botvaclink::http::ReqwestClient;
//! use botvaclink::nucleo::NucleoClient;
//! use botvaclink::robot::RobotIdentity;
//! use std::sync::Arc;
//!
//! let identity = RobotIdentity::new("Roberta", "OPS01234-5678", "secret");
//! let api = Arc::new(NucleoClient::new(ReqwestClient::new()?, identity));
//! let controller = RobotController::new(Arc::new(StateCache::new(api)));
//!
//! // Issue an intent; the controller checks what the robot currently
//! // allows and sends the one legal low-level command.
//! controller.start_cleaning(CleaningOptions::default()).await?;
//! ```
//!
//! Background polling is driven by [`poll::PollScheduler`], which pushes
//! derived capability values to a host-provided [`poll::StatusSink`].

pub mod auth;
pub mod beehive;
pub mod cache;
pub mod config;
pub mod controller;
pub mod http;
pub mod logging;
pub mod nucleo;
pub mod poll;
pub mod robot;
pub mod status;

/// Version of the BotvacLink library and CLI.
///
/// This is synchronized across all components in the workspace.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
