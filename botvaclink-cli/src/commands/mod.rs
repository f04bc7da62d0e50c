//! CLI command implementations.
//!
//! Each subcommand has its own module; [`common`] holds the shared
//! authenticate-and-connect plumbing.

pub mod common;
pub mod control;
pub mod robots;
pub mod status;
pub mod watch;
