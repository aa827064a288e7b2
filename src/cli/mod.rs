//! CLI module
//!
//! # Commands
//!
//! - `extract` - Pull WMS entities, build the combined report, publish
//! - `db` - Run configured SQL scripts and publish their results
//! - `check` - Probe the WMS API and report the page count

mod commands;
mod runner;

pub use commands::{Cli, Commands};
pub use runner::Runner;
