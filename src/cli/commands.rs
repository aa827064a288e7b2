//! CLI commands and argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// WMS extraction pipeline CLI
#[derive(Parser, Debug)]
#[command(name = "wms-extract")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file (JSON)
    #[arg(short = 'C', long, global = true, default_value = "config.json")]
    pub config: PathBuf,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Extract WMS entities and publish CSV artifacts
    Extract {
        /// Entities to extract (comma-separated, empty = all)
        #[arg(long)]
        entities: Option<String>,

        /// Write artifacts to a local directory instead of Drive
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Cap the number of pages fetched per entity
        #[arg(long)]
        limit_pages: Option<u32>,
    },

    /// Run configured SQL scripts and publish their results
    Db {
        /// Write results to a local directory instead of Drive
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Probe the WMS API and report the page count for one entity
    Check {
        /// Entity to probe
        #[arg(long, default_value = "order_status")]
        entity: String,
    },
}
