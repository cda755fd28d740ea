//! Command line argument definitions.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Azfleet - Azure VM fleet tagging and zone DR operations
#[derive(Parser, Debug)]
#[command(name = "azfleet")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Skip preflight checks
    #[arg(long, global = true)]
    pub skip_preflight: bool,

    /// Simulate: log every change as "would run" instead of making it
    #[arg(long, visible_alias = "what-if", global = true)]
    pub dry_run: bool,

    /// Directory for CSV exports, generated scripts and run logs
    #[arg(short, long, value_name = "DIR", global = true)]
    pub output_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Tag selected VMs and generate an undo script
    Tag,

    /// Revert a tagging run from its TaggedVMs CSV
    UndoTags {
        /// Path to the TaggedVMs CSV
        #[arg(value_name = "CSV")]
        csv: PathBuf,

        /// Do not ask for confirmation
        #[arg(short, long)]
        yes: bool,

        /// Expected SHA-256 of the CSV
        #[arg(long, value_name = "SHA256")]
        checksum: Option<String>,
    },

    /// Shut down VMs by availability zone and generate a restart script
    ZoneShutdown {
        /// Seconds to wait for each stopped VM
        #[arg(long, value_name = "SECS")]
        timeout: Option<u64>,

        /// Seconds between power state polls
        #[arg(long, value_name = "SECS")]
        poll_interval: Option<u64>,
    },
}
