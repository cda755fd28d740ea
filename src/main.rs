//! Azfleet CLI
//!
//! Bulk VM tagging with undo, and zone-based DR shutdown/restart for Azure.

use azfleet::cli::{
    args::{Cli, Commands},
    commands::{tag, undo_tags, zone_shutdown, RunContext},
};
use azfleet::models::config::load_config;
use azfleet::preflight;
use clap::Parser;
use std::path::Path;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Parse command line arguments
    let cli = Cli::parse();

    // Initialize logging
    init_logging(cli.verbose);

    // Load configuration, CLI flags take precedence
    let mut config = load_config();
    if let Some(dir) = cli.output_dir {
        config.output_dir = dir;
    }
    tracing::debug!("Configuration: {:?}", config);

    let ctx = RunContext {
        config,
        dry_run: cli.dry_run,
    };

    // Run preflight checks unless skipped
    if !cli.skip_preflight {
        run_preflight_checks(&ctx.config.az_path).await?;
    }

    // Run the appropriate command
    match cli.command {
        Commands::Tag => {
            tag::tag(&ctx).await?;
        }

        Commands::UndoTags { csv, yes, checksum } => {
            undo_tags::undo_tags(&ctx, &csv, yes, checksum.as_deref()).await?;
        }

        Commands::ZoneShutdown {
            timeout,
            poll_interval,
        } => {
            zone_shutdown::zone_shutdown(&ctx, timeout, poll_interval).await?;
        }
    }

    Ok(())
}

/// Initialize the logging system.
fn init_logging(verbose: bool) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = if verbose {
        EnvFilter::new("azfleet=debug")
    } else {
        EnvFilter::new("azfleet=info")
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).without_time())
        .with(filter)
        .init();
}

/// Run preflight checks and exit if any fail.
async fn run_preflight_checks(az_path: &Path) -> anyhow::Result<()> {
    use colored::Colorize;

    println!("{}", "Running preflight checks...".bold());
    println!();

    let results = preflight::run_preflight_checks(az_path).await;
    preflight::print_results(&results);

    println!();

    if !preflight::all_passed(&results) {
        preflight::into_result(results)?;
        anyhow::bail!("Preflight checks failed. Fix the issues above and try again.");
    }

    Ok(())
}
