//! Undo-tags command implementation.
//!
//! Reads a TaggedVMs CSV and replaces each resource's tags with the
//! recorded OldTags.

use super::RunContext;
use crate::cli::prompt::Prompter;
use crate::core::{exporter, undo};
use crate::services::azure::{AzCli, AzureSession};
use crate::utils::fs;
use crate::utils::runlog::RunLog;
use crate::Result;
use colored::Colorize;
use std::path::Path;

/// Revert a tagging run.
pub async fn undo_tags(
    ctx: &RunContext,
    csv: &Path,
    yes: bool,
    checksum: Option<&str>,
) -> Result<()> {
    println!("{}", "[UNDO] Revert tags".bold().cyan());
    println!();
    ctx.print_mode();

    // Validate CSV exists
    if !csv.exists() {
        return Err(crate::Error::PathNotFound(csv.display().to_string()));
    }

    if let Some(expected) = checksum {
        fs::verify_checksum(csv, expected)?;
        println!("{}", "[OK] CSV checksum verified".green());
    }

    println!("[INFO] Loading tag changes: {}", csv.display());
    let changes = exporter::read_tag_csv(csv)?;
    println!("  {} {}", "Resources:".bold(), changes.len());
    println!();

    if changes.is_empty() {
        println!("Nothing to undo.");
        return Ok(());
    }

    if !ctx.dry_run {
        println!(
            "{}",
            "[WARNING] Tags on these resources will be replaced with their previous values!"
                .bold()
                .yellow()
        );
        println!();

        if !yes && !Prompter::new().confirm("Proceed with undo?", false)? {
            println!("{}", "Cancelled. No changes made.".yellow());
            return Ok(());
        }
    }

    let provider = AzCli::new(AzureSession::current(&ctx.config.az_path).await?);

    let output_dir = ctx.output_dir();
    fs::ensure_output_dir(output_dir)?;
    let stamp = fs::artifact_timestamp();
    let mut log = RunLog::open(&fs::artifact_path(output_dir, "Undo-Tags-", &stamp, "log"))?;
    log.info(format!("Source CSV: {}", csv.display()));

    let result = undo::replay_undo(&provider, &changes, ctx.dry_run, &mut log).await;

    result.print_summary();
    println!();

    if result.is_success() {
        if ctx.dry_run {
            println!("{}", "[OK] Dry run complete - no changes were made".green());
        } else {
            println!("{}", "[OK] Tags restored successfully!".green());
        }
    } else {
        println!("{}", "[WARNING] Undo completed with errors".yellow());
    }
    println!("{} {}", "Run log:".bold(), log.path().display());

    Ok(())
}
