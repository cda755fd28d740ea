//! Tag undo replay.
//!
//! Reverts a tagging run by replacing each resource's tags with the
//! recorded pre-change map. The forward step merged a single key; the
//! reverse is a full overwrite, which is correct because `old_tags` was
//! captured before the merge and is the complete desired end state.

use crate::models::tags::TagChange;
use crate::services::provider::{Mutation, VmProvider};
use crate::utils::runlog::RunLog;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

/// Result of an undo replay.
#[derive(Debug, Default)]
pub struct UndoResult {
    /// Number of resources reverted.
    pub success_count: usize,
    /// Number of failed reverts.
    pub error_count: usize,
    /// Error messages.
    pub errors: Vec<String>,
}

impl UndoResult {
    /// Check if every revert succeeded.
    pub fn is_success(&self) -> bool {
        self.error_count == 0
    }

    /// Print summary.
    pub fn print_summary(&self) {
        println!("{}", "[Undo Summary]".bold().green());
        println!("  {} {}", "Reverted:".bold(), self.success_count);
        println!("  {} {}", "Failed:".bold(), self.error_count);

        if !self.errors.is_empty() {
            println!();
            println!("{}", "[Errors]".bold().red());
            for error in &self.errors {
                println!("  - {}", error);
            }
        }
    }
}

/// Replace tags on every recorded resource with its `old_tags`.
pub async fn replay_undo<P: VmProvider>(
    provider: &P,
    changes: &[TagChange],
    dry_run: bool,
    log: &mut RunLog,
) -> UndoResult {
    let mut result = UndoResult::default();

    log.info(format!(
        "Reverting tags on {} resource(s){}",
        changes.len(),
        if dry_run { " (WhatIf)" } else { "" }
    ));

    let pb = ProgressBar::new(changes.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap()
            .progress_chars("█▓░"),
    );

    for change in changes {
        pb.set_message(change.vm_name.clone());
        pb.inc(1);

        let mutation = Mutation::ReplaceTags {
            resource_id: change.resource_id.clone(),
            tags: change.old_tags.clone(),
        };

        if dry_run {
            pb.println(format!("  {} {}", "[DRY RUN]".yellow(), mutation));
            log.would_run(&mutation);
            result.success_count += 1;
            continue;
        }

        log.running(&mutation);
        match provider.apply(&mutation).await {
            Ok(()) => {
                tracing::debug!("Reverted tags on {}", change.resource_id);
                result.success_count += 1;
            }
            Err(e) => {
                let error_msg = format!("{}: {}", change.vm_name, e);
                tracing::error!("Undo failed: {}", error_msg);
                pb.println(format!("  {} {}", "[FAIL]".red(), error_msg));
                log.command_failed(&mutation, &e);
                result.errors.push(error_msg);
                result.error_count += 1;
            }
        }
    }

    pb.finish_with_message("Done!");
    println!();

    log.info(format!(
        "Undo finished: {} reverted, {} failed",
        result.success_count, result.error_count
    ));

    result
}
