//! Tag mutation engine.
//!
//! For each selected VM: read current tags, skip when the key is already
//! present, otherwise merge the new key/value and read the tags back. One
//! VM's failure is logged and never stops the batch.

use crate::models::inventory::VirtualMachine;
use crate::models::tags::{TagChange, TagMap};
use crate::services::provider::{Mutation, VmProvider};
use crate::utils::runlog::RunLog;
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::fmt;

/// Maximum tag key length accepted by Azure.
pub const MAX_TAG_KEY_LEN: usize = 512;
/// Maximum tag value length accepted by Azure.
pub const MAX_TAG_VALUE_LEN: usize = 256;

/// Why a tag key or value was rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TagInputError {
    Empty,
    TooLong { max: usize, actual: usize },
}

impl fmt::Display for TagInputError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TagInputError::Empty => write!(f, "Value cannot be empty or whitespace"),
            TagInputError::TooLong { max, actual } => {
                write!(f, "Too long: {} characters (max {})", actual, max)
            }
        }
    }
}

impl std::error::Error for TagInputError {}

fn validate_text(input: &str, max: usize) -> Result<String, TagInputError> {
    if input.trim().is_empty() {
        return Err(TagInputError::Empty);
    }
    let actual = input.chars().count();
    if actual > max {
        return Err(TagInputError::TooLong { max, actual });
    }
    Ok(input.to_string())
}

/// Validate a tag key (non-blank, at most 512 characters).
pub fn validate_tag_key(input: &str) -> Result<String, TagInputError> {
    validate_text(input, MAX_TAG_KEY_LEN)
}

/// Validate a tag value (non-blank, at most 256 characters).
pub fn validate_tag_value(input: &str) -> Result<String, TagInputError> {
    validate_text(input, MAX_TAG_VALUE_LEN)
}

/// The tag to apply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagRequest {
    pub key: String,
    pub value: String,
}

/// Outcome of a tagging batch.
#[derive(Debug, Default)]
pub struct TagOutcome {
    /// One record per successfully tagged VM, in selection order.
    pub changes: Vec<TagChange>,
    /// VMs that already carried the key.
    pub skipped: Vec<VirtualMachine>,
    /// VMs whose read or merge failed, with the error text.
    pub failed: Vec<(VirtualMachine, String)>,
}

impl TagOutcome {
    /// Print summary.
    pub fn print_summary(&self) {
        println!("{}", "[Tagging Summary]".bold().green());
        println!("  {} {}", "Tagged:".bold(), self.changes.len());
        println!("  {} {}", "Skipped (key present):".bold(), self.skipped.len());
        println!("  {} {}", "Failed:".bold(), self.failed.len());

        if !self.failed.is_empty() {
            println!();
            println!("{}", "[Errors]".bold().red());
            for (vm, error) in &self.failed {
                println!("  - {}: {}", vm, error);
            }
        }
    }
}

/// Apply `request` to `vms` one at a time.
///
/// In simulate mode no merge is issued; the would-be command is logged and
/// the new tags are computed locally so the artifacts keep the same shape.
pub async fn apply_tag<P: VmProvider>(
    provider: &P,
    vms: &[VirtualMachine],
    request: &TagRequest,
    dry_run: bool,
    log: &mut RunLog,
) -> TagOutcome {
    let mut outcome = TagOutcome::default();

    log.info(format!(
        "Applying tag {}={} to {} VM(s){}",
        request.key,
        request.value,
        vms.len(),
        if dry_run { " (WhatIf)" } else { "" }
    ));

    let pb = ProgressBar::new(vms.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap()
            .progress_chars("=>-"),
    );

    for vm in vms {
        pb.set_message(vm.name.clone());
        pb.inc(1);

        let old_tags = match provider.get_tags(&vm.id).await {
            Ok(tags) => tags,
            Err(e) => {
                tracing::error!("Failed to read tags for {}: {}", vm.name, e);
                pb.println(format!("  {} {}: {}", "[FAIL]".red(), vm.name, e));
                log.error(format!("Failed to read tags for {} ({}): {}", vm.name, vm.id, e));
                outcome.failed.push((vm.clone(), e.to_string()));
                continue;
            }
        };

        if old_tags.contains_key(&request.key) {
            tracing::info!("{} already has tag '{}', skipping", vm.name, request.key);
            pb.println(format!(
                "  {} {}: tag '{}' already present",
                "[SKIP]".yellow(),
                vm.name,
                request.key
            ));
            log.info(format!(
                "Skipped {}: tag '{}' already present",
                vm.name, request.key
            ));
            outcome.skipped.push(vm.clone());
            continue;
        }

        let mutation = Mutation::MergeTag {
            resource_id: vm.id.clone(),
            key: request.key.clone(),
            value: request.value.clone(),
        };

        let new_tags = if dry_run {
            log.would_run(&mutation);
            old_tags.merged(&request.key, &request.value)
        } else {
            log.running(&mutation);
            if let Err(e) = provider.apply(&mutation).await {
                tracing::error!("Failed to tag {}: {}", vm.name, e);
                pb.println(format!("  {} {}: {}", "[FAIL]".red(), vm.name, e));
                log.command_failed(&mutation, &e);
                outcome.failed.push((vm.clone(), e.to_string()));
                continue;
            }
            read_back_tags(provider, vm, &old_tags, request, log).await
        };

        pb.println(format!("  {} {}", "[OK]".green(), vm.name));
        outcome.changes.push(TagChange {
            resource_group: vm.resource_group.clone(),
            vm_name: vm.name.clone(),
            resource_id: vm.id.clone(),
            old_tags,
            new_tags,
        });
    }

    pb.finish_with_message("Done!");
    println!();

    log.info(format!(
        "Tagging finished: {} tagged, {} skipped, {} failed",
        outcome.changes.len(),
        outcome.skipped.len(),
        outcome.failed.len()
    ));

    outcome
}

/// Re-read tags after a successful merge.
///
/// The merge already happened, so a failed read must not drop the change
/// record: fall back to the locally merged map and log it.
async fn read_back_tags<P: VmProvider>(
    provider: &P,
    vm: &VirtualMachine,
    old_tags: &TagMap,
    request: &TagRequest,
    log: &mut RunLog,
) -> TagMap {
    match provider.get_tags(&vm.id).await {
        Ok(tags) => tags,
        Err(e) => {
            tracing::warn!("Tagged {} but could not re-read tags: {}", vm.name, e);
            log.warn(format!(
                "Tagged {} but could not re-read tags ({}); recording computed tags",
                vm.name, e
            ));
            old_tags.merged(&request.key, &request.value)
        }
    }
}
