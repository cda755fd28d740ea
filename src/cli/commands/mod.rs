//! CLI command implementations.

pub mod tag;
pub mod undo_tags;
pub mod zone_shutdown;

use crate::cli::prompt::Prompter;
use crate::models::config::Config;
use crate::models::inventory::VirtualMachine;
use crate::services::azure::{AzCli, AzureSession};
use crate::services::provider::VmProvider;
use crate::Result;
use colored::Colorize;
use std::path::Path;

/// Settings shared by every command in one invocation.
#[derive(Debug, Clone)]
pub struct RunContext {
    pub config: Config,
    /// Simulate mode: log mutations instead of issuing them.
    pub dry_run: bool,
}

impl RunContext {
    pub fn output_dir(&self) -> &Path {
        &self.config.output_dir
    }

    /// Print the simulate-mode banner.
    pub fn print_mode(&self) {
        if self.dry_run {
            println!(
                "{}",
                "[DRY-RUN] No changes will be made; commands are logged as 'would run'"
                    .bold()
                    .yellow()
            );
            println!();
        }
    }
}

/// Pick a subscription and open a provider session on it.
pub async fn open_provider(ctx: &RunContext, prompter: &Prompter) -> Result<AzCli> {
    let az_path = ctx.config.az_path.as_path();
    let subscriptions = AzureSession::list_subscriptions(az_path).await?;
    let subscription = prompter.select_subscription(&subscriptions)?;

    println!("  {} {}", "Subscription:".bold(), subscription);
    println!();
    tracing::info!("Using subscription {}", subscription.id);

    Ok(AzCli::new(AzureSession::new(az_path.to_path_buf(), subscription)))
}

/// List the inventory; an empty inventory is a precondition failure.
pub async fn load_inventory<P: VmProvider>(
    provider: &P,
    subscription_id: &str,
) -> Result<Vec<VirtualMachine>> {
    println!("[INFO] Listing virtual machines...");
    let vms = provider.list_vms().await?;

    if vms.is_empty() {
        return Err(crate::Error::EmptyInventory(subscription_id.to_string()));
    }

    println!("  {} {}", "VMs found:".bold(), vms.len());
    println!();
    Ok(vms)
}
