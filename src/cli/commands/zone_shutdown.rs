//! Zone shutdown command implementation.
//!
//! Picks a DR target set by availability zone, shuts it down and writes a
//! restart script for exactly that set.

use super::{load_inventory, open_provider, RunContext};
use crate::cli::prompt::Prompter;
use crate::core::sequencer::{self, SequencerConfig, ShutdownSummary};
use crate::core::zones::{self, MenuChoice};
use crate::generators::restart_script::{render_restart_script, RestartScript};
use crate::models::inventory::VirtualMachine;
use crate::utils::fs;
use crate::utils::runlog::RunLog;
use crate::Result;
use chrono::Local;
use colored::Colorize;
use std::time::Duration;

/// Run the interactive zone shutdown workflow.
pub async fn zone_shutdown(
    ctx: &RunContext,
    timeout: Option<u64>,
    poll_interval: Option<u64>,
) -> Result<()> {
    println!("{}", "[DR] Zone shutdown".bold().cyan());
    println!();
    ctx.print_mode();

    let prompter = Prompter::new();
    let provider = open_provider(ctx, &prompter).await?;
    let subscription = provider.session().subscription().clone();

    let vms = load_inventory(&provider, &subscription.id).await?;
    let groups = zones::group_by_zone(&vms);

    println!("  {} {}", "Zonal VMs:".bold(), groups.zonal_count(&vms));
    println!("  {} {}", "Non-zonal VMs:".bold(), groups.non_zonal.len());
    println!();

    // Resolve the menu choice before any specific-VM handling.
    let menu = zones::build_menu(&vms, &groups);
    let entry = &menu[prompter.select_menu(&menu)?];

    let (targets, selection) = match &entry.choice {
        MenuChoice::None => {
            println!("{}", "No action selected. Exiting.".yellow());
            return Ok(());
        }
        MenuChoice::Specific => {
            let vm = prompter.specific_vm(&vms)?;
            let label = format!("Specific VM: {}", vm.name);
            (vec![vm], label)
        }
        choice => (
            zones::resolve_targets(choice, &vms, &groups),
            entry.label.clone(),
        ),
    };

    if targets.is_empty() {
        println!("{}", "The selected group has no VMs. Nothing to do.".yellow());
        return Ok(());
    }

    print_targets(&targets);

    if !prompter.confirm(
        &format!("Shut down {} VM(s)?", targets.len()),
        false,
    )? {
        println!("{}", "Cancelled. No changes made.".yellow());
        return Ok(());
    }

    let output_dir = ctx.output_dir();
    fs::ensure_output_dir(output_dir)?;
    let stamp = fs::artifact_timestamp();

    let mut log = RunLog::open(&fs::artifact_path(
        output_dir,
        "DR-Zone-Shutdown-",
        &stamp,
        "log",
    ))?;
    log.info(format!("Subscription: {}", subscription));
    log.info(format!("Selection: {}", selection));
    log.info(format!(
        "Targets ({}): {}",
        targets.len(),
        targets
            .iter()
            .map(|v| v.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    ));
    if ctx.dry_run {
        log.info("WhatIf mode: no changes will be made");
    }

    let config = SequencerConfig {
        poll_timeout: timeout
            .map(Duration::from_secs)
            .unwrap_or_else(|| ctx.config.poll_timeout()),
        poll_interval: poll_interval
            .map(Duration::from_secs)
            .unwrap_or_else(|| ctx.config.poll_interval()),
        dry_run: ctx.dry_run,
    };

    println!();
    println!("{}", "[EXEC] Shutting down...".bold().cyan());
    let report = sequencer::shut_down(&provider, &targets, &config, &mut log).await;
    println!();

    let mut wait = None;
    let mut dealloc = None;
    if !report.stopped.is_empty() {
        println!(
            "{} VM(s) with ephemeral OS disks were stopped, not deallocated.",
            report.stopped.len()
        );

        if prompter.confirm("Wait for them to reach 'stopped'?", true)? {
            let waited =
                sequencer::wait_for_stopped(&provider, &report.stopped, &config, &mut log).await;
            println!();

            if !waited.confirmed.is_empty()
                && prompter.confirm(
                    &format!("Deallocate {} stopped VM(s) now?", waited.confirmed.len()),
                    false,
                )?
            {
                dealloc = Some(
                    sequencer::deallocate_stopped(&provider, &waited.confirmed, &config, &mut log)
                        .await,
                );
                println!();
            } else if !waited.confirmed.is_empty() {
                log.info("Operator declined deallocation of stopped VMs");
            }
            wait = Some(waited);
        } else {
            log.info("Operator skipped waiting for stopped VMs");
        }
    }

    // Restart script covers the whole confirmed target set.
    let generated_at = Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
    let script = render_restart_script(&RestartScript {
        generated_at: &generated_at,
        subscription_id: &subscription.id,
        selection: &selection,
        vms: &targets,
    });
    let script_path = fs::artifact_path(output_dir, "DR-Zone-Restart-", &stamp, "sh");
    fs::write_script(&script_path, &script)?;
    log.info(format!("Restart script written: {}", script_path.display()));
    log.info(format!(
        "Completed at {}",
        Local::now().format("%Y-%m-%d %H:%M:%S")
    ));

    ShutdownSummary::new(targets.len(), &report, wait.as_ref(), dealloc.as_ref())
        .print_summary();
    println!();
    println!(
        "{} {}",
        "[OK] Restart script saved to:".bold().green(),
        script_path.display()
    );
    println!("{} {}", "[OK] Run log:".bold().green(), log.path().display());

    Ok(())
}

fn print_targets(targets: &[VirtualMachine]) {
    println!();
    println!(
        "{:<30} {:<30} {}",
        "VM".bold(),
        "Resource group".bold(),
        "Zones".bold()
    );
    println!("{}", "-".repeat(70));
    for vm in targets {
        println!(
            "{:<30} {:<30} {}",
            vm.name,
            vm.resource_group,
            vm.zones_label()
        );
    }
    println!();
}
