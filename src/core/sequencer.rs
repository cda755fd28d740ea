//! Shutdown/restart sequencer for the zone DR workflow.
//!
//! Per VM the OS disk is probed first: ephemeral (`Local`) disks are
//! stopped, everything else is deallocated. Both calls are issued with
//! `--no-wait`; waiting for stopped VMs is a separate, bounded polling step,
//! followed by an optional deallocation of the VMs that reached `stopped`.
//! VMs are processed strictly one at a time.

use crate::models::inventory::VirtualMachine;
use crate::models::shutdown::{ShutdownAction, ShutdownRecord, StopWait};
use crate::services::provider::{Mutation, VmProvider};
use crate::utils::runlog::RunLog;
use colored::Colorize;
use std::time::Duration;
use tokio::time::Instant;

/// Sequencer settings.
#[derive(Debug, Clone)]
pub struct SequencerConfig {
    /// Per-VM ceiling when waiting for `stopped`.
    pub poll_timeout: Duration,
    /// Delay between power state polls.
    pub poll_interval: Duration,
    /// Log mutations instead of issuing them.
    pub dry_run: bool,
}

impl Default for SequencerConfig {
    fn default() -> Self {
        Self {
            poll_timeout: Duration::from_secs(300),
            poll_interval: Duration::from_secs(10),
            dry_run: false,
        }
    }
}

/// Outcome of the shutdown pass.
#[derive(Debug, Default)]
pub struct ShutdownReport {
    /// Requests issued (or simulated), in target order.
    pub records: Vec<ShutdownRecord>,
    /// VMs that were stopped rather than deallocated.
    pub stopped: Vec<VirtualMachine>,
    /// VMs whose probe or shutdown call failed.
    pub failed: Vec<(VirtualMachine, String)>,
}

/// Outcome of waiting for stopped VMs.
#[derive(Debug, Default)]
pub struct WaitReport {
    /// Reached `stopped`; eligible for deallocation.
    pub confirmed: Vec<VirtualMachine>,
    /// Already deallocated by the time they were polled.
    pub deallocated: Vec<VirtualMachine>,
    /// Did not reach `stopped` within the timeout.
    pub timed_out: Vec<VirtualMachine>,
    /// Power state could not be read.
    pub failed: Vec<(VirtualMachine, String)>,
}

/// Outcome of the follow-up deallocation pass.
#[derive(Debug, Default)]
pub struct DeallocateReport {
    pub deallocated: Vec<VirtualMachine>,
    pub failed: Vec<(VirtualMachine, String)>,
}

/// Issue a stop or deallocate for every target.
pub async fn shut_down<P: VmProvider>(
    provider: &P,
    targets: &[VirtualMachine],
    config: &SequencerConfig,
    log: &mut RunLog,
) -> ShutdownReport {
    let mut report = ShutdownReport::default();
    let total = targets.len();

    for (idx, vm) in targets.iter().enumerate() {
        println!("[{}/{}] {}", idx + 1, total, vm.to_string().bold());

        let option = match provider
            .ephemeral_os_disk(&vm.resource_group, &vm.name)
            .await
        {
            Ok(option) => option,
            Err(e) => {
                tracing::error!("OS disk probe failed for {}: {}", vm.name, e);
                println!("  {} OS disk probe failed: {}", "[FAIL]".red(), e);
                log.error(format!("OS disk probe failed for {}: {}", vm, e));
                report.failed.push((vm.clone(), e.to_string()));
                continue;
            }
        };

        let action = ShutdownAction::for_ephemeral_option(option.as_deref());
        let mutation = match action {
            ShutdownAction::Stop => Mutation::stop(vm),
            ShutdownAction::Deallocate => Mutation::deallocate(vm),
        };

        if config.dry_run {
            println!("  {} {}", "[DRY RUN]".yellow(), mutation);
            log.would_run(&mutation);
        } else {
            log.running(&mutation);
            if let Err(e) = provider.apply(&mutation).await {
                tracing::error!("{} failed for {}: {}", action, vm.name, e);
                println!("  {} {}: {}", "[FAIL]".red(), action, e);
                log.command_failed(&mutation, &e);
                report.failed.push((vm.clone(), e.to_string()));
                continue;
            }
            match action {
                ShutdownAction::Stop => {
                    println!("  {} stop requested (ephemeral OS disk)", "[OK]".green())
                }
                ShutdownAction::Deallocate => {
                    println!("  {} deallocate requested", "[OK]".green())
                }
            }
        }

        if action == ShutdownAction::Stop {
            report.stopped.push(vm.clone());
        }
        report.records.push(ShutdownRecord {
            vm: vm.clone(),
            action,
        });
    }

    log.info(format!(
        "Shutdown pass finished: {} requested ({} stopped, {} deallocated), {} failed",
        report.records.len(),
        report.stopped.len(),
        report.records.len() - report.stopped.len(),
        report.failed.len()
    ));

    report
}

/// Poll one VM until it is stopped, deallocated, or the timeout passes.
pub async fn wait_until_stopped<P: VmProvider>(
    provider: &P,
    vm: &VirtualMachine,
    config: &SequencerConfig,
) -> StopWait {
    let deadline = Instant::now() + config.poll_timeout;

    loop {
        match provider.power_state(&vm.resource_group, &vm.name).await {
            Ok(state) if state == "stopped" => return StopWait::Stopped,
            Ok(state) if state == "deallocated" => return StopWait::Deallocated,
            Ok(state) => {
                tracing::debug!("{} is {}", vm.name, state);
                if Instant::now() >= deadline {
                    return StopWait::TimedOut { last_state: state };
                }
            }
            Err(e) => return StopWait::Failed(e.to_string()),
        }
        tokio::time::sleep(config.poll_interval).await;
    }
}

/// Wait for every stopped VM, one at a time.
pub async fn wait_for_stopped<P: VmProvider>(
    provider: &P,
    vms: &[VirtualMachine],
    config: &SequencerConfig,
    log: &mut RunLog,
) -> WaitReport {
    let mut report = WaitReport::default();

    if config.dry_run {
        for vm in vms {
            println!("  {} would wait for {} to stop", "[DRY RUN]".yellow(), vm);
            log.info(format!("WhatIf: would wait for {} to reach 'stopped'", vm));
            report.confirmed.push(vm.clone());
        }
        return report;
    }

    for vm in vms {
        println!(
            "  Waiting for {} to stop (timeout {}s)...",
            vm.name,
            config.poll_timeout.as_secs()
        );

        match wait_until_stopped(provider, vm, config).await {
            StopWait::Stopped => {
                println!("  {} {} stopped", "[OK]".green(), vm.name);
                log.info(format!("{} reached 'stopped'", vm));
                report.confirmed.push(vm.clone());
            }
            StopWait::Deallocated => {
                println!("  {} {} already deallocated", "[OK]".green(), vm.name);
                log.info(format!("{} is already deallocated", vm));
                report.deallocated.push(vm.clone());
            }
            StopWait::TimedOut { last_state } => {
                println!(
                    "  {} {} did not stop within {}s (last state: {})",
                    "[TIMEOUT]".yellow(),
                    vm.name,
                    config.poll_timeout.as_secs(),
                    last_state
                );
                log.warn(format!(
                    "Timed out waiting for {} to stop after {}s (last state: {}); excluded from deallocation",
                    vm,
                    config.poll_timeout.as_secs(),
                    last_state
                ));
                report.timed_out.push(vm.clone());
            }
            StopWait::Failed(e) => {
                println!("  {} {}: {}", "[FAIL]".red(), vm.name, e);
                log.error(format!("Could not read power state for {}: {}", vm, e));
                report.failed.push((vm.clone(), e));
            }
        }
    }

    report
}

/// Deallocate VMs that were confirmed stopped.
pub async fn deallocate_stopped<P: VmProvider>(
    provider: &P,
    vms: &[VirtualMachine],
    config: &SequencerConfig,
    log: &mut RunLog,
) -> DeallocateReport {
    let mut report = DeallocateReport::default();

    for vm in vms {
        let mutation = Mutation::deallocate(vm);

        if config.dry_run {
            println!("  {} {}", "[DRY RUN]".yellow(), mutation);
            log.would_run(&mutation);
            report.deallocated.push(vm.clone());
            continue;
        }

        log.running(&mutation);
        match provider.apply(&mutation).await {
            Ok(()) => {
                println!("  {} deallocate requested for {}", "[OK]".green(), vm.name);
                report.deallocated.push(vm.clone());
            }
            Err(e) => {
                tracing::error!("Deallocate failed for {}: {}", vm.name, e);
                println!("  {} {}: {}", "[FAIL]".red(), vm.name, e);
                log.command_failed(&mutation, &e);
                report.failed.push((vm.clone(), e.to_string()));
            }
        }
    }

    log.info(format!(
        "Deallocation pass finished: {} requested, {} failed",
        report.deallocated.len(),
        report.failed.len()
    ));

    report
}

/// Counts for the end-of-run summary.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ShutdownSummary {
    pub targets: usize,
    pub requested: usize,
    pub stopped: usize,
    pub failed: usize,
    pub timed_out: usize,
    pub deallocated: usize,
    pub dealloc_failed: usize,
}

impl ShutdownSummary {
    pub fn new(
        targets: usize,
        shutdown: &ShutdownReport,
        wait: Option<&WaitReport>,
        dealloc: Option<&DeallocateReport>,
    ) -> Self {
        Self {
            targets,
            requested: shutdown.records.len(),
            stopped: shutdown.stopped.len(),
            failed: shutdown.failed.len(),
            timed_out: wait.map_or(0, |w| w.timed_out.len()),
            deallocated: dealloc.map_or(0, |d| d.deallocated.len()),
            dealloc_failed: dealloc.map_or(0, |d| d.failed.len()),
        }
    }

    /// Label/count rows; follow-up rows only appear when non-zero.
    pub fn rows(&self) -> Vec<(&'static str, usize)> {
        let mut rows = vec![
            ("Targets:", self.targets),
            ("Requested:", self.requested),
            ("Stopped (ephemeral):", self.stopped),
            ("Failed:", self.failed),
        ];
        if self.timed_out > 0 {
            rows.push(("Timed out:", self.timed_out));
        }
        if self.deallocated > 0 {
            rows.push(("Deallocated:", self.deallocated));
        }
        if self.dealloc_failed > 0 {
            rows.push(("Dealloc failed:", self.dealloc_failed));
        }
        rows
    }

    pub fn print_summary(&self) {
        println!("{}", "[Shutdown Summary]".bold().green());
        for (label, count) in self.rows() {
            println!("  {} {}", label.bold(), count);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SequencerConfig::default();
        assert_eq!(config.poll_timeout, Duration::from_secs(300));
        assert!(!config.dry_run);
    }

    #[test]
    fn test_summary_rows_skip_zero_follow_ups() {
        let summary = ShutdownSummary::new(3, &ShutdownReport::default(), None, None);
        let labels: Vec<_> = summary.rows().into_iter().map(|(l, _)| l).collect();
        assert_eq!(
            labels,
            vec!["Targets:", "Requested:", "Stopped (ephemeral):", "Failed:"]
        );
    }
}
