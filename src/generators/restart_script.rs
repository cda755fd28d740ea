//! Restart script generator.
//!
//! One `az vm start` per confirmed target. Starting reverses both stop and
//! deallocate, so the script does not care which action was taken.

use crate::models::inventory::VirtualMachine;
use crate::services::provider::Mutation;
use crate::utils::shell::quote;

/// Inputs for the restart script.
#[derive(Debug, Clone)]
pub struct RestartScript<'a> {
    pub generated_at: &'a str,
    pub subscription_id: &'a str,
    /// Menu selection the targets came from.
    pub selection: &'a str,
    pub vms: &'a [VirtualMachine],
}

/// Render the restart script.
pub fn render_restart_script(s: &RestartScript<'_>) -> String {
    let mut out = String::new();

    out.push_str("#!/usr/bin/env bash\n");
    out.push_str("# DR zone restart script.\n");
    out.push_str(&format!("# Generated: {}\n", s.generated_at));
    out.push_str(&format!("# Selection: {}\n", s.selection));
    out.push_str(&format!("# VMs: {}\n", s.vms.len()));
    out.push('\n');
    out.push_str(&format!(
        "az account set --subscription {}\n",
        quote(s.subscription_id)
    ));
    out.push('\n');

    for vm in s.vms {
        out.push_str(&format!("echo {}\n", quote(&format!("Starting {}", vm))));
        out.push_str(&format!(
            "{} || echo {} >&2\n",
            Mutation::start(vm),
            quote(&format!("Failed to start {}", vm.name))
        ));
    }

    out
}
