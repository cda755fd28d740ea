//! Virtual machine inventory model.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A virtual machine as listed once at the start of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VirtualMachine {
    /// Full ARM resource id.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Resource group name.
    pub resource_group: String,
    /// Availability zones (empty for non-zonal VMs).
    #[serde(default)]
    pub zones: Vec<String>,
}

impl VirtualMachine {
    /// Whether the VM is pinned to at least one availability zone.
    pub fn is_zonal(&self) -> bool {
        !self.zones.is_empty()
    }

    /// Zone list for display, e.g. "1,2" or "-".
    pub fn zones_label(&self) -> String {
        if self.zones.is_empty() {
            "-".to_string()
        } else {
            self.zones.join(",")
        }
    }
}

impl fmt::Display for VirtualMachine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.resource_group)
    }
}

/// Azure subscription visible to the signed-in account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub is_default: bool,
}

impl fmt::Display for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name, self.id)
    }
}

/// Case-folded resource group; the single key for both sorting and grouping.
fn group_key(resource_group: &str) -> String {
    resource_group.to_lowercase()
}

/// Sort VMs by resource group, then name (both case-insensitive).
///
/// Printed indices are positions in the sorted list, so the grouping shown
/// to the operator and the index space the selection parser checks agree.
pub fn sort_for_display(vms: &mut [VirtualMachine]) {
    vms.sort_by(|a, b| {
        group_key(&a.resource_group)
            .cmp(&group_key(&b.resource_group))
            .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
    });
}

/// Group indices of an already sorted inventory by resource group.
pub fn group_by_resource_group(vms: &[VirtualMachine]) -> Vec<(String, Vec<usize>)> {
    let mut groups: Vec<(String, Vec<usize>)> = Vec::new();

    for (idx, vm) in vms.iter().enumerate() {
        match groups.last_mut() {
            Some((rg, members)) if group_key(rg) == group_key(&vm.resource_group) => {
                members.push(idx);
            }
            _ => groups.push((vm.resource_group.clone(), vec![idx])),
        }
    }

    groups
}
