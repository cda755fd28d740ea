//! Cloud provider collaborator.
//!
//! Workflows talk to the cloud through [`VmProvider`]. Reads are separate
//! methods; every state change goes through [`VmProvider::apply`] as a
//! [`Mutation`], so simulate mode and run logs see one command text per change.

use crate::models::inventory::VirtualMachine;
use crate::models::tags::TagMap;
use crate::utils::shell;
use crate::Result;
use std::fmt;

/// A state-changing provider call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    /// Add or overwrite one tag, keeping the others.
    MergeTag {
        resource_id: String,
        key: String,
        value: String,
    },
    /// Set the resource's tags to exactly `tags`.
    ReplaceTags { resource_id: String, tags: TagMap },
    /// Power off without releasing compute (non-blocking).
    Stop { resource_group: String, name: String },
    /// Release compute (non-blocking).
    Deallocate { resource_group: String, name: String },
    /// Start the VM.
    Start { resource_group: String, name: String },
}

impl Mutation {
    pub fn stop(vm: &VirtualMachine) -> Self {
        Mutation::Stop {
            resource_group: vm.resource_group.clone(),
            name: vm.name.clone(),
        }
    }

    pub fn deallocate(vm: &VirtualMachine) -> Self {
        Mutation::Deallocate {
            resource_group: vm.resource_group.clone(),
            name: vm.name.clone(),
        }
    }

    pub fn start(vm: &VirtualMachine) -> Self {
        Mutation::Start {
            resource_group: vm.resource_group.clone(),
            name: vm.name.clone(),
        }
    }

    /// Azure CLI arguments (without the `az` program name).
    pub fn az_args(&self) -> Vec<String> {
        match self {
            Mutation::MergeTag {
                resource_id,
                key,
                value,
            } => {
                let mut args = owned(&["tag", "update", "--resource-id"]);
                args.push(resource_id.clone());
                args.extend(owned(&["--operation", "Merge", "--tags"]));
                args.push(format!("{}={}", key, value));
                args
            }
            Mutation::ReplaceTags { resource_id, tags } if tags.is_empty() => {
                let mut args = owned(&["tag", "delete", "--resource-id"]);
                args.push(resource_id.clone());
                args.push("--yes".to_string());
                args
            }
            Mutation::ReplaceTags { resource_id, tags } => {
                let mut args = owned(&["tag", "update", "--resource-id"]);
                args.push(resource_id.clone());
                args.extend(owned(&["--operation", "Replace", "--tags"]));
                args.extend(tags.iter().map(|(k, v)| format!("{}={}", k, v)));
                args
            }
            Mutation::Stop {
                resource_group,
                name,
            } => vm_args("stop", resource_group, name, true),
            Mutation::Deallocate {
                resource_group,
                name,
            } => vm_args("deallocate", resource_group, name, true),
            Mutation::Start {
                resource_group,
                name,
            } => vm_args("start", resource_group, name, false),
        }
    }
}

fn owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn vm_args(verb: &str, resource_group: &str, name: &str, no_wait: bool) -> Vec<String> {
    let mut args = vec![
        "vm".to_string(),
        verb.to_string(),
        "--resource-group".to_string(),
        resource_group.to_string(),
        "--name".to_string(),
        name.to_string(),
    ];
    if no_wait {
        args.push("--no-wait".to_string());
    }
    args
}

impl fmt::Display for Mutation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let args: Vec<String> = self.az_args().iter().map(|a| shell::quote(a)).collect();
        write!(f, "az {}", args.join(" "))
    }
}

/// Operations the workflows need from the cloud provider.
#[allow(async_fn_in_trait)]
pub trait VmProvider {
    /// List every VM in the session's subscription.
    async fn list_vms(&self) -> Result<Vec<VirtualMachine>>;

    /// Current tags on a resource.
    async fn get_tags(&self, resource_id: &str) -> Result<TagMap>;

    /// OS disk ephemeral placement option (`Some("Local")` for ephemeral disks).
    async fn ephemeral_os_disk(&self, resource_group: &str, name: &str) -> Result<Option<String>>;

    /// Power state code without the `PowerState/` prefix, e.g. `running`, `stopped`.
    async fn power_state(&self, resource_group: &str, name: &str) -> Result<String>;

    /// Issue a state change.
    async fn apply(&self, mutation: &Mutation) -> Result<()>;
}
