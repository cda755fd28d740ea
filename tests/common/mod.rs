//! Scripted in-memory provider shared by the integration tests.

#![allow(dead_code)]

use azfleet::models::inventory::VirtualMachine;
use azfleet::models::tags::TagMap;
use azfleet::services::provider::{Mutation, VmProvider};
use azfleet::utils::runlog::RunLog;
use azfleet::{Error, Result};
use std::collections::{HashMap, HashSet, VecDeque};
use std::path::PathBuf;
use std::sync::Mutex;
use tempfile::TempDir;

/// In-memory [`VmProvider`] with scripted power states and failures.
#[derive(Default)]
pub struct FakeProvider {
    vms: Vec<VirtualMachine>,
    tags: Mutex<HashMap<String, TagMap>>,
    ephemeral: HashMap<String, String>,
    power: Mutex<HashMap<String, VecDeque<String>>>,
    fail_get_tags: HashSet<String>,
    fail_apply: HashSet<String>,
    fail_probe: HashSet<String>,
    fail_power: HashSet<String>,
    applied: Mutex<Vec<Mutation>>,
}

impl FakeProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_vm(mut self, vm: VirtualMachine, tags: TagMap) -> Self {
        self.tags.get_mut().unwrap().insert(vm.id.clone(), tags);
        self.vms.push(vm);
        self
    }

    /// Mark a VM (by name) as having an ephemeral OS disk.
    pub fn ephemeral(mut self, name: &str) -> Self {
        self.ephemeral.insert(name.to_string(), "Local".to_string());
        self
    }

    /// Power states returned on successive polls; the last one repeats.
    pub fn power_states(mut self, name: &str, states: &[&str]) -> Self {
        self.power.get_mut().unwrap().insert(
            name.to_string(),
            states.iter().map(|s| s.to_string()).collect(),
        );
        self
    }

    /// Fail tag reads for a resource id.
    pub fn fail_get_tags(mut self, resource_id: &str) -> Self {
        self.fail_get_tags.insert(resource_id.to_string());
        self
    }

    /// Fail mutations targeting a resource id (tags) or VM name (power).
    pub fn fail_apply(mut self, target: &str) -> Self {
        self.fail_apply.insert(target.to_string());
        self
    }

    pub fn fail_probe(mut self, name: &str) -> Self {
        self.fail_probe.insert(name.to_string());
        self
    }

    pub fn fail_power(mut self, name: &str) -> Self {
        self.fail_power.insert(name.to_string());
        self
    }

    pub fn vms(&self) -> Vec<VirtualMachine> {
        self.vms.clone()
    }

    pub fn tags_of(&self, resource_id: &str) -> TagMap {
        self.tags
            .lock()
            .unwrap()
            .get(resource_id)
            .cloned()
            .unwrap_or_default()
    }

    pub fn applied(&self) -> Vec<Mutation> {
        self.applied.lock().unwrap().clone()
    }
}

fn target_of(mutation: &Mutation) -> &str {
    match mutation {
        Mutation::MergeTag { resource_id, .. } | Mutation::ReplaceTags { resource_id, .. } => {
            resource_id
        }
        Mutation::Stop { name, .. }
        | Mutation::Deallocate { name, .. }
        | Mutation::Start { name, .. } => name,
    }
}

impl VmProvider for FakeProvider {
    async fn list_vms(&self) -> Result<Vec<VirtualMachine>> {
        Ok(self.vms.clone())
    }

    async fn get_tags(&self, resource_id: &str) -> Result<TagMap> {
        if self.fail_get_tags.contains(resource_id) {
            return Err(Error::provider(
                format!("az tag list --resource-id {}", resource_id),
                "ResourceNotFound",
            ));
        }
        Ok(self.tags_of(resource_id))
    }

    async fn ephemeral_os_disk(&self, _resource_group: &str, name: &str) -> Result<Option<String>> {
        if self.fail_probe.contains(name) {
            return Err(Error::provider(format!("az vm show --name {}", name), "AuthorizationFailed"));
        }
        Ok(self.ephemeral.get(name).cloned())
    }

    async fn power_state(&self, _resource_group: &str, name: &str) -> Result<String> {
        if self.fail_power.contains(name) {
            return Err(Error::provider(
                format!("az vm get-instance-view --name {}", name),
                "Throttled",
            ));
        }
        let mut power = self.power.lock().unwrap();
        let state = match power.get_mut(name) {
            Some(queue) if queue.len() > 1 => queue.pop_front(),
            Some(queue) => queue.front().cloned(),
            None => None,
        };
        Ok(state.unwrap_or_else(|| "running".to_string()))
    }

    async fn apply(&self, mutation: &Mutation) -> Result<()> {
        if self.fail_apply.contains(target_of(mutation)) {
            return Err(Error::provider(mutation, "simulated failure"));
        }

        match mutation {
            Mutation::MergeTag {
                resource_id,
                key,
                value,
            } => {
                self.tags
                    .lock()
                    .unwrap()
                    .entry(resource_id.clone())
                    .or_default()
                    .insert(key.clone(), value.clone());
            }
            Mutation::ReplaceTags { resource_id, tags } => {
                self.tags
                    .lock()
                    .unwrap()
                    .insert(resource_id.clone(), tags.clone());
            }
            Mutation::Stop { .. } | Mutation::Deallocate { .. } | Mutation::Start { .. } => {}
        }

        self.applied.lock().unwrap().push(mutation.clone());
        Ok(())
    }
}

pub fn vm(name: &str, zones: &[&str]) -> VirtualMachine {
    VirtualMachine {
        id: format!("/vm/{}", name),
        name: name.to_string(),
        resource_group: "rg-test".to_string(),
        zones: zones.iter().map(|z| z.to_string()).collect(),
    }
}

pub fn tags(pairs: &[(&str, &str)]) -> TagMap {
    pairs.iter().copied().collect()
}

/// Run log in a temp directory. Keep the `TempDir` alive while logging.
pub fn temp_log() -> (TempDir, PathBuf, RunLog) {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("run.log");
    let log = RunLog::open(&path).unwrap();
    (dir, path, log)
}
