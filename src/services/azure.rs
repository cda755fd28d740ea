//! Azure CLI backed provider.
//!
//! All calls shell out to `az` with JSON or TSV output. The subscription is
//! carried by [`AzureSession`] and passed explicitly on every call instead of
//! relying on the CLI's ambient default.

use super::provider::{Mutation, VmProvider};
use crate::models::inventory::{Subscription, VirtualMachine};
use crate::models::tags::TagMap;
use crate::utils::shell;
use crate::Result;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tokio::process::Command;

/// `az vm list` projection.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AzVm {
    id: String,
    name: String,
    resource_group: String,
    #[serde(default)]
    zones: Option<Vec<String>>,
}

/// `az account list` projection.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AzAccount {
    id: String,
    name: String,
    #[serde(default)]
    is_default: bool,
}

impl From<AzAccount> for Subscription {
    fn from(a: AzAccount) -> Self {
        Subscription {
            id: a.id,
            name: a.name,
            is_default: a.is_default,
        }
    }
}

/// Run `az` and return stdout, mapping a missing binary and non-zero exits.
async fn run_az(az_path: &Path, args: &[String]) -> Result<String> {
    let command_text = format!(
        "{} {}",
        az_path.display(),
        args.iter().map(|a| shell::quote(a)).collect::<Vec<_>>().join(" ")
    );
    tracing::debug!("Running: {}", command_text);

    let output = match Command::new(az_path).args(args).output().await {
        Ok(o) => o,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(crate::Error::AzCliNotFound)
        }
        Err(e) => return Err(e.into()),
    };

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        return Err(crate::Error::provider(command_text, stderr));
    }

    Ok(String::from_utf8_lossy(&output.stdout).to_string())
}

fn args(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

/// Check if the Azure CLI is installed.
pub async fn is_installed(az_path: &Path) -> bool {
    run_az(az_path, &args(&["version", "--output", "none"]))
        .await
        .is_ok()
}

/// Get the Azure CLI version string.
pub async fn get_version(az_path: &Path) -> Result<String> {
    let out = run_az(
        az_path,
        &args(&["version", "--query", "\"azure-cli\"", "--output", "tsv"]),
    )
    .await?;
    Ok(out.trim().to_string())
}

/// The account's current default subscription, if logged in.
pub async fn current_subscription(az_path: &Path) -> Result<Subscription> {
    let out = run_az(az_path, &args(&["account", "show", "--output", "json"]))
        .await
        .map_err(|e| match e {
            crate::Error::AzCliNotFound => e,
            _ => crate::Error::NotLoggedIn,
        })?;
    let account: AzAccount = serde_json::from_str(&out)?;
    Ok(account.into())
}

/// Scoped login session: the CLI to call and the subscription to target.
#[derive(Debug, Clone)]
pub struct AzureSession {
    az_path: PathBuf,
    subscription: Subscription,
}

impl AzureSession {
    pub fn new(az_path: PathBuf, subscription: Subscription) -> Self {
        Self {
            az_path,
            subscription,
        }
    }

    /// Session on the CLI's current default subscription.
    pub async fn current(az_path: &Path) -> Result<Self> {
        let subscription = current_subscription(az_path).await?;
        Ok(Self::new(az_path.to_path_buf(), subscription))
    }

    /// List enabled subscriptions visible to the signed-in account.
    pub async fn list_subscriptions(az_path: &Path) -> Result<Vec<Subscription>> {
        let out = run_az(
            az_path,
            &args(&[
                "account",
                "list",
                "--query",
                "[?state=='Enabled'].{id:id, name:name, isDefault:isDefault}",
                "--output",
                "json",
            ]),
        )
        .await?;
        let accounts: Vec<AzAccount> = serde_json::from_str(&out)?;
        Ok(accounts.into_iter().map(Subscription::from).collect())
    }

    pub fn subscription(&self) -> &Subscription {
        &self.subscription
    }

    pub fn az_path(&self) -> &Path {
        &self.az_path
    }
}

/// [`VmProvider`] implemented with the Azure CLI.
pub struct AzCli {
    session: AzureSession,
}

impl AzCli {
    pub fn new(session: AzureSession) -> Self {
        Self { session }
    }

    pub fn session(&self) -> &AzureSession {
        &self.session
    }

    async fn run(&self, mut call: Vec<String>) -> Result<String> {
        call.push("--subscription".to_string());
        call.push(self.session.subscription.id.clone());
        run_az(&self.session.az_path, &call).await
    }
}

impl VmProvider for AzCli {
    async fn list_vms(&self) -> Result<Vec<VirtualMachine>> {
        let out = self
            .run(args(&[
                "vm",
                "list",
                "--query",
                "[].{id:id, name:name, resourceGroup:resourceGroup, zones:zones}",
                "--output",
                "json",
            ]))
            .await
            .map_err(|e| match e {
                crate::Error::AzCliNotFound => e,
                other => crate::Error::ListingFailed(other.to_string()),
            })?;

        let vms: Vec<AzVm> = serde_json::from_str(&out)
            .map_err(|e| crate::Error::ListingFailed(e.to_string()))?;

        Ok(vms
            .into_iter()
            .map(|v| VirtualMachine {
                id: v.id,
                name: v.name,
                resource_group: v.resource_group,
                zones: v.zones.unwrap_or_default(),
            })
            .collect())
    }

    async fn get_tags(&self, resource_id: &str) -> Result<TagMap> {
        let mut call = args(&["tag", "list", "--resource-id"]);
        call.push(resource_id.to_string());
        call.extend(args(&["--query", "properties.tags", "--output", "json"]));

        let out = self.run(call).await?;
        TagMap::from_json(&out).map_err(|e| crate::Error::UnexpectedOutput(e.to_string()))
    }

    async fn ephemeral_os_disk(&self, resource_group: &str, name: &str) -> Result<Option<String>> {
        let mut call = args(&["vm", "show", "--resource-group"]);
        call.push(resource_group.to_string());
        call.push("--name".to_string());
        call.push(name.to_string());
        call.extend(args(&[
            "--query",
            "storageProfile.osDisk.diffDiskSettings.option",
            "--output",
            "tsv",
        ]));

        let out = self.run(call).await?;
        let option = out.trim();
        Ok(if option.is_empty() {
            None
        } else {
            Some(option.to_string())
        })
    }

    async fn power_state(&self, resource_group: &str, name: &str) -> Result<String> {
        let mut call = args(&["vm", "get-instance-view", "--resource-group"]);
        call.push(resource_group.to_string());
        call.push("--name".to_string());
        call.push(name.to_string());
        call.extend(args(&[
            "--query",
            "instanceView.statuses[?starts_with(code, 'PowerState/')].code | [0]",
            "--output",
            "tsv",
        ]));

        let out = self.run(call).await?;
        Ok(normalize_power_state(&out))
    }

    async fn apply(&self, mutation: &Mutation) -> Result<()> {
        self.run(mutation.az_args()).await.map_err(|e| match e {
            crate::Error::Provider { message, .. } => crate::Error::provider(mutation, message),
            other => other,
        })?;
        Ok(())
    }
}

/// `PowerState/stopped` -> `stopped`.
pub fn normalize_power_state(raw: &str) -> String {
    let trimmed = raw.trim();
    trimmed
        .strip_prefix("PowerState/")
        .unwrap_or(trimmed)
        .to_lowercase()
}
