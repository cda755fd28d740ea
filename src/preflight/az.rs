//! Azure CLI preflight checks.

use super::CheckResult;
use crate::services::azure;
use std::path::Path;

/// Check if the Azure CLI is installed.
pub async fn check_cli(az_path: &Path) -> CheckResult {
    if azure::is_installed(az_path).await {
        match azure::get_version(az_path).await {
            Ok(version) => CheckResult::ok("Azure CLI", &format!("installed ({})", version)),
            Err(_) => CheckResult::ok("Azure CLI", "installed"),
        }
    } else {
        CheckResult::fail(
            "Azure CLI",
            "not found",
            "Install the Azure CLI: https://aka.ms/installazurecli",
            crate::Error::AzCliNotFound,
        )
    }
}

/// Check that a login session exists.
pub async fn check_login(az_path: &Path) -> CheckResult {
    match azure::current_subscription(az_path).await {
        Ok(sub) => CheckResult::ok("Azure login", &format!("signed in ({})", sub.name)),
        Err(_) => CheckResult::fail(
            "Azure login",
            "not logged in",
            "Run: az login",
            crate::Error::NotLoggedIn,
        ),
    }
}
