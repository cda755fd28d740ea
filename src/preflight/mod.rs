//! Preflight checks module.

mod az;

use crate::Result;
use colored::Colorize;
use std::path::Path;

/// Result of a preflight check.
#[derive(Debug)]
pub struct CheckResult {
    pub name: String,
    pub success: bool,
    pub message: String,
    pub hint: Option<String>,
    /// Error to surface when this check fails.
    pub error: Option<crate::Error>,
}

impl CheckResult {
    pub fn ok(name: &str, message: &str) -> Self {
        Self {
            name: name.to_string(),
            success: true,
            message: message.to_string(),
            hint: None,
            error: None,
        }
    }

    pub fn fail(name: &str, message: &str, hint: &str, error: crate::Error) -> Self {
        Self {
            name: name.to_string(),
            success: false,
            message: message.to_string(),
            hint: Some(hint.to_string()),
            error: Some(error),
        }
    }
}

/// Run all preflight checks.
pub async fn run_preflight_checks(az_path: &Path) -> Vec<CheckResult> {
    let mut results = Vec::new();

    // Check the Azure CLI
    let cli = az::check_cli(az_path).await;
    let cli_ok = cli.success;
    results.push(cli);

    // Check the login session (pointless without a CLI)
    if cli_ok {
        results.push(az::check_login(az_path).await);
    }

    results
}

/// Print preflight check results.
pub fn print_results(results: &[CheckResult]) {
    for result in results {
        if result.success {
            println!(
                "{} {}: {}",
                "[OK]".green(),
                result.name.bold(),
                result.message
            );
        } else {
            println!(
                "{} {}: {}",
                "[FAIL]".red(),
                result.name.bold(),
                result.message
            );
            if let Some(ref hint) = result.hint {
                println!("  {} {}", "->".yellow(), hint);
            }
        }
    }
}

/// Check if all preflight checks passed.
pub fn all_passed(results: &[CheckResult]) -> bool {
    results.iter().all(|r| r.success)
}

/// Turn the first failed check into its precondition error.
pub fn into_result(results: Vec<CheckResult>) -> Result<()> {
    match results.into_iter().find(|r| !r.success) {
        Some(failed) => Err(failed
            .error
            .unwrap_or_else(|| crate::Error::other(failed.message))),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_into_result_picks_first_failure() {
        let results = vec![
            CheckResult::ok("Azure CLI", "installed"),
            CheckResult::fail("Login", "not logged in", "Run: az login", crate::Error::NotLoggedIn),
        ];
        assert!(!all_passed(&results));
        assert!(matches!(into_result(results), Err(crate::Error::NotLoggedIn)));
    }

    #[tokio::test]
    async fn test_missing_cli_skips_login_check() {
        let results = run_preflight_checks(Path::new("/nonexistent/az-binary")).await;
        assert_eq!(results.len(), 1);
        assert!(!results[0].success);
        assert!(matches!(into_result(results), Err(crate::Error::AzCliNotFound)));
    }
}
