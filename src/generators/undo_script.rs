//! Undo script generator.
//!
//! The script re-authenticates, selects the recorded subscription, and
//! hands the CSV beside it to `azfleet undo-tags`, which replaces every
//! row's tags with its OldTags.

use crate::utils::shell::quote;

/// Inputs for the undo script.
#[derive(Debug, Clone)]
pub struct UndoScript<'a> {
    /// CSV file name, resolved relative to the script's directory.
    pub csv_file_name: &'a str,
    /// SHA-256 of the CSV at generation time.
    pub csv_sha256: &'a str,
    pub subscription_id: &'a str,
    pub generated_at: &'a str,
    pub generated_by: &'a str,
    pub run_id: &'a str,
    /// Program to invoke for the replay.
    pub program: &'a str,
    /// Number of rows in the CSV.
    pub row_count: usize,
}

/// Render the undo script.
pub fn render_undo_script(s: &UndoScript<'_>) -> String {
    let mut out = String::new();

    out.push_str("#!/usr/bin/env bash\n");
    out.push_str("# Undo script for an azfleet tagging run.\n");
    out.push_str(&format!("# Source CSV: {}\n", s.csv_file_name));
    out.push_str(&format!("# CSV SHA-256: {}\n", s.csv_sha256));
    out.push_str(&format!("# Resources: {}\n", s.row_count));
    out.push_str(&format!("# Generated: {} by {}\n", s.generated_at, s.generated_by));
    out.push_str(&format!("# Run ID: {}\n", s.run_id));
    out.push_str("#\n");
    out.push_str("# Replaces each resource's tags with the OldTags column (full replace, not merge).\n");
    out.push_str("# Pass --dry-run to preview.\n");
    out.push_str("set -euo pipefail\n");
    out.push('\n');
    out.push_str("SCRIPT_DIR=\"$(cd \"$(dirname \"${BASH_SOURCE[0]}\")\" && pwd)\"\n");
    out.push_str(&format!("CSV=\"$SCRIPT_DIR/\"{}\n", quote(s.csv_file_name)));
    out.push('\n');
    out.push_str("if [ ! -f \"$CSV\" ]; then\n");
    out.push_str("  echo \"CSV not found: $CSV\" >&2\n");
    out.push_str("  exit 1\n");
    out.push_str("fi\n");
    out.push('\n');
    out.push_str("az account show --output none 2>/dev/null || az login --output none\n");
    out.push_str(&format!(
        "az account set --subscription {}\n",
        quote(s.subscription_id)
    ));
    out.push('\n');
    out.push_str(&format!("AZFLEET={}\n", quote(s.program)));
    out.push_str("if [ ! -x \"$AZFLEET\" ]; then\n");
    out.push_str("  AZFLEET=\"$(command -v azfleet || true)\"\n");
    out.push_str("fi\n");
    out.push_str("if [ -z \"$AZFLEET\" ]; then\n");
    out.push_str("  echo \"azfleet not found; install it or put it on PATH\" >&2\n");
    out.push_str("  exit 1\n");
    out.push_str("fi\n");
    out.push('\n');
    out.push_str(&format!(
        "\"$AZFLEET\" \"$@\" undo-tags --yes --checksum {} \"$CSV\"\n",
        quote(s.csv_sha256)
    ));

    out
}
