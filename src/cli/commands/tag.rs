//! Tag command implementation.
//!
//! Selects VMs, merges one tag into each, exports the before/after tags
//! to CSV and writes an undo script that replays the CSV.

use super::{load_inventory, open_provider, RunContext};
use crate::cli::prompt::Prompter;
use crate::core::exporter;
use crate::core::tagger::{self, TagRequest};
use crate::generators::undo_script::{render_undo_script, UndoScript};
use crate::models::inventory::{self, VirtualMachine};
use crate::utils::fs;
use crate::utils::runlog::RunLog;
use crate::Result;
use chrono::Local;
use colored::Colorize;
use uuid::Uuid;

/// Run the interactive tag workflow.
pub async fn tag(ctx: &RunContext) -> Result<()> {
    println!("{}", "[TAG] Tag virtual machines".bold().cyan());
    println!();
    ctx.print_mode();

    let prompter = Prompter::new();
    let provider = open_provider(ctx, &prompter).await?;
    let subscription = provider.session().subscription().clone();

    let mut vms = load_inventory(&provider, &subscription.id).await?;
    inventory::sort_for_display(&mut vms);
    print_inventory(&vms);

    let indices = prompter.select_vms(vms.len())?;
    let selected: Vec<VirtualMachine> = indices.iter().map(|&i| vms[i].clone()).collect();

    let request = TagRequest {
        key: prompter.tag_key()?,
        value: prompter.tag_value()?,
    };

    println!();
    println!(
        "  {} {}={}",
        "Tag:".bold(),
        request.key,
        request.value
    );
    println!("  {} {}", "VMs:".bold(), selected.len());
    println!();

    if !prompter.confirm(&format!("Apply tag to {} VM(s)?", selected.len()), false)? {
        println!("{}", "Cancelled. No changes made.".yellow());
        return Ok(());
    }

    let output_dir = ctx.output_dir();
    fs::ensure_output_dir(output_dir)?;
    let stamp = fs::artifact_timestamp();

    let mut log = RunLog::open(&fs::artifact_path(output_dir, "Tag-VMs-", &stamp, "log"))?;
    log.info(format!("Subscription: {}", subscription));
    log.info(format!(
        "Selected {} VM(s): {}",
        selected.len(),
        selected
            .iter()
            .map(|v| v.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    ));

    let outcome = tagger::apply_tag(&provider, &selected, &request, ctx.dry_run, &mut log).await;
    outcome.print_summary();
    println!();

    if outcome.changes.is_empty() {
        println!("{}", "No VMs were tagged; no undo artifacts written.".yellow());
        log.info("No tag changes recorded; no undo artifacts written");
        return Ok(());
    }

    // Export and undo script
    let csv_path = fs::artifact_path(output_dir, "TaggedVMs_", &stamp, "csv");
    exporter::write_tag_csv(&csv_path, &outcome.changes)?;
    let checksum = fs::sha256_file(&csv_path)?;

    let csv_file_name = csv_path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    let program = std::env::current_exe()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|_| "azfleet".to_string());
    let generated_at = Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
    let generated_by = whoami::username();
    let run_id = Uuid::new_v4().to_string();

    let script = render_undo_script(&UndoScript {
        csv_file_name: &csv_file_name,
        csv_sha256: &checksum,
        subscription_id: &subscription.id,
        generated_at: &generated_at,
        generated_by: &generated_by,
        run_id: &run_id,
        program: &program,
        row_count: outcome.changes.len(),
    });
    let script_path = fs::artifact_path(output_dir, "UndoTags_", &stamp, "sh");
    fs::write_script(&script_path, &script)?;

    log.info(format!("CSV written: {} (sha256 {})", csv_path.display(), checksum));
    log.info(format!("Undo script written: {}", script_path.display()));

    println!("{} {}", "[OK] CSV saved to:".bold().green(), csv_path.display());
    println!(
        "{} {}",
        "[OK] Undo script saved to:".bold().green(),
        script_path.display()
    );
    println!("{} {}", "[OK] Run log:".bold().green(), log.path().display());

    println!();
    println!("{}", "[Next Steps]".bold().yellow());
    println!("  To undo changes: {}", script_path.display().to_string().cyan());

    Ok(())
}

/// Print the inventory grouped by resource group.
fn print_inventory(vms: &[VirtualMachine]) {
    for (rg, members) in inventory::group_by_resource_group(vms) {
        println!("{}", format!("Resource group: {}", rg).bold());
        for idx in members {
            let vm = &vms[idx];
            println!("  [{:>3}] {:<40} zones: {}", idx, vm.name, vm.zones_label());
        }
    }
    println!();
}
