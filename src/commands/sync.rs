//! The sync command

use crate::config::SyncOptions;
use crate::engine::SyncEngine;
use crate::remote::RemoteStore;
use crate::types::{ActionError, SyncReport};
use console::style;
use indicatif::HumanBytes;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::atomic::AtomicBool;

/// Run one sync pass and render the outcome.
pub fn run(
    store: &dyn RemoteStore,
    local_root: &Path,
    remote_root_id: &str,
    options: SyncOptions,
    cancel: Option<&AtomicBool>,
) -> Result<SyncReport, crate::types::SyncError> {
    let engine = SyncEngine::new(store, local_root, remote_root_id, options)?;
    let report = engine.run(cancel)?;

    println!("{}", format_plan_summary(&report));

    if report.dry_run {
        println!("{}", format_planned_actions(&report));
        println!("Dry-run mode: no changes were made.");
        return Ok(report);
    }

    if !report.has_pending_actions() {
        println!("Nothing to sync.");
        return Ok(report);
    }

    println!("{}", format_results(&report));
    if !report.errors.is_empty() {
        println!("{}", format_error_summary(&report.errors));
    }
    if report.cancelled {
        println!("{}", style("Cancelled before completion; progress so far is kept.").yellow());
    }

    Ok(report)
}

fn format_plan_summary(report: &SyncReport) -> String {
    format!(
        "Plan:\n  Upload: {}  Download: {}  Conflicts: {}  Orphans: {}  In sync: {}\n  Pending transfer size: {}",
        report.to_upload.len(),
        report.to_download.len(),
        report.pending_conflicts.len(),
        report.only_local.len() + report.only_remote.len(),
        report.in_sync.len(),
        HumanBytes(report.pending_bytes)
    )
}

fn format_planned_actions(report: &SyncReport) -> String {
    if !report.has_pending_actions() {
        return "Planned actions:\n  (none)".to_string();
    }

    let mut lines = vec!["Planned actions:".to_string()];
    for path in &report.to_upload {
        lines.push(format!("  UPLOAD    {path}"));
    }
    for path in &report.to_download {
        lines.push(format!("  DOWNLOAD  {path}"));
    }
    for path in &report.only_local {
        lines.push(format!("  ORPHAN (local only)   {path}"));
    }
    for path in &report.only_remote {
        lines.push(format!("  ORPHAN (remote only)  {path}"));
    }
    for path in &report.pending_conflicts {
        lines.push(format!("  CONFLICT  {path}"));
    }
    if !report.in_sync.is_empty() {
        lines.push(format!("  ({} file(s) already in sync)", report.in_sync.len()));
    }
    lines.join("\n")
}

fn format_results(report: &SyncReport) -> String {
    let mut lines = vec![format!(
        "Done: {} uploaded, {} downloaded, {} deleted ({})",
        report.uploaded.len(),
        report.downloaded.len(),
        report.delete_count(),
        HumanBytes(report.bytes_transferred)
    )];
    for conflict in &report.conflicts {
        lines.push(format!(
            "  {} {} kept the {} copy ({})",
            style("conflict:").yellow(),
            conflict.path,
            match conflict.side {
                crate::types::ResolvedSide::Local => "local",
                crate::types::ResolvedSide::Remote => "remote",
            },
            conflict.reason
        ));
    }
    lines.join("\n")
}

fn format_error_summary(errors: &[ActionError]) -> String {
    let mut groups: BTreeMap<&'static str, Vec<&ActionError>> = BTreeMap::new();
    for error in errors {
        groups.entry(error.action.label()).or_default().push(error);
    }

    let mut lines = vec![format!("{}", style("Error summary:").red())];
    for (kind, items) in groups {
        lines.push(format!("  {} ({}):", kind, items.len()));
        for error in items.iter().take(3) {
            lines.push(format!("    - {}: {}", error.path, error.message));
        }
        if items.len() > 3 {
            lines.push(format!("    - ... {} more", items.len() - 3));
        }
    }
    lines.push("Failed files stay pending and are retried on the next pass.".to_string());
    lines.join("\n")
}
