//! The status command - report differences without changing anything
//!
//! With a remote given, this is a full scan-and-compare. Without one, only
//! the local tree is checked against the prior sync state.

use crate::config::SyncOptions;
use crate::diff::Classification;
use crate::engine::{StatusView, SyncEngine};
use crate::remote::RemoteStore;
use crate::scanner::scan_local;
use crate::state::{StateStore, SyncState};
use crate::types::TreeSnapshot;
use console::style;
use std::path::Path;

pub fn run(
    store: &dyn RemoteStore,
    local_root: &Path,
    remote_root_id: &str,
    options: SyncOptions,
) -> Result<StatusView, crate::types::SyncError> {
    let engine = SyncEngine::new(store, local_root, remote_root_id, options)?;
    let view = engine.status()?;
    println!("{}", format_status(&view));
    Ok(view)
}

/// Status without a remote: compare the local tree against the prior sync
/// state only.
pub fn run_offline(
    local_root: &Path,
    options: SyncOptions,
) -> Result<(), crate::types::SyncError> {
    options.validate()?;
    let local = scan_local(local_root, &options.exclude)?;
    let state = StateStore::for_root(local_root).load();
    println!("{}", format_offline_status(&local, &state, options.tolerance_ms));
    Ok(())
}

fn format_offline_status(local: &TreeSnapshot, state: &SyncState, tolerance_ms: i64) -> String {
    let mut lines = vec![if state.is_empty() {
        format!(
            "Status (local only): {} file(s), never synced",
            local.file_count()
        )
    } else {
        format!(
            "Status (local only): {} file(s), last sync {}",
            local.file_count(),
            state.last_sync.format("%Y-%m-%d %H:%M:%S UTC")
        )
    }];

    let prior = state.by_path();
    let mut modified = Vec::new();
    let mut created = Vec::new();
    for path in local.sorted_file_paths() {
        let entry = &local.files[path.as_str()];
        match prior.get(path.as_str()) {
            Some(record) if entry.modified_ms > record.modified_time + tolerance_ms => {
                modified.push(path.to_string());
            }
            Some(_) => {}
            None => created.push(path.to_string()),
        }
    }
    let missing: Vec<String> = state
        .files
        .iter()
        .filter(|record| !local.contains_file(&record.path))
        .map(|record| record.path.clone())
        .collect();

    let clean = modified.is_empty() && created.is_empty() && missing.is_empty();
    append_section(&mut lines, "Modified since last sync", modified);
    append_section(&mut lines, "New since last sync", created);
    append_section(&mut lines, "Missing locally", missing);
    if clean {
        lines.push("No local changes since last sync.".to_string());
    }
    lines.join("\n")
}

fn format_status(view: &StatusView) -> String {
    let mut lines = vec![format!(
        "Status: {} local file(s), {} remote file(s){}",
        view.local_files,
        view.remote_files,
        if view.has_prior_state {
            ""
        } else {
            " (no prior sync state; comparison is two-way)"
        }
    )];

    if view.classified.is_empty() {
        lines.push("  Nothing tracked on either side.".to_string());
        return lines.join("\n");
    }

    append_section(&mut lines, "Pending upload", paths_of(&view.classified.to_upload));
    append_section(&mut lines, "Pending download", paths_of(&view.classified.to_download));
    append_section(
        &mut lines,
        "Only local (deleted remotely)",
        paths_of(&view.classified.only_local),
    );
    append_section(
        &mut lines,
        "Only remote (deleted locally)",
        paths_of(&view.classified.only_remote),
    );
    append_section(
        &mut lines,
        "Conflicts",
        view.classified
            .conflicts
            .iter()
            .map(|pair| pair.local.path.clone())
            .collect(),
    );

    lines.push(format!("  In sync: {}", view.classified.in_sync.len()));
    if in_sync_only(&view.classified) {
        lines.push(style("Everything is in sync.").green().to_string());
    }
    lines.join("\n")
}

fn in_sync_only(classified: &Classification) -> bool {
    classified.to_upload.is_empty()
        && classified.to_download.is_empty()
        && classified.only_local.is_empty()
        && classified.only_remote.is_empty()
        && classified.conflicts.is_empty()
}

fn paths_of(entries: &[crate::types::FileEntry]) -> Vec<String> {
    entries.iter().map(|entry| entry.path.clone()).collect()
}

fn append_section(lines: &mut Vec<String>, title: &str, paths: Vec<String>) {
    if paths.is_empty() {
        return;
    }
    lines.push(format!("  {} ({}):", title, paths.len()));
    for path in paths {
        lines.push(format!("    {path}"));
    }
}
