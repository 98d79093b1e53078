//! Sync executor - applies classified actions
//!
//! Each per-file action is isolated: a failure is recorded with its path and
//! action kind and never aborts the rest of the pass. The executor also
//! produces the state records for the next sidecar rewrite, derived from
//! what actually happened rather than from what was planned.

mod mapper;

pub use mapper::PathMapper;

use crate::config::SyncOptions;
use crate::diff::{resolve, Classification};
use crate::remote::{mime_for, RemoteStore};
use crate::state::{StateRecord, SyncState};
use crate::types::{
    ActionError, ActionKind, ConflictResolution, FileEntry, ResolvedSide, TreeSnapshot,
};
use chrono::Utc;
use log::debug;
use std::collections::HashSet;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

/// What one execution produced: per-category path lists, isolated errors,
/// and the state records confirmed in sync.
#[derive(Debug, Default)]
pub struct ExecutionOutcome {
    pub uploaded: Vec<String>,
    pub downloaded: Vec<String>,
    pub deleted_local: Vec<String>,
    pub deleted_remote: Vec<String>,
    pub conflicts: Vec<ConflictResolution>,
    pub errors: Vec<ActionError>,
    pub records: Vec<StateRecord>,
    pub bytes_transferred: u64,
    pub cancelled: bool,
}

/// Execute every classified action allowed by `options`.
///
/// Folder creation strictly precedes any nested upload (via [`PathMapper`]),
/// conflicts are resolved regardless of the direction restriction, and the
/// cancel flag is checked between per-file actions: already-applied actions
/// stay in place, consistent with partial-failure semantics.
pub fn execute(
    store: &dyn RemoteStore,
    local_root: &Path,
    remote_root_id: &str,
    classified: &Classification,
    prior: &SyncState,
    remote_tree: &TreeSnapshot,
    options: &SyncOptions,
    cancel: Option<&AtomicBool>,
) -> ExecutionOutcome {
    let mut outcome = ExecutionOutcome::default();
    let mut mapper = PathMapper::new(remote_root_id);
    for (path, folder) in &remote_tree.folders {
        if let Some(id) = &folder.remote_id {
            mapper.prime(path, id);
        }
    }

    // Paths confirmed unchanged need no I/O.
    for pair in &classified.in_sync {
        outcome.records.push(synced_record(&pair.local, &pair.remote));
    }

    'actions: {
        if options.direction.includes_up() {
            for entry in &classified.to_upload {
                if check_cancel(cancel, &mut outcome) {
                    break 'actions;
                }
                apply_upload(store, local_root, &mut mapper, entry, None, &mut outcome);
            }
        }

        if options.direction.includes_down() {
            for entry in &classified.to_download {
                if check_cancel(cancel, &mut outcome) {
                    break 'actions;
                }
                apply_download(store, local_root, entry, &mut outcome);
            }
        }

        // Conflicts are always resolved, whatever the direction restriction.
        for conflict in &classified.conflicts {
            if check_cancel(cancel, &mut outcome) {
                break 'actions;
            }
            let resolution = resolve(options.strategy, conflict);
            let before_errors = outcome.errors.len();
            match resolution.side {
                ResolvedSide::Local => apply_upload(
                    store,
                    local_root,
                    &mut mapper,
                    &conflict.local,
                    conflict.remote.remote_id.as_deref(),
                    &mut outcome,
                ),
                ResolvedSide::Remote => {
                    apply_download(store, local_root, &conflict.remote, &mut outcome)
                }
            }
            if outcome.errors.len() == before_errors {
                outcome.conflicts.push(ConflictResolution {
                    path: conflict.local.path.clone(),
                    side: resolution.side,
                    reason: resolution.reason,
                });
            }
        }

        if options.delete_orphans && options.direction.includes_up() {
            // Local deletions propagate to the remote.
            for entry in &classified.only_remote {
                if check_cancel(cancel, &mut outcome) {
                    break 'actions;
                }
                apply_remote_delete(store, entry, &mut outcome);
            }
        }

        if options.delete_orphans && options.direction.includes_down() {
            // Remote deletions propagate to the local tree.
            for entry in &classified.only_local {
                if check_cancel(cancel, &mut outcome) {
                    break 'actions;
                }
                apply_local_delete(local_root, entry, &mut outcome);
            }
        }
    }

    carry_prior_records(prior, classified, &mut outcome);
    outcome
}

/// Prior records survive for paths that were neither confirmed in sync nor
/// removed this pass. Without this, an orphan left in place would be
/// resurrected as a fresh upload on the next pass.
fn carry_prior_records(
    prior: &SyncState,
    classified: &Classification,
    outcome: &mut ExecutionOutcome,
) {
    let confirmed: HashSet<String> = outcome
        .records
        .iter()
        .map(|record| record.path.clone())
        .collect();
    let removed: HashSet<&str> = outcome
        .deleted_local
        .iter()
        .chain(outcome.deleted_remote.iter())
        .map(String::as_str)
        .collect();
    let still_present: HashSet<&str> = classified
        .to_upload
        .iter()
        .chain(classified.to_download.iter())
        .chain(classified.only_local.iter())
        .chain(classified.only_remote.iter())
        .map(|entry| entry.path.as_str())
        .chain(classified.conflicts.iter().map(|c| c.local.path.as_str()))
        .collect();

    for record in &prior.files {
        let path = record.path.as_str();
        if confirmed.contains(path) || removed.contains(path) {
            continue;
        }
        if still_present.contains(path) {
            outcome.records.push(record.clone());
        }
    }
}

fn check_cancel(cancel: Option<&AtomicBool>, outcome: &mut ExecutionOutcome) -> bool {
    if cancel.is_some_and(|flag| flag.load(Ordering::Relaxed)) {
        outcome.cancelled = true;
        true
    } else {
        false
    }
}

fn apply_upload(
    store: &dyn RemoteStore,
    local_root: &Path,
    mapper: &mut PathMapper,
    entry: &FileEntry,
    known_remote_id: Option<&str>,
    outcome: &mut ExecutionOutcome,
) {
    match upload_one(store, local_root, mapper, entry, known_remote_id) {
        Ok(record) => {
            debug!("uploaded {}", entry.path);
            outcome.uploaded.push(entry.path.clone());
            outcome.bytes_transferred += record.local_size.unwrap_or(0);
            outcome.records.push(record);
        }
        Err(err) => outcome.errors.push(err),
    }
}

fn apply_download(
    store: &dyn RemoteStore,
    local_root: &Path,
    entry: &FileEntry,
    outcome: &mut ExecutionOutcome,
) {
    match download_one(store, local_root, entry) {
        Ok(record) => {
            debug!("downloaded {}", entry.path);
            outcome.downloaded.push(entry.path.clone());
            outcome.bytes_transferred += record.local_size.unwrap_or(0);
            outcome.records.push(record);
        }
        Err(err) => outcome.errors.push(err),
    }
}

fn apply_remote_delete(store: &dyn RemoteStore, entry: &FileEntry, outcome: &mut ExecutionOutcome) {
    let Some(id) = entry.remote_id.as_deref() else {
        outcome.errors.push(ActionError::new(
            &entry.path,
            ActionKind::DeleteRemote,
            "remote entry carries no id",
        ));
        return;
    };
    match store.delete_file(id) {
        Ok(()) => {
            debug!("deleted remote {}", entry.path);
            outcome.deleted_remote.push(entry.path.clone());
        }
        Err(err) => {
            outcome
                .errors
                .push(ActionError::new(&entry.path, ActionKind::DeleteRemote, err));
        }
    }
}

fn apply_local_delete(local_root: &Path, entry: &FileEntry, outcome: &mut ExecutionOutcome) {
    let target = local_path(local_root, &entry.path);
    match fs::remove_file(&target) {
        Ok(()) => {
            debug!("deleted local {}", entry.path);
            outcome.deleted_local.push(entry.path.clone());
        }
        // Already absent counts as deleted.
        Err(err) if err.kind() == ErrorKind::NotFound => {
            outcome.deleted_local.push(entry.path.clone());
        }
        Err(err) => {
            outcome
                .errors
                .push(ActionError::new(&entry.path, ActionKind::DeleteLocal, err));
        }
    }
}

fn upload_one(
    store: &dyn RemoteStore,
    local_root: &Path,
    mapper: &mut PathMapper,
    entry: &FileEntry,
    known_remote_id: Option<&str>,
) -> Result<StateRecord, ActionError> {
    let source = local_path(local_root, &entry.path);
    let content = fs::read(&source)
        .map_err(|e| ActionError::new(&entry.path, ActionKind::Upload, e))?;
    let mime = mime_for(&entry.name);

    let remote_id = match known_remote_id {
        Some(id) => store
            .update_file(id, &content, mime)
            .map_err(|e| ActionError::new(&entry.path, ActionKind::Upload, e))?,
        None => {
            let parent_id = mapper
                .ensure(store, entry.parent())
                .map_err(|e| ActionError::new(&entry.path, ActionKind::Upload, e))?;
            // Local entries carry no remote id, so an existing remote copy is
            // matched by name within the target folder listing.
            let existing = store
                .list_children(&parent_id)
                .map_err(|e| ActionError::new(&entry.path, ActionKind::Upload, e))?
                .into_iter()
                .find(|item| !item.is_folder && item.name == entry.name)
                .map(|item| item.id);
            match existing {
                Some(id) => store
                    .update_file(&id, &content, mime)
                    .map_err(|e| ActionError::new(&entry.path, ActionKind::Upload, e))?,
                None => store
                    .upload_file(&entry.name, &content, mime, &parent_id)
                    .map_err(|e| ActionError::new(&entry.path, ActionKind::Upload, e))?,
            }
        }
    };

    // The remote stamps the upload at its own clock, which is at or after
    // our completion time; record the max so the next pass sees the path
    // in sync within tolerance.
    Ok(StateRecord {
        path: entry.path.clone(),
        modified_time: entry.modified_ms.max(Utc::now().timestamp_millis()),
        local_size: Some(content.len() as u64),
        remote_id: Some(remote_id),
    })
}

fn download_one(
    store: &dyn RemoteStore,
    local_root: &Path,
    entry: &FileEntry,
) -> Result<StateRecord, ActionError> {
    let id = entry
        .remote_id
        .as_deref()
        .ok_or_else(|| {
            ActionError::new(&entry.path, ActionKind::Download, "remote entry carries no id")
        })?;
    let content = store
        .download_file(id)
        .map_err(|e| ActionError::new(&entry.path, ActionKind::Download, e))?;

    let dest = local_path(local_root, &entry.path);
    write_file_atomic(&dest, &content, entry.modified_ms)
        .map_err(|e| ActionError::new(&entry.path, ActionKind::Download, e))?;

    // The local copy is stamped with the remote time, so both sides agree.
    Ok(StateRecord {
        path: entry.path.clone(),
        modified_time: entry.modified_ms,
        local_size: Some(content.len() as u64),
        remote_id: Some(id.to_string()),
    })
}

/// Write-then-rename so a crash mid-download never leaves a torn file, then
/// stamp the file with the remote modification time.
fn write_file_atomic(dest: &Path, content: &[u8], modified_ms: i64) -> std::io::Result<()> {
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent)?;
    }

    // Suffix the whole file name; swapping the extension could collide with
    // a sibling file ("report.pdf" staging at "report.driftsync-part").
    let mut part_name = dest.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    part_name.push(".driftsync-part");
    let part_path = dest.with_file_name(part_name);
    fs::write(&part_path, content)?;

    let seconds = modified_ms.div_euclid(1_000);
    let nanos = (modified_ms.rem_euclid(1_000) * 1_000_000) as u32;
    let mtime = filetime::FileTime::from_unix_time(seconds, nanos);
    filetime::set_file_mtime(&part_path, mtime)?;

    fs::rename(&part_path, dest)
}

fn synced_record(local: &FileEntry, remote: &FileEntry) -> StateRecord {
    StateRecord {
        path: local.path.clone(),
        modified_time: local.modified_ms.max(remote.modified_ms),
        local_size: Some(local.size),
        remote_id: remote.remote_id.clone(),
    }
}

fn local_path(root: &Path, rel: &str) -> PathBuf {
    let mut path = root.to_path_buf();
    for part in rel.split('/') {
        path.push(part);
    }
    path
}
