//! Sync engine - orchestrates one full pass
//!
//! scan local → scan remote → load prior state → classify → execute →
//! rewrite state. The engine computes and applies; it never prints. Rendering
//! and exit codes live in the command layer.

use crate::config::SyncOptions;
use crate::diff::{classify, Classification};
use crate::executor::{execute, ExecutionOutcome};
use crate::remote::RemoteStore;
use crate::scanner::{scan_local, scan_remote};
use crate::state::{StateStore, SyncState};
use crate::types::{SyncError, SyncReport, TreeSnapshot};
use log::{debug, info};
use std::path::{Path, PathBuf};
use std::sync::atomic::AtomicBool;

/// One engine instance per (local root, remote root) pair.
///
/// The remote store is injected behind the trait, so the engine drives a real
/// backend and an in-memory test double identically.
pub struct SyncEngine<'a> {
    store: &'a dyn RemoteStore,
    local_root: PathBuf,
    remote_root_id: String,
    state_store: StateStore,
    options: SyncOptions,
}

/// What a status check found, without touching either side.
#[derive(Debug)]
pub struct StatusView {
    pub classified: Classification,
    pub local_files: usize,
    pub remote_files: usize,
    pub has_prior_state: bool,
}

impl<'a> SyncEngine<'a> {
    pub fn new(
        store: &'a dyn RemoteStore,
        local_root: impl Into<PathBuf>,
        remote_root_id: impl Into<String>,
        options: SyncOptions,
    ) -> Result<Self, SyncError> {
        options.validate()?;
        let local_root = local_root.into();
        if !local_root.is_dir() {
            return Err(SyncError::Config(format!(
                "local root {} is not a directory",
                local_root.display()
            )));
        }
        let state_store = StateStore::for_root(&local_root);
        Ok(Self {
            store,
            local_root,
            remote_root_id: remote_root_id.into(),
            state_store,
            options,
        })
    }

    pub fn local_root(&self) -> &Path {
        &self.local_root
    }

    /// Run one pass. Scan failures abort with an error; per-file transfer
    /// failures land in the report.
    ///
    /// Dry-run passes stop after classification and leave the sidecar
    /// byte-for-byte untouched.
    pub fn run(&self, cancel: Option<&AtomicBool>) -> Result<SyncReport, SyncError> {
        let (local, remote, prior) = self.observe()?;
        let classified = classify(&local, &remote, &prior, self.options.tolerance_ms);
        debug!(
            "classified {} paths: {} up, {} down, {} conflicts",
            classified.len(),
            classified.to_upload.len(),
            classified.to_download.len(),
            classified.conflicts.len()
        );

        let mut report = planned_report(&classified);
        if self.options.dry_run {
            report.dry_run = true;
            return Ok(report);
        }

        let outcome = execute(
            self.store,
            &self.local_root,
            &self.remote_root_id,
            &classified,
            &prior,
            &remote,
            &self.options,
            cancel,
        );
        let next_state = SyncState::from_records(outcome.records.clone());
        self.state_store.save(&next_state)?;
        info!(
            "pass complete: {} transferred, {} deleted, {} errors",
            outcome.uploaded.len() + outcome.downloaded.len(),
            outcome.deleted_local.len() + outcome.deleted_remote.len(),
            outcome.errors.len()
        );

        fill_report(&mut report, outcome);
        Ok(report)
    }

    /// Classify without applying anything or touching the sidecar.
    pub fn status(&self) -> Result<StatusView, SyncError> {
        let (local, remote, prior) = self.observe()?;
        let classified = classify(&local, &remote, &prior, self.options.tolerance_ms);
        Ok(StatusView {
            local_files: local.files.len(),
            remote_files: remote.files.len(),
            has_prior_state: !prior.is_empty(),
            classified,
        })
    }

    fn observe(&self) -> Result<(TreeSnapshot, TreeSnapshot, SyncState), SyncError> {
        let local = scan_local(&self.local_root, &self.options.exclude)?;
        let remote = scan_remote(self.store, &self.remote_root_id, &self.options.exclude)?;
        let prior = self.state_store.load();
        debug!(
            "scanned {} local files, {} remote files, {} prior records",
            local.files.len(),
            remote.files.len(),
            prior.files.len()
        );
        Ok((local, remote, prior))
    }
}

fn planned_report(classified: &Classification) -> SyncReport {
    SyncReport {
        to_upload: paths(&classified.to_upload),
        to_download: paths(&classified.to_download),
        only_local: paths(&classified.only_local),
        only_remote: paths(&classified.only_remote),
        in_sync: classified
            .in_sync
            .iter()
            .map(|pair| pair.local.path.clone())
            .collect(),
        pending_conflicts: classified
            .conflicts
            .iter()
            .map(|pair| pair.local.path.clone())
            .collect(),
        pending_bytes: pending_bytes(classified),
        ..Default::default()
    }
}

/// Conflict transfers count the larger side; the winner is not known until
/// the executor resolves them.
fn pending_bytes(classified: &Classification) -> u64 {
    let transfers: u64 = classified
        .to_upload
        .iter()
        .chain(classified.to_download.iter())
        .map(|entry| entry.size)
        .sum();
    let conflicts: u64 = classified
        .conflicts
        .iter()
        .map(|pair| pair.local.size.max(pair.remote.size))
        .sum();
    transfers + conflicts
}

fn fill_report(report: &mut SyncReport, outcome: ExecutionOutcome) {
    report.uploaded = outcome.uploaded;
    report.downloaded = outcome.downloaded;
    report.deleted_local = outcome.deleted_local;
    report.deleted_remote = outcome.deleted_remote;
    report.conflicts = outcome.conflicts;
    report.errors = outcome.errors;
    report.bytes_transferred = outcome.bytes_transferred;
    report.cancelled = outcome.cancelled;
}

fn paths(entries: &[crate::types::FileEntry]) -> Vec<String> {
    entries.iter().map(|entry| entry.path.clone()).collect()
}
