//! Three-way comparator
//!
//! The central algorithm: local snapshot, remote snapshot, and the prior
//! sync state are compared per path. The prior state is what disambiguates
//! "created since last sync" from "deleted since last sync" - a two-way diff
//! cannot tell those apart on the side where the path is absent.

use crate::state::SyncState;
use crate::types::{FileEntry, TreeSnapshot};

/// A path modified independently on both sides since the last sync.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConflictPair {
    pub local: FileEntry,
    pub remote: FileEntry,
}

/// A path confirmed identical on both sides this pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncedPair {
    pub local: FileEntry,
    pub remote: FileEntry,
}

/// Classified action sets produced by one comparison.
///
/// Every vector is sorted by path; a path appears in exactly one set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Classification {
    /// New or locally-changed files to send to the remote (local entries)
    pub to_upload: Vec<FileEntry>,

    /// New or remotely-changed files to fetch (remote entries)
    pub to_download: Vec<FileEntry>,

    /// Previously synced, now present only locally: deleted remotely
    pub only_local: Vec<FileEntry>,

    /// Previously synced, now present only remotely: deleted locally
    pub only_remote: Vec<FileEntry>,

    /// Changed on both sides since the last sync
    pub conflicts: Vec<ConflictPair>,

    /// Identical on both sides
    pub in_sync: Vec<SyncedPair>,
}

impl Classification {
    /// Total number of classified paths.
    pub fn len(&self) -> usize {
        self.to_upload.len()
            + self.to_download.len()
            + self.only_local.len()
            + self.only_remote.len()
            + self.conflicts.len()
            + self.in_sync.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Classify every path across the three inputs.
///
/// `tolerance_ms` absorbs clock and precision mismatch between filesystem
/// and remote timestamps: two times are "equal" unless they differ by
/// strictly more than the tolerance.
pub fn classify(
    local: &TreeSnapshot,
    remote: &TreeSnapshot,
    state: &SyncState,
    tolerance_ms: i64,
) -> Classification {
    let prior = state.by_path();
    let mut result = Classification::default();

    for path in local.sorted_file_paths() {
        let local_entry = &local.files[path.as_str()];

        match remote.file(path) {
            None => {
                if prior.contains_key(path.as_str()) {
                    // Was synced before, gone remotely: orphaned by a
                    // remote deletion.
                    result.only_local.push(local_entry.clone());
                } else {
                    result.to_upload.push(local_entry.clone());
                }
            }
            Some(remote_entry) => match prior.get(path.as_str()) {
                Some(record) => {
                    let local_changed =
                        local_entry.modified_ms > record.modified_time + tolerance_ms;
                    let remote_changed =
                        remote_entry.modified_ms > record.modified_time + tolerance_ms;
                    match (local_changed, remote_changed) {
                        (true, true) => result.conflicts.push(ConflictPair {
                            local: local_entry.clone(),
                            remote: remote_entry.clone(),
                        }),
                        (true, false) => result.to_upload.push(local_entry.clone()),
                        (false, true) => result.to_download.push(remote_entry.clone()),
                        (false, false) => result.in_sync.push(SyncedPair {
                            local: local_entry.clone(),
                            remote: remote_entry.clone(),
                        }),
                    }
                }
                None => {
                    // No prior record: fall back to a direct two-way
                    // comparison of the observed timestamps.
                    let delta = local_entry.modified_ms - remote_entry.modified_ms;
                    if delta.abs() <= tolerance_ms {
                        result.in_sync.push(SyncedPair {
                            local: local_entry.clone(),
                            remote: remote_entry.clone(),
                        });
                    } else if delta > 0 {
                        result.to_upload.push(local_entry.clone());
                    } else {
                        result.to_download.push(remote_entry.clone());
                    }
                }
            },
        }
    }

    for path in remote.sorted_file_paths() {
        if local.contains_file(path) {
            continue;
        }
        let remote_entry = &remote.files[path.as_str()];
        if prior.contains_key(path.as_str()) {
            // Was synced before, gone locally: orphaned by a local deletion.
            result.only_remote.push(remote_entry.clone());
        } else {
            result.to_download.push(remote_entry.clone());
        }
    }

    result
}
