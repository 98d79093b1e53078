//! State store - the sidecar snapshot of the last synchronized state
//!
//! Loaded once at pass start, rewritten once at pass end. The prior state is
//! what lets the comparator tell "created since last sync" apart from
//! "deleted since last sync".

use crate::types::SyncError;
use chrono::{DateTime, Utc};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// File name of the sidecar, stored beside the local root. Scanners must
/// skip it.
pub const STATE_FILE_NAME: &str = ".driftsync.state.json";

/// One per-path record confirmed in sync at `modified_time`.
///
/// `modified_time` is the maximum of the two sides' timestamps observed when
/// the record was last confirmed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StateRecord {
    pub path: String,
    pub modified_time: i64,
    pub local_size: Option<u64>,
    pub remote_id: Option<String>,
}

/// The last-known-synchronized snapshot.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SyncState {
    pub last_sync: DateTime<Utc>,
    pub files: Vec<StateRecord>,
}

impl SyncState {
    /// State with no prior records; comparison degrades to two-way.
    pub fn empty() -> Self {
        Self {
            last_sync: DateTime::UNIX_EPOCH,
            files: Vec::new(),
        }
    }

    /// Build a state stamped now from a set of records.
    pub fn from_records(mut files: Vec<StateRecord>) -> Self {
        files.sort_by(|a, b| a.path.cmp(&b.path));
        Self {
            last_sync: Utc::now(),
            files,
        }
    }

    /// Index records by path; at most one record exists per path.
    pub fn by_path(&self) -> HashMap<&str, &StateRecord> {
        self.files
            .iter()
            .map(|record| (record.path.as_str(), record))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }
}

/// Loads and persists the sidecar file.
#[derive(Debug, Clone)]
pub struct StateStore {
    path: PathBuf,
}

impl StateStore {
    /// Store for the sidecar beside `local_root`.
    pub fn for_root(local_root: &Path) -> Self {
        Self {
            path: local_root.join(STATE_FILE_NAME),
        }
    }

    /// Store at an explicit path (tests).
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the prior state.
    ///
    /// A missing or corrupt sidecar degrades to [`SyncState::empty`]: the
    /// pass then runs a two-way comparison, which may report spurious
    /// conflicts but never deletes anything on its own.
    pub fn load(&self) -> SyncState {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(err) => {
                debug!(
                    "no prior state at {} ({}), starting empty",
                    self.path.display(),
                    err
                );
                return SyncState::empty();
            }
        };

        match serde_json::from_str(&raw) {
            Ok(state) => state,
            Err(err) => {
                warn!(
                    "state file {} is corrupt ({}), treating prior state as empty",
                    self.path.display(),
                    err
                );
                SyncState::empty()
            }
        }
    }

    /// Persist the state as a whole-file replace.
    ///
    /// Writes to a temporary file in the same directory and renames it over
    /// the sidecar, so a crash mid-write never leaves a partial file.
    pub fn save(&self, state: &SyncState) -> Result<(), SyncError> {
        let json = serde_json::to_string_pretty(state)
            .map_err(|e| SyncError::State(format!("serialize state: {}", e)))?;

        let mut tmp_name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| STATE_FILE_NAME.into());
        tmp_name.push(".tmp");
        let tmp_path = self.path.with_file_name(tmp_name);
        fs::write(&tmp_path, json.as_bytes())
            .map_err(|e| SyncError::State(format!("write {}: {}", tmp_path.display(), e)))?;
        fs::rename(&tmp_path, &self.path)
            .map_err(|e| SyncError::State(format!("rename to {}: {}", self.path.display(), e)))?;
        Ok(())
    }
}
