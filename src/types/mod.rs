//! Core type definitions for driftsync

mod entry;
mod error;
mod report;
mod snapshot;

pub use entry::{file_name, join_path, parent_of, FileEntry, FolderEntry};
pub use error::{ActionError, ActionKind, RemoteError, SyncError};
pub use report::{ConflictResolution, ResolvedSide, SyncReport};
pub use snapshot::TreeSnapshot;

use std::time::{SystemTime, UNIX_EPOCH};

/// Convert a filesystem timestamp to epoch milliseconds.
///
/// Times before the epoch clamp to zero; sub-epoch filesystems are not a
/// supported sync target.
pub fn epoch_ms(time: SystemTime) -> i64 {
    time.duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}
