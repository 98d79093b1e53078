//! Local tree scanner

use crate::filter::is_excluded;
use crate::state::STATE_FILE_NAME;
use crate::types::{epoch_ms, join_path, FileEntry, FolderEntry, SyncError, TreeSnapshot};
use std::fs;
use std::path::{Path, PathBuf};

/// Scan the local directory tree under `root`.
///
/// Uses an explicit worklist rather than call-stack recursion so deep trees
/// cannot overflow the stack. Exclusion patterns are applied before a
/// directory is descended into, and the sidecar state file is never part of
/// the snapshot.
///
/// Any unreadable path is fatal: the comparator cannot run against an
/// incomplete tree.
pub fn scan_local(root: &Path, exclude: &[String]) -> Result<TreeSnapshot, SyncError> {
    if !root.is_dir() {
        return Err(SyncError::Scan {
            path: root.display().to_string(),
            message: "not a directory".to_string(),
        });
    }

    let mut snapshot = TreeSnapshot::new();
    let mut worklist: Vec<(PathBuf, String)> = vec![(root.to_path_buf(), String::new())];

    while let Some((dir, prefix)) = worklist.pop() {
        let entries = fs::read_dir(&dir).map_err(|e| scan_error(&dir, e))?;

        for entry in entries {
            let entry = entry.map_err(|e| scan_error(&dir, e))?;
            let name = entry.file_name().to_string_lossy().into_owned();
            if name == STATE_FILE_NAME {
                continue;
            }

            let rel = join_path(&prefix, &name);
            if is_excluded(&rel, exclude) {
                continue;
            }

            let file_type = entry.file_type().map_err(|e| scan_error(&entry.path(), e))?;
            if file_type.is_dir() {
                snapshot.insert_folder(FolderEntry::local(rel.clone()));
                worklist.push((entry.path(), rel));
            } else if file_type.is_file() {
                let metadata = entry.metadata().map_err(|e| scan_error(&entry.path(), e))?;
                let modified = metadata.modified().map_err(|e| scan_error(&entry.path(), e))?;
                snapshot.insert_file(FileEntry::local(rel, metadata.len(), epoch_ms(modified)));
            }
            // Symlinks and special files are not synced.
        }
    }

    Ok(snapshot)
}

fn scan_error(path: &Path, err: std::io::Error) -> SyncError {
    SyncError::Scan {
        path: path.display().to_string(),
        message: err.to_string(),
    }
}
