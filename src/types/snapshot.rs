//! TreeSnapshot - flat path-indexed view of one side of the sync

use super::{FileEntry, FolderEntry};
use std::collections::HashMap;

/// Flat scan result for one side (local or remote).
///
/// Both scanners produce the same shape so the comparator can index either
/// side by relative path. Snapshots are recomputed from scratch every pass;
/// nothing is cached across runs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TreeSnapshot {
    /// Map: relative posix path → file entry
    pub files: HashMap<String, FileEntry>,

    /// Map: relative posix path → folder entry
    pub folders: HashMap<String, FolderEntry>,

    /// Aggregate byte count of all files
    pub total_size: u64,
}

impl TreeSnapshot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a file entry, replacing any previous entry at the same path.
    pub fn insert_file(&mut self, entry: FileEntry) {
        if let Some(old) = self.files.get(&entry.path) {
            self.total_size = self.total_size.saturating_sub(old.size);
        }
        self.total_size += entry.size;
        self.files.insert(entry.path.clone(), entry);
    }

    pub fn insert_folder(&mut self, entry: FolderEntry) {
        self.folders.insert(entry.path.clone(), entry);
    }

    pub fn file(&self, path: &str) -> Option<&FileEntry> {
        self.files.get(path)
    }

    pub fn contains_file(&self, path: &str) -> bool {
        self.files.contains_key(path)
    }

    pub fn file_count(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty() && self.folders.is_empty()
    }

    /// File paths in sorted order, for deterministic iteration.
    pub fn sorted_file_paths(&self) -> Vec<&String> {
        let mut paths: Vec<&String> = self.files.keys().collect();
        paths.sort();
        paths
    }
}
