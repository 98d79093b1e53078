//! FileEntry / FolderEntry - scanned tree entries

use serde::{Deserialize, Serialize};

/// A file observed by a scanner, local or remote.
///
/// Paths are posix-style and relative to the sync root (`"a/b.txt"`), which
/// keeps local and remote entries directly comparable by key. `modified_ms`
/// is epoch milliseconds; local entries derive it from the filesystem mtime,
/// remote entries from the store-reported timestamp.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FileEntry {
    /// Relative posix path from the sync root, unique per scan
    pub path: String,

    /// File name (final path component)
    pub name: String,

    /// Size in bytes
    pub size: u64,

    /// Modification time, epoch milliseconds
    pub modified_ms: i64,

    /// Identifier assigned by the remote store; `None` for local entries
    pub remote_id: Option<String>,
}

impl FileEntry {
    /// Create a local entry (no remote id).
    pub fn local(path: impl Into<String>, size: u64, modified_ms: i64) -> Self {
        let path = path.into();
        let name = file_name(&path);
        Self {
            path,
            name,
            size,
            modified_ms,
            remote_id: None,
        }
    }

    /// Create a remote entry carrying its store identifier.
    pub fn remote(
        path: impl Into<String>,
        size: u64,
        modified_ms: i64,
        remote_id: impl Into<String>,
    ) -> Self {
        let path = path.into();
        let name = file_name(&path);
        Self {
            path,
            name,
            size,
            modified_ms,
            remote_id: Some(remote_id.into()),
        }
    }

    /// Parent directory portion of the path; empty string for root-level files.
    pub fn parent(&self) -> &str {
        parent_of(&self.path)
    }
}

/// A folder observed by a scanner.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FolderEntry {
    /// Relative posix path from the sync root
    pub path: String,

    /// Folder name (final path component)
    pub name: String,

    /// Identifier assigned by the remote store; `None` for local entries
    pub remote_id: Option<String>,
}

impl FolderEntry {
    pub fn local(path: impl Into<String>) -> Self {
        let path = path.into();
        let name = file_name(&path);
        Self {
            path,
            name,
            remote_id: None,
        }
    }

    pub fn remote(path: impl Into<String>, remote_id: impl Into<String>) -> Self {
        let path = path.into();
        let name = file_name(&path);
        Self {
            path,
            name,
            remote_id: Some(remote_id.into()),
        }
    }
}

/// Final component of a posix relative path.
pub fn file_name(path: &str) -> String {
    path.rsplit('/').next().unwrap_or(path).to_string()
}

/// Parent portion of a posix relative path ("" at root level).
pub fn parent_of(path: &str) -> &str {
    match path.rfind('/') {
        Some(idx) => &path[..idx],
        None => "",
    }
}

/// Join two posix relative path fragments, tolerating an empty base.
pub fn join_path(base: &str, name: &str) -> String {
    if base.is_empty() {
        name.to_string()
    } else {
        format!("{}/{}", base, name)
    }
}
