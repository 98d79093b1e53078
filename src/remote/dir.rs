//! Directory-backed remote store.
//!
//! Treats a second local directory as the remote hierarchy: object ids are
//! relative posix paths under the base directory and the root folder id is
//! the empty string. This is the backend the bundled binary syncs against;
//! real providers implement [`RemoteStore`] out of tree.

use super::{RemoteItem, RemoteStore};
use crate::types::{epoch_ms, join_path, RemoteError};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// [`RemoteStore`] over a plain directory tree.
#[derive(Debug, Clone)]
pub struct DirStore {
    base: PathBuf,
}

impl DirStore {
    /// Root folder id for every [`DirStore`].
    pub const ROOT_ID: &'static str = "";

    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    fn resolve(&self, id: &str) -> PathBuf {
        let mut path = self.base.clone();
        for part in id.split('/').filter(|p| !p.is_empty()) {
            path.push(part);
        }
        path
    }

    fn map_io(err: std::io::Error, path: &Path) -> RemoteError {
        match err.kind() {
            ErrorKind::NotFound => RemoteError::NotFound(path.display().to_string()),
            _ => RemoteError::Api(format!("{}: {}", path.display(), err)),
        }
    }
}

impl RemoteStore for DirStore {
    fn list_children(&self, folder_id: &str) -> Result<Vec<RemoteItem>, RemoteError> {
        let dir = self.resolve(folder_id);
        let read = fs::read_dir(&dir).map_err(|e| Self::map_io(e, &dir))?;

        let mut items = Vec::new();
        for entry in read {
            let entry = entry.map_err(|e| Self::map_io(e, &dir))?;
            let name = entry.file_name().to_string_lossy().into_owned();
            let metadata = entry.metadata().map_err(|e| Self::map_io(e, &dir))?;
            let modified_ms = metadata.modified().map(epoch_ms).unwrap_or(0);
            items.push(RemoteItem {
                id: join_path(folder_id, &name),
                name,
                is_folder: metadata.is_dir(),
                size: if metadata.is_dir() { 0 } else { metadata.len() },
                modified_ms,
            });
        }
        items.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(items)
    }

    fn create_folder(&self, name: &str, parent_id: &str) -> Result<String, RemoteError> {
        let id = join_path(parent_id, name);
        let path = self.resolve(&id);
        fs::create_dir_all(&path).map_err(|e| Self::map_io(e, &path))?;
        Ok(id)
    }

    fn upload_file(
        &self,
        name: &str,
        content: &[u8],
        _mime_type: &str,
        parent_id: &str,
    ) -> Result<String, RemoteError> {
        let id = join_path(parent_id, name);
        let path = self.resolve(&id);
        fs::write(&path, content).map_err(|e| Self::map_io(e, &path))?;
        Ok(id)
    }

    fn update_file(
        &self,
        id: &str,
        content: &[u8],
        _mime_type: &str,
    ) -> Result<String, RemoteError> {
        let path = self.resolve(id);
        fs::write(&path, content).map_err(|e| Self::map_io(e, &path))?;
        Ok(id.to_string())
    }

    fn download_file(&self, id: &str) -> Result<Vec<u8>, RemoteError> {
        let path = self.resolve(id);
        fs::read(&path).map_err(|e| Self::map_io(e, &path))
    }

    fn delete_file(&self, id: &str) -> Result<(), RemoteError> {
        let path = self.resolve(id);
        let metadata = fs::symlink_metadata(&path).map_err(|e| Self::map_io(e, &path))?;
        let result = if metadata.is_dir() {
            fs::remove_dir_all(&path)
        } else {
            fs::remove_file(&path)
        };
        result.map_err(|e| Self::map_io(e, &path))
    }
}
