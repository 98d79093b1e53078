//! In-memory remote store.
//!
//! Reference backend used by the test suite: timestamps are controlled by an
//! explicit clock and failures can be injected per file name, which makes
//! partial-failure and retry behavior reproducible.

use super::{RemoteItem, RemoteStore};
use crate::types::RemoteError;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

/// Root folder id used by every [`MemoryStore`].
pub const ROOT_ID: &str = "root";

#[derive(Debug, Clone)]
struct Node {
    id: String,
    name: String,
    parent: String,
    is_folder: bool,
    content: Vec<u8>,
    modified_ms: i64,
}

#[derive(Debug, Default)]
struct Inner {
    nodes: HashMap<String, Node>,
    next_id: u64,
    clock_ms: i64,
    fail_uploads: HashSet<String>,
    fail_downloads: HashSet<String>,
    fail_lists: HashSet<String>,
    rate_limited_calls: u32,
}

/// Thread-safe in-memory implementation of [`RemoteStore`].
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Timestamp assigned to subsequent uploads and updates.
    pub fn set_clock(&self, epoch_ms: i64) {
        self.lock().clock_ms = epoch_ms;
    }

    /// Inject a failure for every upload/update of a file with this name.
    pub fn fail_uploads_of(&self, name: &str) {
        self.lock().fail_uploads.insert(name.to_string());
    }

    /// Inject a failure for every download of a file with this name.
    pub fn fail_downloads_of(&self, name: &str) {
        self.lock().fail_downloads.insert(name.to_string());
    }

    /// Inject a listing failure for the folder with this name.
    pub fn fail_listing_of(&self, folder_name: &str) {
        self.lock().fail_lists.insert(folder_name.to_string());
    }

    /// Answer the next `calls` store mutations with `RateLimited`.
    pub fn rate_limit_next(&self, calls: u32) {
        self.lock().rate_limited_calls = calls;
    }

    /// Seed a file at a posix path, creating intermediate folders.
    pub fn seed_file(&self, path: &str, content: &[u8], modified_ms: i64) {
        let (parent_path, name) = split_path(path);
        let parent_id = self.seed_folder(parent_path);
        let mut inner = self.lock();
        let id = inner.alloc_id();
        inner.nodes.insert(
            id.clone(),
            Node {
                id,
                name: name.to_string(),
                parent: parent_id,
                is_folder: false,
                content: content.to_vec(),
                modified_ms,
            },
        );
    }

    /// Seed a folder path, returning its id ("" and "root" map to the root).
    pub fn seed_folder(&self, path: &str) -> String {
        let mut inner = self.lock();
        let mut current = ROOT_ID.to_string();
        if path.is_empty() {
            return current;
        }
        for part in path.split('/') {
            let existing = inner
                .nodes
                .values()
                .find(|n| n.parent == current && n.name == part && n.is_folder)
                .map(|n| n.id.clone());
            current = match existing {
                Some(id) => id,
                None => {
                    let id = inner.alloc_id();
                    inner.nodes.insert(
                        id.clone(),
                        Node {
                            id: id.clone(),
                            name: part.to_string(),
                            parent: current,
                            is_folder: true,
                            content: Vec::new(),
                            modified_ms: 0,
                        },
                    );
                    id
                }
            };
        }
        current
    }

    /// Content of the file at a posix path, if present.
    pub fn content_of(&self, path: &str) -> Option<Vec<u8>> {
        let inner = self.lock();
        inner
            .node_at(path)
            .filter(|n| !n.is_folder)
            .map(|n| n.content.clone())
    }

    /// Modification time of the file at a posix path, if present.
    pub fn modified_of(&self, path: &str) -> Option<i64> {
        let inner = self.lock();
        inner.node_at(path).map(|n| n.modified_ms)
    }

    /// All file paths currently in the store, sorted.
    pub fn file_paths(&self) -> Vec<String> {
        let inner = self.lock();
        let mut paths: Vec<String> = inner
            .nodes
            .values()
            .filter(|n| !n.is_folder)
            .map(|n| inner.path_of(n))
            .collect();
        paths.sort();
        paths
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Inner {
    fn alloc_id(&mut self) -> String {
        self.next_id += 1;
        format!("mem-{}", self.next_id)
    }

    fn take_rate_limit(&mut self) -> bool {
        if self.rate_limited_calls > 0 {
            self.rate_limited_calls -= 1;
            true
        } else {
            false
        }
    }

    fn node_at(&self, path: &str) -> Option<&Node> {
        let mut current = ROOT_ID.to_string();
        let mut found: Option<&Node> = None;
        for part in path.split('/') {
            let node = self
                .nodes
                .values()
                .find(|n| n.parent == current && n.name == part)?;
            current = node.id.clone();
            found = Some(node);
        }
        found
    }

    fn path_of(&self, node: &Node) -> String {
        let mut parts = vec![node.name.clone()];
        let mut parent = node.parent.clone();
        while parent != ROOT_ID {
            match self.nodes.get(&parent) {
                Some(p) => {
                    parts.push(p.name.clone());
                    parent = p.parent.clone();
                }
                None => break,
            }
        }
        parts.reverse();
        parts.join("/")
    }
}

impl RemoteStore for MemoryStore {
    fn list_children(&self, folder_id: &str) -> Result<Vec<RemoteItem>, RemoteError> {
        let inner = self.lock();
        if folder_id != ROOT_ID && !inner.nodes.contains_key(folder_id) {
            return Err(RemoteError::NotFound(folder_id.to_string()));
        }
        if let Some(folder) = inner.nodes.get(folder_id) {
            if inner.fail_lists.contains(&folder.name) {
                return Err(RemoteError::Api(format!(
                    "injected listing failure for {}",
                    folder.name
                )));
            }
        }
        let mut items: Vec<RemoteItem> = inner
            .nodes
            .values()
            .filter(|n| n.parent == folder_id)
            .map(|n| RemoteItem {
                id: n.id.clone(),
                name: n.name.clone(),
                is_folder: n.is_folder,
                size: n.content.len() as u64,
                modified_ms: n.modified_ms,
            })
            .collect();
        items.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(items)
    }

    fn create_folder(&self, name: &str, parent_id: &str) -> Result<String, RemoteError> {
        let mut inner = self.lock();
        if inner.take_rate_limit() {
            return Err(RemoteError::RateLimited);
        }
        let id = inner.alloc_id();
        let modified_ms = inner.clock_ms;
        inner.nodes.insert(
            id.clone(),
            Node {
                id: id.clone(),
                name: name.to_string(),
                parent: parent_id.to_string(),
                is_folder: true,
                content: Vec::new(),
                modified_ms,
            },
        );
        Ok(id)
    }

    fn upload_file(
        &self,
        name: &str,
        content: &[u8],
        _mime_type: &str,
        parent_id: &str,
    ) -> Result<String, RemoteError> {
        let mut inner = self.lock();
        if inner.take_rate_limit() {
            return Err(RemoteError::RateLimited);
        }
        if inner.fail_uploads.contains(name) {
            return Err(RemoteError::Api(format!(
                "injected upload failure for {}",
                name
            )));
        }
        let id = inner.alloc_id();
        let modified_ms = inner.clock_ms;
        inner.nodes.insert(
            id.clone(),
            Node {
                id: id.clone(),
                name: name.to_string(),
                parent: parent_id.to_string(),
                is_folder: false,
                content: content.to_vec(),
                modified_ms,
            },
        );
        Ok(id)
    }

    fn update_file(
        &self,
        id: &str,
        content: &[u8],
        _mime_type: &str,
    ) -> Result<String, RemoteError> {
        let mut inner = self.lock();
        if inner.take_rate_limit() {
            return Err(RemoteError::RateLimited);
        }
        let clock_ms = inner.clock_ms;
        let fail = {
            let node = inner
                .nodes
                .get(id)
                .ok_or_else(|| RemoteError::NotFound(id.to_string()))?;
            inner.fail_uploads.contains(&node.name)
        };
        if fail {
            return Err(RemoteError::Api(format!(
                "injected update failure for {}",
                id
            )));
        }
        let node = inner
            .nodes
            .get_mut(id)
            .ok_or_else(|| RemoteError::NotFound(id.to_string()))?;
        node.content = content.to_vec();
        node.modified_ms = clock_ms;
        Ok(id.to_string())
    }

    fn download_file(&self, id: &str) -> Result<Vec<u8>, RemoteError> {
        let inner = self.lock();
        let node = inner
            .nodes
            .get(id)
            .ok_or_else(|| RemoteError::NotFound(id.to_string()))?;
        if inner.fail_downloads.contains(&node.name) {
            return Err(RemoteError::Api(format!(
                "injected download failure for {}",
                node.name
            )));
        }
        Ok(node.content.clone())
    }

    fn delete_file(&self, id: &str) -> Result<(), RemoteError> {
        let mut inner = self.lock();
        if inner.take_rate_limit() {
            return Err(RemoteError::RateLimited);
        }
        if inner.nodes.remove(id).is_none() {
            return Err(RemoteError::NotFound(id.to_string()));
        }
        // Remove any descendants of a deleted folder.
        loop {
            let orphan: Option<String> = inner
                .nodes
                .values()
                .find(|n| n.parent != ROOT_ID && !inner.nodes.contains_key(&n.parent))
                .map(|n| n.id.clone());
            match orphan {
                Some(id) => {
                    inner.nodes.remove(&id);
                }
                None => break,
            }
        }
        Ok(())
    }
}

fn split_path(path: &str) -> (&str, &str) {
    match path.rfind('/') {
        Some(idx) => (&path[..idx], &path[idx + 1..]),
        None => ("", path),
    }
}
