//! Remote store contract
//!
//! The engine depends only on this trait; provider specifics (auth, transport,
//! HTTP retry plumbing) live behind implementations supplied by the caller.

mod dir;
pub mod memory;
mod retry;

pub use dir::DirStore;
pub use memory::MemoryStore;
pub use retry::RetryingStore;

use crate::types::RemoteError;

/// One child returned by a folder listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteItem {
    /// Store-assigned identifier
    pub id: String,

    /// Display name within the parent folder
    pub name: String,

    /// Type marker distinguishing folders from files
    pub is_folder: bool,

    /// Size in bytes (0 for folders)
    pub size: u64,

    /// Modification time, epoch milliseconds
    pub modified_ms: i64,
}

/// Hierarchical object store the engine syncs against.
///
/// Implementations are expected to handle provider-level pagination inside
/// `list_children` and return the complete child set.
pub trait RemoteStore {
    /// List all children of a folder.
    fn list_children(&self, folder_id: &str) -> Result<Vec<RemoteItem>, RemoteError>;

    /// Create a folder under `parent_id`, returning the new folder id.
    fn create_folder(&self, name: &str, parent_id: &str) -> Result<String, RemoteError>;

    /// Create a file under `parent_id`, returning the new file id.
    fn upload_file(
        &self,
        name: &str,
        content: &[u8],
        mime_type: &str,
        parent_id: &str,
    ) -> Result<String, RemoteError>;

    /// Replace the content of an existing file, returning its id.
    fn update_file(&self, id: &str, content: &[u8], mime_type: &str)
        -> Result<String, RemoteError>;

    /// Fetch the full content of a file.
    fn download_file(&self, id: &str) -> Result<Vec<u8>, RemoteError>;

    /// Delete a file or folder.
    fn delete_file(&self, id: &str) -> Result<(), RemoteError>;
}

/// Best-effort MIME type from a file name extension.
pub fn mime_for(name: &str) -> &'static str {
    let ext = name.rsplit('.').next().unwrap_or("");
    match ext.to_ascii_lowercase().as_str() {
        "txt" | "md" | "log" => "text/plain",
        "html" | "htm" => "text/html",
        "css" => "text/css",
        "csv" => "text/csv",
        "json" => "application/json",
        "xml" => "application/xml",
        "pdf" => "application/pdf",
        "zip" => "application/zip",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        "mp3" => "audio/mpeg",
        "mp4" => "video/mp4",
        _ => "application/octet-stream",
    }
}
