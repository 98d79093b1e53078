//! Remote tree scanner

use crate::filter::is_excluded;
use crate::remote::RemoteStore;
use crate::types::{join_path, FileEntry, FolderEntry, SyncError, TreeSnapshot};

/// Scan the remote hierarchy rooted at `root_id`.
///
/// Walks folder by folder via [`RemoteStore::list_children`], worklist-driven
/// like the local scanner. Excluded subtrees are pruned before their listing
/// call is issued, so no remote round-trips are spent on them. A listing
/// failure is fatal to the pass.
pub fn scan_remote(
    store: &dyn RemoteStore,
    root_id: &str,
    exclude: &[String],
) -> Result<TreeSnapshot, SyncError> {
    let mut snapshot = TreeSnapshot::new();
    let mut worklist: Vec<(String, String)> = vec![(root_id.to_string(), String::new())];

    while let Some((folder_id, prefix)) = worklist.pop() {
        let children = store
            .list_children(&folder_id)
            .map_err(|e| SyncError::Scan {
                path: if prefix.is_empty() {
                    "<remote root>".to_string()
                } else {
                    prefix.clone()
                },
                message: e.to_string(),
            })?;

        for item in children {
            let rel = join_path(&prefix, &item.name);
            if is_excluded(&rel, exclude) {
                continue;
            }

            if item.is_folder {
                snapshot.insert_folder(FolderEntry::remote(rel.clone(), item.id.clone()));
                worklist.push((item.id, rel));
            } else {
                snapshot.insert_file(FileEntry::remote(rel, item.size, item.modified_ms, item.id));
            }
        }
    }

    Ok(snapshot)
}
