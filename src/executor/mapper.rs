//! Path mapper - memoized remote folder resolution

use crate::remote::RemoteStore;
use crate::types::{join_path, RemoteError};
use std::collections::HashMap;

/// Resolves relative folder paths to remote folder ids, creating missing
/// intermediate folders on demand.
///
/// Resolutions are memoized for the remainder of the run, so a folder is
/// listed or created at most once no matter how many files land in it.
pub struct PathMapper {
    cache: HashMap<String, String>,
}

impl PathMapper {
    /// Mapper rooted at the remote folder `root_id` (path `""`).
    pub fn new(root_id: &str) -> Self {
        let mut cache = HashMap::new();
        cache.insert(String::new(), root_id.to_string());
        Self { cache }
    }

    /// Seed a known path → folder id mapping (from a prior remote scan).
    pub fn prime(&mut self, path: &str, folder_id: &str) {
        self.cache.insert(path.to_string(), folder_id.to_string());
    }

    /// Resolve `dir_path`, creating every missing intermediate folder.
    pub fn ensure(
        &mut self,
        store: &dyn RemoteStore,
        dir_path: &str,
    ) -> Result<String, RemoteError> {
        if let Some(id) = self.cache.get(dir_path) {
            return Ok(id.clone());
        }

        let mut current_path = String::new();
        let mut current_id = self.cache[""].clone();

        for part in dir_path.split('/') {
            current_path = join_path(&current_path, part);
            if let Some(id) = self.cache.get(&current_path) {
                current_id = id.clone();
                continue;
            }

            let existing = store
                .list_children(&current_id)?
                .into_iter()
                .find(|item| item.is_folder && item.name == part)
                .map(|item| item.id);
            current_id = match existing {
                Some(id) => id,
                None => store.create_folder(part, &current_id)?,
            };
            self.cache.insert(current_path.clone(), current_id.clone());
        }

        Ok(current_id)
    }
}
