//! Listing and lookup operations.

use tracing::debug;

use crate::error::Result;
use crate::fs::drive::Drive;
use crate::fs::node::{FileId, FolderId, FolderNode, FolderSlot, NodeRef};

impl Drive {
    /// Re-list a folder from the server.
    ///
    /// Call this after anything that changes the folder's content (upload,
    /// paste into it, delete, create). The local tree is a read-through
    /// cache and is not updated by those calls on its own.
    pub async fn reload(&mut self, folder: FolderId) -> Result<()> {
        let key = self.folder(folder)?.dir_key();
        let entries = self.api.list_directory(&key).await?;
        debug!(folder = %key, entries = entries.len(), "reloaded folder");
        self.apply_listing(folder, entries)
    }

    /// Files of a folder, in listing order.
    pub fn files(&self, folder: FolderId) -> Result<&[FileId]> {
        Ok(self.folder(folder)?.files())
    }

    /// Find a direct file child by name.
    pub fn file_by_name(&self, folder: FolderId, name: &str) -> Result<Option<FileId>> {
        let node = self.folder(folder)?;
        for &file in node.files() {
            if self.file(file)?.name() == name {
                return Ok(Some(file));
            }
        }
        Ok(None)
    }

    /// Find a direct subfolder by name, loading it on first access.
    pub async fn folder_by_name(&mut self, folder: FolderId, name: &str) -> Result<Option<FolderId>> {
        let mut found = None;
        for (index, slot) in self.folder(folder)?.slots().iter().enumerate() {
            let matches = match slot {
                FolderSlot::Unexpanded(subdir) => subdir.name() == name,
                FolderSlot::Materialized(child) => self.folder(*child)?.name() == name,
            };
            if matches {
                found = Some(index);
                break;
            }
        }

        match found {
            Some(index) => Ok(Some(self.materialize(folder, index).await?)),
            None => Ok(None),
        }
    }

    /// All subfolders of a folder, loading the ones not yet loaded.
    pub async fn subfolders(&mut self, folder: FolderId) -> Result<Vec<FolderId>> {
        let count = self.folder(folder)?.slots().len();
        let mut ids = Vec::with_capacity(count);
        for index in 0..count {
            ids.push(self.materialize(folder, index).await?);
        }
        Ok(ids)
    }

    /// Every child of a folder: subfolders first, then files.
    pub async fn children(&mut self, folder: FolderId) -> Result<Vec<NodeRef>> {
        let mut children: Vec<NodeRef> = self
            .subfolders(folder)
            .await?
            .into_iter()
            .map(NodeRef::Folder)
            .collect();
        children.extend(self.files(folder)?.iter().copied().map(NodeRef::File));
        Ok(children)
    }

    /// Names of the direct subfolders, without loading them.
    pub fn subfolder_names(&self, folder: FolderId) -> Result<Vec<String>> {
        let mut names = Vec::new();
        for slot in self.folder(folder)?.slots() {
            match slot {
                FolderSlot::Unexpanded(subdir) => names.push(subdir.name().to_string()),
                FolderSlot::Materialized(child) => names.push(self.folder(*child)?.name().to_string()),
            }
        }
        Ok(names)
    }

    /// Turn slot `index` of `parent` into a loaded folder.
    ///
    /// The listing is fetched before the slot changes, so a failed request
    /// leaves the slot unexpanded. The new folder's path is the parent's
    /// current path joined with the listed name.
    pub(crate) async fn materialize(&mut self, parent: FolderId, index: usize) -> Result<FolderId> {
        let parent_node = self.folder(parent)?;
        let subdir = match parent_node.slots.get(index) {
            Some(FolderSlot::Materialized(child)) => return Ok(*child),
            Some(FolderSlot::Unexpanded(subdir)) => subdir.clone(),
            None => {
                return Err(crate::error::BlompError::NotFound(format!(
                    "slot {} of {}",
                    index,
                    parent_node.path()
                )))
            }
        };

        let path = parent_node.path().join(subdir.name());
        let entries = self.api.list_directory(&path.dir_key()).await?;

        let child = self.insert_folder(FolderNode::new(path, Some(parent)));
        self.apply_listing(child, entries)?;
        self.folder_mut(parent)?.slots[index] = FolderSlot::Materialized(child);
        debug!(folder = %self.folder(child)?.path(), "materialized folder");
        Ok(child)
    }
}
