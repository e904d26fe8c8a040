//! Directory and node mutation operations.

use tracing::{debug, warn};

use super::utils::validate_name;
use crate::api::{EntryKind, MoveAction, MoveRequest, Outcome, RemoteEntry};
use crate::error::{BlompError, Result};
use crate::fs::drive::Drive;
use crate::fs::node::{FileId, FolderId, FolderSlot, NodeRef};
use crate::path::RemotePath;

impl Drive {
    /// Create a subfolder.
    ///
    /// The dashboard gives no usable answer, so the local tree is left as is;
    /// call [`Drive::reload`] to see the new folder.
    pub async fn create_subfolder(&mut self, folder: FolderId, name: &str) -> Result<()> {
        validate_name(name)?;
        let key = self.folder(folder)?.dir_key();
        self.api.create_folder(&key, name).await?;
        debug!(parent = %key, name, "requested folder creation");
        Ok(())
    }

    /// Delete a child of `folder`.
    ///
    /// Returns the server's verdict. The local tree is not updated; reload
    /// the folder to observe the deletion.
    pub async fn delete(&mut self, folder: FolderId, child: impl Into<NodeRef>) -> Result<bool> {
        let child = child.into();
        let folder_path = self.folder(folder)?.path().clone();
        match child {
            NodeRef::File(file) => {
                let node = self.file(file)?;
                if node.owner != folder {
                    return Err(BlompError::NotFound(format!(
                        "{} is not in {}",
                        node.name(),
                        folder_path
                    )));
                }
                let path = node.file_path();
                let deleted = self.api.delete_file(&path).await?;
                debug!(%path, deleted, "deleted file");
                Ok(deleted)
            }
            NodeRef::Folder(sub) => {
                let node = self.folder(sub)?;
                if node.parent != Some(folder) {
                    return Err(BlompError::NotFound(format!(
                        "{} is not in {}",
                        node.path(),
                        folder_path
                    )));
                }
                let key = node.dir_key();
                let deleted = self.api.delete_folder(&key).await?;
                debug!(folder = %key, deleted, "deleted folder");
                Ok(deleted)
            }
        }
    }

    /// Delete a child of `folder` by name. Files are matched before folders.
    pub async fn delete_by_name(&mut self, folder: FolderId, name: &str) -> Result<bool> {
        if let Some(file) = self.file_by_name(folder, name)? {
            return self.delete(folder, file).await;
        }
        match self.folder_by_name(folder, name).await? {
            Some(sub) => self.delete(folder, sub).await,
            None => Err(BlompError::NotFound(format!("Item not found: {}", name))),
        }
    }

    /// Copy or move a file or folder into `target`.
    ///
    /// Returns `false` when the dashboard refuses. After a successful move
    /// the node is re-homed under `target` and its path, and the paths of
    /// everything loaded below it, are rewritten. A copy leaves the source
    /// node untouched; reload `target` to see the copy.
    pub async fn paste(&mut self, target: FolderId, node: impl Into<NodeRef>, cut: bool) -> Result<bool> {
        let node = node.into();
        let target_key = self.folder(target)?.dir_key();
        let action = if cut { MoveAction::Move } else { MoveAction::Copy };

        let request = match node {
            NodeRef::File(file) => {
                let file_node = self.file(file)?;
                MoveRequest {
                    original_path: file_node.file_path(),
                    action,
                    target_path: target_key,
                    file_name: file_node.name().to_string(),
                    kind: EntryKind::File,
                }
            }
            NodeRef::Folder(folder) => {
                let folder_node = self.folder(folder)?;
                if folder_node.is_root() {
                    return Err(BlompError::Permission("Unable to move root folder".to_string()));
                }
                if self.is_within(target, folder)? {
                    return Err(BlompError::Validation(format!(
                        "Cannot paste {} into itself",
                        folder_node.path()
                    )));
                }
                MoveRequest {
                    original_path: folder_node.dir_key(),
                    action,
                    target_path: target_key,
                    file_name: String::new(),
                    kind: EntryKind::Folder,
                }
            }
        };

        debug!(from = %request.original_path, to = %request.target_path, action = action.as_str(), "paste");
        match self.api.move_or_copy(request).await? {
            Outcome::Success => {
                if cut {
                    self.relocate(node, target)?;
                }
                Ok(true)
            }
            Outcome::Failure(body) => {
                debug!(response = %body, "paste refused");
                Ok(false)
            }
        }
    }

    /// Rename a folder in place.
    ///
    /// The dashboard's own folder rename can stop halfway on large folders,
    /// leaving content split between the old and the new name.
    #[deprecated(note = "the server-side folder rename is unreliable; use `safe_rename`")]
    pub async fn rename_folder(&mut self, folder: FolderId, new_name: &str) -> Result<bool> {
        let node = self.folder(folder)?;
        if node.is_root() {
            return Err(BlompError::Permission("Unable to rename root folder".to_string()));
        }
        validate_name(new_name)?;
        warn!(
            folder = %node.path(),
            "direct folder rename may not complete; prefer safe_rename"
        );

        let outcome = self
            .api
            .rename_entry(node.name(), EntryKind::Folder, new_name, &node.dir_key())
            .await?;
        if !outcome.is_success() {
            return Ok(false);
        }

        let node = self.folder_mut(folder)?;
        node.path = node.path.parent().join(new_name);
        self.propagate_path(folder)?;
        Ok(true)
    }

    /// Rename a folder by moving its content into a new sibling.
    ///
    /// Creates `new_name` next to the folder, moves every direct child into
    /// it, deletes the emptied folder and takes over the new folder's path.
    /// Children already moved stay moved when a later move fails; in that
    /// case the original folder is not deleted and `false` is returned.
    /// Returns the server's verdict on the final delete otherwise.
    pub async fn safe_rename(&mut self, folder: FolderId, new_name: &str) -> Result<bool> {
        let node = self.folder(folder)?;
        let parent = match node.parent {
            Some(parent) if !node.is_root() => parent,
            _ => return Err(BlompError::Permission("Unable to rename root folder".to_string())),
        };
        validate_name(new_name)?;
        if node.name() == new_name {
            return Err(BlompError::Validation(format!(
                "{} already has that name",
                node.path()
            )));
        }

        self.create_subfolder(parent, new_name).await?;
        let sibling = self.resolve_created(parent, new_name).await?;

        let slots = self.folder(folder)?.slots.clone();
        let files = self.folder(folder)?.files.clone();

        for slot in slots {
            let moved = match slot {
                FolderSlot::Materialized(child) => self.paste(sibling, child, true).await?,
                FolderSlot::Unexpanded(subdir) => {
                    self.move_unexpanded(folder, subdir.name(), sibling).await?
                }
            };
            if !moved {
                warn!(folder = %self.folder(folder)?.path(), "safe rename stopped after a failed move");
                return Ok(false);
            }
        }
        for file in files {
            if !self.paste(sibling, file, true).await? {
                warn!(folder = %self.folder(folder)?.path(), "safe rename stopped after a failed move");
                return Ok(false);
            }
        }

        let old_key = self.folder(folder)?.dir_key();
        let deleted = self.api.delete_folder(&old_key).await?;
        debug!(folder = %old_key, deleted, "deleted renamed folder");

        self.adopt(folder, sibling, parent)?;
        Ok(deleted)
    }

    /// Rename a file.
    ///
    /// On success the cached share record is dropped: the dashboard keys it
    /// by path, so it is fetched again on the next share call.
    pub async fn rename_file(&mut self, file: FileId, new_name: &str) -> Result<bool> {
        validate_name(new_name)?;
        let node = self.file(file)?;
        let outcome = self
            .api
            .rename_entry(node.name(), EntryKind::File, new_name, &node.owner_path().dir_key())
            .await?;
        if !outcome.is_success() {
            return Ok(false);
        }

        let node = self.file_mut(file)?;
        node.name = new_name.to_string();
        node.share = None;
        Ok(true)
    }

    /// Re-list `parent` and find the folder just created in it.
    ///
    /// The creation call gives no answer, so the listing is the only proof
    /// that the folder exists.
    async fn resolve_created(&mut self, parent: FolderId, name: &str) -> Result<FolderId> {
        let key = self.folder(parent)?.dir_key();
        let entries = self.api.list_directory(&key).await?;
        let listed = entries.into_iter().find_map(|entry| match entry {
            RemoteEntry::Subdir(subdir) if subdir.name() == name => Some(subdir),
            _ => None,
        });
        let Some(subdir) = listed else {
            return Err(BlompError::NotFound(format!(
                "Created folder {} does not appear in {}",
                name,
                self.folder(parent)?.path()
            )));
        };

        if self.subfolder_names(parent)?.iter().all(|existing| existing != name) {
            self.folder_mut(parent)?
                .slots
                .push(FolderSlot::Unexpanded(subdir));
        }
        match self.folder_by_name(parent, name).await? {
            Some(id) => Ok(id),
            None => Err(BlompError::NotFound(format!("Folder not found: {}", name))),
        }
    }

    /// Move a subfolder that has not been loaded.
    async fn move_unexpanded(&mut self, folder: FolderId, name: &str, target: FolderId) -> Result<bool> {
        let source = self.folder(folder)?.path().join(name);
        let request = MoveRequest {
            original_path: source.dir_key(),
            action: MoveAction::Move,
            target_path: self.folder(target)?.dir_key(),
            file_name: String::new(),
            kind: EntryKind::Folder,
        };
        if !self.api.move_or_copy(request).await?.is_success() {
            return Ok(false);
        }

        let source_node = self.folder_mut(folder)?;
        let index = source_node.slots.iter().position(|slot| {
            matches!(slot, FolderSlot::Unexpanded(subdir) if subdir.name() == name)
        });
        if let Some(index) = index {
            let slot = source_node.slots.remove(index);
            self.folder_mut(target)?.slots.push(slot);
        }
        Ok(true)
    }

    /// Re-home a moved node under `target` in the local tree.
    fn relocate(&mut self, node: NodeRef, target: FolderId) -> Result<()> {
        match node {
            NodeRef::File(file) => {
                let old_owner = self.file(file)?.owner;
                if let Ok(owner) = self.folder_mut(old_owner) {
                    owner.files.retain(|&f| f != file);
                }
                let target_path = self.folder(target)?.path().clone();
                self.folder_mut(target)?.files.push(file);
                let node = self.file_mut(file)?;
                node.owner = target;
                node.owner_path = target_path;
            }
            NodeRef::Folder(folder) => {
                let old_parent = self.folder(folder)?.parent;
                if let Some(old_parent) = old_parent {
                    if let Ok(parent) = self.folder_mut(old_parent) {
                        parent
                            .slots
                            .retain(|slot| *slot != FolderSlot::Materialized(folder));
                    }
                }
                let target_path = self.folder(target)?.path().clone();
                self.folder_mut(target)?
                    .slots
                    .push(FolderSlot::Materialized(folder));
                let node = self.folder_mut(folder)?;
                let name = node.name().to_string();
                node.parent = Some(target);
                node.path = target_path.join(name.as_str());
                self.propagate_path(folder)?;
            }
        }
        Ok(())
    }

    /// Let `folder` take over the identity and content of `sibling`.
    ///
    /// `folder` keeps its handle: it takes `sibling`'s path and children,
    /// replaces `sibling`'s slot in `parent` and drops its own old slot.
    fn adopt(&mut self, folder: FolderId, sibling: FolderId, parent: FolderId) -> Result<()> {
        let sibling_node = self.folder_mut(sibling)?;
        let path: RemotePath = sibling_node.path.clone();
        let slots = std::mem::take(&mut sibling_node.slots);
        let files = std::mem::take(&mut sibling_node.files);
        self.forget_folder(sibling);

        let node = self.folder_mut(folder)?;
        node.path = path;
        node.slots = slots;
        node.files = files;

        let parent_node = self.folder_mut(parent)?;
        parent_node
            .slots
            .retain(|slot| *slot != FolderSlot::Materialized(folder));
        for slot in parent_node.slots.iter_mut() {
            if *slot == FolderSlot::Materialized(sibling) {
                *slot = FolderSlot::Materialized(folder);
            }
        }

        self.propagate_path(folder)
    }
}
