//! Arena owning the folder and file nodes of one session.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::api::{RemoteEntry, RemoteStorageApi};
use crate::error::{BlompError, Result};
use crate::fs::node::{FileId, FileNode, FolderId, FolderNode, FolderSlot, NodeRef};
use crate::path::RemotePath;

/// Files at least this large hide a listed subfolder of the same name.
///
/// The dashboard lists a bogus subfolder next to very large files; the
/// threshold is the smallest size at which this was observed (100 MiB).
pub const LARGE_FILE_SHADOW_THRESHOLD: u64 = 104_857_600;

/// The remote folder tree of a session.
///
/// Nodes are addressed by [`FolderId`] and [`FileId`] handles. A handle stays
/// valid until a reload drops its node; after that every access fails with
/// [`BlompError::StaleNode`]. Slots are never reused, so a stale handle
/// cannot alias a newer node.
///
/// Structural operations take `&mut self`: the tree is not synchronized
/// internally.
pub struct Drive {
    pub(crate) api: Arc<dyn RemoteStorageApi>,
    folders: Vec<Option<FolderNode>>,
    files: Vec<Option<FileNode>>,
    root: FolderId,
}

impl Drive {
    /// Create a drive whose root has not been listed yet.
    pub fn new(api: Arc<dyn RemoteStorageApi>) -> Self {
        Self {
            api,
            folders: vec![Some(FolderNode::new(RemotePath::root(), None))],
            files: Vec::new(),
            root: FolderId(0),
        }
    }

    /// Create a drive and list its root.
    pub async fn open(api: Arc<dyn RemoteStorageApi>) -> Result<Self> {
        let mut drive = Self::new(api);
        let root = drive.root;
        drive.reload(root).await?;
        Ok(drive)
    }

    pub fn root(&self) -> FolderId {
        self.root
    }

    pub fn folder(&self, id: FolderId) -> Result<&FolderNode> {
        self.folders
            .get(id.0)
            .and_then(Option::as_ref)
            .ok_or(BlompError::StaleNode)
    }

    pub fn file(&self, id: FileId) -> Result<&FileNode> {
        self.files
            .get(id.0)
            .and_then(Option::as_ref)
            .ok_or(BlompError::StaleNode)
    }

    pub(crate) fn folder_mut(&mut self, id: FolderId) -> Result<&mut FolderNode> {
        self.folders
            .get_mut(id.0)
            .and_then(Option::as_mut)
            .ok_or(BlompError::StaleNode)
    }

    pub(crate) fn file_mut(&mut self, id: FileId) -> Result<&mut FileNode> {
        self.files
            .get_mut(id.0)
            .and_then(Option::as_mut)
            .ok_or(BlompError::StaleNode)
    }

    /// Whether the handle still refers to a live node.
    pub fn contains(&self, node: NodeRef) -> bool {
        match node {
            NodeRef::File(id) => self.file(id).is_ok(),
            NodeRef::Folder(id) => self.folder(id).is_ok(),
        }
    }

    /// Folder currently holding `file`.
    pub fn file_owner(&self, file: FileId) -> Result<FolderId> {
        Ok(self.file(file)?.owner)
    }

    pub(crate) fn insert_folder(&mut self, node: FolderNode) -> FolderId {
        self.folders.push(Some(node));
        FolderId(self.folders.len() - 1)
    }

    fn insert_file(&mut self, node: FileNode) -> FileId {
        self.files.push(Some(node));
        FileId(self.files.len() - 1)
    }

    /// Drop a folder and everything materialized below it.
    pub(crate) fn detach_folder(&mut self, id: FolderId) {
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let Some(node) = self.folders.get_mut(current.0).and_then(Option::take) else {
                continue;
            };
            for file in node.files {
                if let Some(slot) = self.files.get_mut(file.0) {
                    *slot = None;
                }
            }
            stack.extend(node.slots.into_iter().filter_map(|slot| match slot {
                FolderSlot::Materialized(child) => Some(child),
                FolderSlot::Unexpanded(_) => None,
            }));
        }
    }

    /// Free the arena entry of a folder without touching its children.
    pub(crate) fn forget_folder(&mut self, id: FolderId) {
        if let Some(slot) = self.folders.get_mut(id.0) {
            *slot = None;
        }
    }

    /// Replace the content of `id` with a fresh listing.
    ///
    /// Files are rebuilt from scratch. Folder markers are dropped, and so is
    /// any subfolder shadowed by a large file of the same name. Subfolders
    /// that were already materialized and are still listed keep their handle;
    /// those no longer listed are detached.
    pub(crate) fn apply_listing(&mut self, id: FolderId, entries: Vec<RemoteEntry>) -> Result<()> {
        let path = self.folder(id)?.path.clone();

        let mut subdirs = Vec::new();
        let mut new_files = Vec::new();
        for entry in entries {
            match entry {
                RemoteEntry::Subdir(subdir) => subdirs.push(subdir),
                RemoteEntry::File(record) if !record.is_directory_marker() => {
                    new_files.push(FileNode::from_record(id, path.clone(), record));
                }
                RemoteEntry::File(_) => {}
            }
        }

        subdirs.retain(|subdir| {
            !new_files
                .iter()
                .any(|file| file.size >= LARGE_FILE_SHADOW_THRESHOLD && file.name == subdir.name())
        });

        let folder = self.folder_mut(id)?;
        let old_files = std::mem::take(&mut folder.files);
        let old_slots = std::mem::take(&mut folder.slots);

        for file in old_files {
            if let Some(slot) = self.files.get_mut(file.0) {
                *slot = None;
            }
        }
        let file_ids: Vec<FileId> = new_files
            .into_iter()
            .map(|file| self.insert_file(file))
            .collect();

        let mut materialized: HashMap<String, FolderId> = HashMap::new();
        for slot in old_slots {
            let FolderSlot::Materialized(child) = slot else {
                continue;
            };
            let Ok(name) = self.folder(child).map(|node| node.name().to_string()) else {
                continue;
            };
            if let Some(duplicate) = materialized.insert(name, child) {
                self.detach_folder(duplicate);
            }
        }

        let slots: Vec<FolderSlot> = subdirs
            .into_iter()
            .map(|subdir| match materialized.remove(subdir.name()) {
                Some(child) => FolderSlot::Materialized(child),
                None => FolderSlot::Unexpanded(subdir),
            })
            .collect();

        for (_, vanished) in materialized {
            self.detach_folder(vanished);
        }

        let folder = self.folder_mut(id)?;
        folder.files = file_ids;
        folder.slots = slots;
        Ok(())
    }

    /// Push the path of `id` down to every materialized descendant.
    ///
    /// Unexpanded slots need no update: they resolve against the parent's
    /// path when materialized.
    pub(crate) fn propagate_path(&mut self, id: FolderId) -> Result<()> {
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            let folder = self.folder(current)?;
            let path = folder.path.clone();
            let files = folder.files.clone();
            let children: Vec<FolderId> = folder
                .slots
                .iter()
                .filter_map(|slot| match slot {
                    FolderSlot::Materialized(child) => Some(*child),
                    FolderSlot::Unexpanded(_) => None,
                })
                .collect();

            for file in files {
                if let Ok(node) = self.file_mut(file) {
                    node.owner = current;
                    node.owner_path = path.clone();
                }
            }
            for child in children {
                if let Ok(node) = self.folder_mut(child) {
                    let name = node.name().to_string();
                    node.path = path.join(name.as_str());
                    node.parent = Some(current);
                    stack.push(child);
                }
            }
        }
        Ok(())
    }

    /// Whether `folder` is `ancestor` or lies below it.
    pub(crate) fn is_within(&self, folder: FolderId, ancestor: FolderId) -> Result<bool> {
        let mut current = Some(folder);
        while let Some(id) = current {
            if id == ancestor {
                return Ok(true);
            }
            current = self.folder(id)?.parent;
        }
        Ok(false)
    }
}

impl fmt::Debug for Drive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Drive")
            .field("root", &self.root)
            .field("folders", &self.folders.iter().filter(|f| f.is_some()).count())
            .field("files", &self.files.iter().filter(|f| f.is_some()).count())
            .finish()
    }
}
