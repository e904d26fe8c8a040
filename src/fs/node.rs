//! Folder and file nodes of the remote tree.

use chrono::NaiveDateTime;

use crate::api::types::{FileRecord, ShareInfo, SubdirRef};
use crate::path::RemotePath;

/// Handle of a folder inside a [`crate::fs::Drive`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FolderId(pub(crate) usize);

/// Handle of a file inside a [`crate::fs::Drive`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FileId(pub(crate) usize);

/// Either kind of node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeRef {
    File(FileId),
    Folder(FolderId),
}

impl From<FileId> for NodeRef {
    fn from(id: FileId) -> Self {
        NodeRef::File(id)
    }
}

impl From<FolderId> for NodeRef {
    fn from(id: FolderId) -> Self {
        NodeRef::Folder(id)
    }
}

/// A subfolder slot: listed but not loaded, or loaded.
///
/// A slot only ever moves from `Unexpanded` to `Materialized`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FolderSlot {
    Unexpanded(SubdirRef),
    Materialized(FolderId),
}

/// Share state of a file, fetched on first use.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareDescriptor {
    pub id: u64,
    pub enabled: bool,
    /// Full public link.
    pub link: String,
}

impl ShareDescriptor {
    pub(crate) fn from_info(info: &ShareInfo, link: String) -> Self {
        Self {
            id: info.id,
            enabled: info.status != 0,
            link,
        }
    }
}

/// A remote file.
#[derive(Debug, Clone)]
pub struct FileNode {
    pub(crate) hash: String,
    pub(crate) last_modified: NaiveDateTime,
    pub(crate) size: u64,
    pub(crate) name: String,
    pub(crate) content_type: String,
    pub(crate) owner: FolderId,
    pub(crate) owner_path: RemotePath,
    pub(crate) share: Option<ShareDescriptor>,
}

impl FileNode {
    pub(crate) fn from_record(owner: FolderId, owner_path: RemotePath, record: FileRecord) -> Self {
        let name = RemotePath::parse(&record.name).name().to_string();
        Self {
            hash: record.hash,
            last_modified: record.last_modified,
            size: record.bytes,
            name,
            content_type: record.content_type,
            owner,
            owner_path,
            share: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// File size in bytes.
    pub fn size(&self) -> u64 {
        self.size
    }

    /// MD5 of the content.
    pub fn md5_hash(&self) -> &str {
        &self.hash
    }

    pub fn last_modified(&self) -> NaiveDateTime {
        self.last_modified
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }

    /// Folder holding this file.
    pub fn owner(&self) -> FolderId {
        self.owner
    }

    /// Path of the folder holding this file.
    pub fn owner_path(&self) -> &RemotePath {
        &self.owner_path
    }

    pub fn path(&self) -> RemotePath {
        self.owner_path.join(self.name.as_str())
    }

    /// Full path as the dashboard expects it (`"a/b/file.txt"`).
    pub fn file_path(&self) -> String {
        self.path().to_string()
    }

    /// Cached share state, if it has been fetched.
    pub fn share_descriptor(&self) -> Option<&ShareDescriptor> {
        self.share.as_ref()
    }
}

/// A remote folder.
#[derive(Debug, Clone)]
pub struct FolderNode {
    pub(crate) path: RemotePath,
    pub(crate) parent: Option<FolderId>,
    pub(crate) slots: Vec<FolderSlot>,
    pub(crate) files: Vec<FileId>,
}

impl FolderNode {
    pub(crate) fn new(path: RemotePath, parent: Option<FolderId>) -> Self {
        Self {
            path,
            parent,
            slots: Vec::new(),
            files: Vec::new(),
        }
    }

    /// Folder name; empty for the root.
    pub fn name(&self) -> &str {
        self.path.name()
    }

    pub fn path(&self) -> &RemotePath {
        &self.path
    }

    /// Directory key as the dashboard expects it (`"a/b/"`, root `""`).
    pub fn dir_key(&self) -> String {
        self.path.dir_key()
    }

    pub fn parent(&self) -> Option<FolderId> {
        self.parent
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none() && self.path.is_root()
    }

    /// Subfolder slots in listing order.
    pub fn slots(&self) -> &[FolderSlot] {
        &self.slots
    }

    /// Files in listing order.
    pub fn files(&self) -> &[FileId] {
        &self.files
    }
}
