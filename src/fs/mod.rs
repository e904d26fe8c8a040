//! In-memory model of the remote folder tree.

mod drive;
pub(crate) mod node;
mod operations;
mod transfer;

pub use drive::{Drive, LARGE_FILE_SHADOW_THRESHOLD};
pub use node::{FileId, FileNode, FolderId, FolderNode, FolderSlot, NodeRef, ShareDescriptor};
pub use operations::{AsyncReadSeek, DownloadTarget, UploadOptions, UploadSource};
pub use transfer::{TransferHandle, UploadHandle, DEFAULT_CHUNK_SIZE};
