//! Dashboard API boundary and its HTTP implementation.

pub mod client;
pub mod storage;
pub mod types;

pub use client::{DashboardClient, SessionContext};
pub use storage::RemoteStorageApi;
pub use types::{
    ByteStream, EntryKind, FileRecord, MoveAction, MoveRequest, Outcome, RemoteEntry,
    SharePermission, ShareInfo, SubdirRef, UploadRequest, DIRECTORY_CONTENT_TYPE,
};
