//! Transport boundary consumed by the filesystem model.

use async_trait::async_trait;

use super::types::{
    ByteStream, EntryKind, MoveRequest, Outcome, RemoteEntry, SharePermission, ShareInfo,
    UploadRequest,
};
use crate::error::Result;

/// Every dashboard call the filesystem model issues.
///
/// [`crate::api::DashboardClient`] implements this over HTTP. Paths are the
/// strings the dashboard expects: folders as directory keys (`"a/b/"`, root
/// `""`) and files as full paths (`"a/b/file.txt"`).
#[async_trait]
pub trait RemoteStorageApi: Send + Sync {
    /// List the direct children of the folder keyed by `prefix`.
    async fn list_directory(&self, prefix: &str) -> Result<Vec<RemoteEntry>>;

    /// Open a streamed download of a file.
    async fn download_stream(&self, path: &str, file_name: &str, size: u64)
        -> Result<ByteStream>;

    /// Upload one file in a single multipart chunk.
    async fn upload_multipart(&self, request: UploadRequest) -> Result<()>;

    /// Rename a file or folder inside `parent_path`.
    async fn rename_entry(
        &self,
        original_name: &str,
        kind: EntryKind,
        new_name: &str,
        parent_path: &str,
    ) -> Result<Outcome>;

    /// Delete a file; returns the server's `response` flag.
    async fn delete_file(&self, path: &str) -> Result<bool>;

    /// Delete a folder and its content; returns the server's `response` flag.
    async fn delete_folder(&self, path: &str) -> Result<bool>;

    async fn move_or_copy(&self, request: MoveRequest) -> Result<Outcome>;

    /// Create `name` inside `parent_path`. The dashboard gives no usable answer.
    async fn create_folder(&self, parent_path: &str, name: &str) -> Result<()>;

    /// Fetch (creating on first call) the share record of a file.
    async fn fetch_share_link(&self, path: &str, size: u64) -> Result<ShareInfo>;

    /// Send share invitations. `emails` may be empty.
    async fn send_share_invite(
        &self,
        emails: &[String],
        link: &str,
        permission: SharePermission,
    ) -> Result<()>;

    /// Switch sharing of a share record on or off.
    async fn set_share_status(&self, id: u64, enabled: bool) -> Result<Outcome>;

    /// Full public link for a share slug.
    fn share_link(&self, slug: &str) -> String;
}
