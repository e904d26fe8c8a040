//! Handles of background transfers.

use tokio::task::JoinHandle;

use crate::api::RemoteEntry;
use crate::error::{BlompError, Result};
use crate::fs::drive::Drive;
use crate::fs::node::FolderId;

/// Default number of bytes moved per iteration of a transfer.
pub const DEFAULT_CHUNK_SIZE: usize = 8192;

/// A running upload or download.
///
/// Dropping the handle detaches the task; it keeps running until the
/// stream is exhausted. Errors of the task are returned by
/// [`TransferHandle::join`].
#[derive(Debug)]
pub struct TransferHandle<T> {
    task: JoinHandle<Result<T>>,
}

impl<T> TransferHandle<T> {
    pub(crate) fn new(task: JoinHandle<Result<T>>) -> Self {
        Self { task }
    }

    /// Wait for the transfer to finish.
    pub async fn join(self) -> Result<T> {
        match self.task.await {
            Ok(result) => result,
            Err(e) => Err(BlompError::Transfer(format!("transfer task ended abnormally: {}", e))),
        }
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Stop the task at its next suspension point. The remote side is not
    /// told, and a partially written download stays on disk.
    pub fn abort(&self) {
        self.task.abort();
    }
}

/// A running upload.
///
/// The task re-lists the destination folder once the body is sent;
/// [`UploadHandle::wait`] applies that listing so the new file shows up in
/// the [`Drive`].
#[derive(Debug)]
pub struct UploadHandle {
    folder: FolderId,
    /// Directory key the task lists once the body is sent.
    listed_key: String,
    inner: TransferHandle<Vec<RemoteEntry>>,
}

impl UploadHandle {
    pub(crate) fn new(
        folder: FolderId,
        listed_key: String,
        inner: TransferHandle<Vec<RemoteEntry>>,
    ) -> Self {
        Self {
            folder,
            listed_key,
            inner,
        }
    }

    /// Destination folder.
    pub fn folder(&self) -> FolderId {
        self.folder
    }

    pub fn is_finished(&self) -> bool {
        self.inner.is_finished()
    }

    pub fn abort(&self) {
        self.inner.abort();
    }

    /// Wait for the upload and refresh the destination folder.
    ///
    /// If the folder has been dropped from the drive in the meantime the
    /// listing is discarded. If it was renamed or moved, the listing of its
    /// old location is discarded and the folder is reloaded instead.
    pub async fn wait(self, drive: &mut Drive) -> Result<()> {
        let listing = self.inner.join().await?;
        let Ok(folder) = drive.folder(self.folder) else {
            return Ok(());
        };
        if folder.dir_key() == self.listed_key {
            drive.apply_listing(self.folder, listing)
        } else {
            drive.reload(self.folder).await
        }
    }

    /// Wait for the upload without touching any drive.
    pub async fn join(self) -> Result<Vec<RemoteEntry>> {
        self.inner.join().await
    }
}
