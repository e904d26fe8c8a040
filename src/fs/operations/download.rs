//! Download operations.

use std::fmt;
use std::path::PathBuf;

use futures::StreamExt;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::{debug, info, warn};

use crate::error::{BlompError, Result};
use crate::fs::drive::Drive;
use crate::fs::node::FileId;
use crate::fs::transfer::TransferHandle;
use crate::progress::TransferMonitor;

/// Where a download is written.
pub enum DownloadTarget {
    /// A local file. An existing directory means "a file named like the
    /// remote one inside this directory". An existing file is truncated.
    Path(PathBuf),
    /// Any async writer, e.g. an in-memory buffer or a socket.
    Writer(Box<dyn AsyncWrite + Send + Unpin>),
}

impl fmt::Debug for DownloadTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DownloadTarget::Path(path) => f.debug_tuple("Path").field(path).finish(),
            DownloadTarget::Writer(_) => f.write_str("Writer(..)"),
        }
    }
}

impl From<PathBuf> for DownloadTarget {
    fn from(path: PathBuf) -> Self {
        DownloadTarget::Path(path)
    }
}

impl From<&std::path::Path> for DownloadTarget {
    fn from(path: &std::path::Path) -> Self {
        DownloadTarget::Path(path.to_path_buf())
    }
}

impl Drive {
    /// Download a file in the background.
    ///
    /// The request is issued and the sink opened before this returns, so a
    /// bad target path fails here with [`BlompError::Io`]. The body is then
    /// written by a spawned task in pieces of at most `chunk_size` bytes;
    /// the monitor advances after each piece.
    ///
    /// # Example
    /// ```no_run
    /// # use blomplib::{RemoteSession, DownloadTarget, DEFAULT_CHUNK_SIZE};
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let session = RemoteSession::login("user@example.com", "password").await?;
    /// let mut drive = session.get_root_directory().await?;
    /// let root = drive.root();
    ///
    /// if let Some(file) = drive.file_by_name(root, "notes.txt")? {
    ///     let (handle, monitor) = drive
    ///         .download(file, DownloadTarget::Path("notes.txt".into()), DEFAULT_CHUNK_SIZE)
    ///         .await?;
    ///     handle.join().await?;
    ///     println!("{} bytes", monitor.loaded());
    /// }
    /// # Ok(())
    /// # }
    /// ```
    pub async fn download(
        &self,
        file: FileId,
        target: DownloadTarget,
        chunk_size: usize,
    ) -> Result<(TransferHandle<()>, TransferMonitor)> {
        if chunk_size == 0 {
            return Err(BlompError::Validation("Chunk size must be positive".to_string()));
        }
        let node = self.file(file)?;
        let path = node.file_path();
        let name = node.name().to_string();
        let size = node.size();

        let mut stream = self.api.download_stream(&path, &name, size).await?;

        let mut sink: Box<dyn AsyncWrite + Send + Unpin> = match target {
            DownloadTarget::Writer(writer) => writer,
            DownloadTarget::Path(mut local) => {
                if tokio::fs::metadata(&local)
                    .await
                    .map(|m| m.is_dir())
                    .unwrap_or(false)
                {
                    local.push(&name);
                }
                debug!(remote = %path, local = %local.display(), "opening download target");
                Box::new(tokio::fs::File::create(&local).await?)
            }
        };

        let monitor = TransferMonitor::download(size);
        let task_monitor = monitor.clone();

        let task = tokio::spawn(async move {
            let result = async {
                while let Some(chunk) = stream.next().await {
                    let chunk =
                        chunk.map_err(|e| BlompError::Transfer(format!("download of {} failed: {}", path, e)))?;
                    for piece in chunk.chunks(chunk_size) {
                        sink.write_all(piece)
                            .await
                            .map_err(|e| BlompError::Transfer(format!("write error: {}", e)))?;
                        task_monitor.record_progress(piece.len() as u64);
                        sink.flush()
                            .await
                            .map_err(|e| BlompError::Transfer(format!("write error: {}", e)))?;
                    }
                }
                sink.shutdown()
                    .await
                    .map_err(|e| BlompError::Transfer(format!("write error: {}", e)))?;
                Ok(())
            }
            .await;

            match &result {
                Ok(()) => info!(remote = %path, bytes = task_monitor.loaded(), "download finished"),
                Err(e) => warn!(remote = %path, error = %e, "download failed"),
            }
            task_monitor.finish(result.is_ok());
            result
        });

        Ok((TransferHandle::new(task), monitor))
    }
}
