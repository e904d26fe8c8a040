//! Upload operations.

use std::fmt;
use std::io::SeekFrom;
use std::path::PathBuf;

use bytes::Bytes;
use futures::StreamExt;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncSeek, AsyncSeekExt};
use tokio_util::io::ReaderStream;
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::utils::validate_name;
use crate::api::UploadRequest;
use crate::error::{BlompError, Result};
use crate::fs::drive::Drive;
use crate::fs::node::FolderId;
use crate::fs::transfer::{TransferHandle, UploadHandle, DEFAULT_CHUNK_SIZE};
use crate::progress::TransferMonitor;

/// A seekable async reader.
pub trait AsyncReadSeek: AsyncRead + AsyncSeek + Unpin + Send {}

impl<T> AsyncReadSeek for T where T: AsyncRead + AsyncSeek + Unpin + Send {}

/// Content of an upload.
pub enum UploadSource {
    /// A local file; name and size default to the file's.
    Path(PathBuf),
    /// A seekable reader. The size is measured from the current position
    /// to the end unless given in [`UploadOptions::file_size`].
    Reader(Box<dyn AsyncReadSeek>),
    /// A forward-only reader. [`UploadOptions::file_size`] is required.
    Stream(Box<dyn AsyncRead + Send + Unpin>),
}

impl fmt::Debug for UploadSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UploadSource::Path(path) => f.debug_tuple("Path").field(path).finish(),
            UploadSource::Reader(_) => f.write_str("Reader(..)"),
            UploadSource::Stream(_) => f.write_str("Stream(..)"),
        }
    }
}

impl From<PathBuf> for UploadSource {
    fn from(path: PathBuf) -> Self {
        UploadSource::Path(path)
    }
}

/// Options for [`Drive::upload`].
#[derive(Debug, Clone)]
pub struct UploadOptions {
    /// Remote file name; required unless the source is a path.
    pub file_name: Option<String>,
    /// Declared size in bytes; required for [`UploadSource::Stream`].
    pub file_size: Option<u64>,
    /// Upload even if the cached listing already has a file of that name.
    pub replace_if_exists: bool,
    pub chunk_size: usize,
}

impl Default for UploadOptions {
    fn default() -> Self {
        Self {
            file_name: None,
            file_size: None,
            replace_if_exists: false,
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }
}

impl UploadOptions {
    pub fn with_file_name(mut self, name: impl Into<String>) -> Self {
        self.file_name = Some(name.into());
        self
    }

    pub fn with_file_size(mut self, size: u64) -> Self {
        self.file_size = Some(size);
        self
    }

    pub fn replace_if_exists(mut self, replace: bool) -> Self {
        self.replace_if_exists = replace;
        self
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }
}

impl Drive {
    /// Upload a file into `folder` in the background.
    ///
    /// Name, size and the duplicate check are resolved before this returns.
    /// The duplicate check only looks at the cached listing of `folder`.
    /// The spawned task streams the body, then lists `folder` again; pass
    /// the returned handle's [`UploadHandle::wait`] this drive to apply that
    /// listing.
    ///
    /// # Example
    /// ```no_run
    /// # use blomplib::{RemoteSession, UploadOptions, UploadSource};
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let session = RemoteSession::login("user@example.com", "password").await?;
    /// let mut drive = session.get_root_directory().await?;
    /// let root = drive.root();
    ///
    /// let (handle, monitor) = drive
    ///     .upload(root, UploadSource::Path("report.pdf".into()), UploadOptions::default())
    ///     .await?;
    /// handle.wait(&mut drive).await?;
    /// assert_eq!(monitor.progress(), 1.0);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn upload(
        &self,
        folder: FolderId,
        source: UploadSource,
        options: UploadOptions,
    ) -> Result<(UploadHandle, TransferMonitor)> {
        if options.chunk_size == 0 {
            return Err(BlompError::Validation("Chunk size must be positive".to_string()));
        }
        let key = self.folder(folder)?.dir_key();

        let (name, size, reader): (String, u64, Box<dyn AsyncRead + Send + Unpin>) = match source {
            UploadSource::Path(path) => {
                let name = match override_name(&options) {
                    Some(name) => name,
                    None => path
                        .file_name()
                        .map(|n| n.to_string_lossy().into_owned())
                        .ok_or_else(|| {
                            BlompError::Validation(format!(
                                "Cannot determine a file name for {}",
                                path.display()
                            ))
                        })?,
                };
                let file = tokio::fs::File::open(&path).await?;
                let size = match options.file_size {
                    Some(size) => size,
                    None => file.metadata().await?.len(),
                };
                (name, size, Box::new(file))
            }
            UploadSource::Reader(mut reader) => {
                let name = required_name(&options)?;
                let size = match options.file_size {
                    Some(size) => size,
                    None => {
                        let start = reader.stream_position().await?;
                        let end = reader.seek(SeekFrom::End(0)).await?;
                        reader.seek(SeekFrom::Start(start)).await?;
                        end.saturating_sub(start)
                    }
                };
                (name, size, Box::new(reader))
            }
            UploadSource::Stream(reader) => {
                let name = required_name(&options)?;
                let size = options.file_size.ok_or_else(|| {
                    BlompError::Validation(
                        "File size is required for a source that cannot seek".to_string(),
                    )
                })?;
                (name, size, reader)
            }
        };

        validate_name(&name)?;
        if !options.replace_if_exists && self.file_by_name(folder, &name)?.is_some() {
            return Err(BlompError::AlreadyExists(format!(
                "{} already exists in {}",
                name,
                self.folder(folder)?.path()
            )));
        }

        let monitor = TransferMonitor::upload(size);
        let stream_monitor = monitor.clone();
        let mut sent: u64 = 0;
        let content = ReaderStream::with_capacity(reader.take(size), options.chunk_size)
            .map(move |chunk| -> Result<Bytes> {
                let chunk = chunk?;
                sent += chunk.len() as u64;
                stream_monitor.record_progress(sent);
                Ok(chunk)
            })
            .boxed();

        let request = UploadRequest {
            folder: key.clone(),
            file_name: name.clone(),
            size,
            upload_id: Uuid::new_v4(),
            mime_type: mime_guess::from_path(&name)
                .first_or_octet_stream()
                .to_string(),
            content,
        };
        debug!(folder = %key, file = %name, size, "starting upload");

        let listed_key = key.clone();
        let api = self.api.clone();
        let task_monitor = monitor.clone();
        let task = tokio::spawn(async move {
            let result = async {
                api.upload_multipart(request)
                    .await
                    .map_err(|e| BlompError::Transfer(format!("upload of {} failed: {}", name, e)))?;
                api.list_directory(&key).await
            }
            .await;

            match &result {
                Ok(_) => info!(folder = %key, file = %name, bytes = task_monitor.loaded(), "upload finished"),
                Err(e) => warn!(folder = %key, file = %name, error = %e, "upload failed"),
            }
            task_monitor.finish(result.is_ok());
            result
        });

        Ok((UploadHandle::new(folder, listed_key, TransferHandle::new(task)), monitor))
    }
}

/// Explicit file name; an empty one counts as not given.
fn override_name(options: &UploadOptions) -> Option<String> {
    options.file_name.clone().filter(|name| !name.is_empty())
}

fn required_name(options: &UploadOptions) -> Result<String> {
    override_name(options).ok_or_else(|| {
        BlompError::Validation("A file name is required when uploading from a reader".to_string())
    })
}
