//! # blomplib
//!
//! Rust client library for the Blomp cloud-storage dashboard.
//!
//! ## Features
//!
//! - **Authentication**: Login with email/password, optional HTTP proxy,
//!   account figures scraped from the dashboard.
//! - **Filesystem Operations**:
//!   - Browse folders lazily; subfolders are listed on first access.
//!   - Create folders, delete, copy and move files and folders.
//!   - Rename files, and rename folders safely by moving their content.
//! - **File Transfers**:
//!   - Streamed upload and download in background tasks.
//!   - Progress tracking through a shared [`TransferMonitor`].
//! - **Sharing**:
//!   - Public links, e-mail invitations, switching links on and off.
//!
//! The folder tree is a read-through cache: operations that change a
//! folder on the server (upload, create, delete, paste) may need a
//! [`Drive::reload`] of that folder before the change shows up locally.
//!
//! ## Example
//!
//! ```no_run
//! use blomplib::{DownloadTarget, RemoteSession, UploadOptions, UploadSource, DEFAULT_CHUNK_SIZE};
//!
//! # async fn example() -> blomplib::Result<()> {
//! let session = RemoteSession::login("user@example.com", "password").await?;
//! let mut drive = session.get_root_directory().await?;
//! let root = drive.root();
//!
//! // List the root
//! for name in drive.subfolder_names(root)? {
//!     println!("{}/", name);
//! }
//! for &file in drive.files(root)? {
//!     let node = drive.file(file)?;
//!     println!("{} ({} bytes)", node.name(), node.size());
//! }
//!
//! // Upload, then wait so the new file appears in the tree
//! let (handle, _monitor) = drive
//!     .upload(root, UploadSource::Path("notes.txt".into()), UploadOptions::default())
//!     .await?;
//! handle.wait(&mut drive).await?;
//!
//! // Download it back
//! if let Some(file) = drive.file_by_name(root, "notes.txt")? {
//!     let (handle, monitor) = drive
//!         .download(file, DownloadTarget::Path("copy.txt".into()), DEFAULT_CHUNK_SIZE)
//!         .await?;
//!     handle.join().await?;
//!     println!("downloaded {:.0}%", monitor.progress() * 100.0);
//! }
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod config;
pub mod error;
pub mod fs;
pub mod http;
pub mod path;
pub mod progress;
pub mod session;
pub mod user_agent;

// Re-export commonly used types
pub use api::{DashboardClient, RemoteStorageApi};
pub use config::ClientConfig;
pub use error::{BlompError, Result};
pub use fs::{
    AsyncReadSeek, DownloadTarget, Drive, FileId, FileNode, FolderId, FolderNode, FolderSlot,
    NodeRef, ShareDescriptor, TransferHandle, UploadHandle, UploadOptions, UploadSource,
    DEFAULT_CHUNK_SIZE,
};
pub use path::RemotePath;
pub use progress::{TransferKind, TransferMonitor, TransferProgress, TransferState};
pub use session::{AccountStats, RemoteSession};
pub use user_agent::Browser;
