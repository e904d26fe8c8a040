//! Drive operations split into focused modules.

mod browse;
mod dir_ops;
mod download;
mod share;
mod upload;
mod utils;

pub use download::DownloadTarget;
pub use upload::{AsyncReadSeek, UploadOptions, UploadSource};
