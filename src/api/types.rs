//! Request and response types exchanged with the dashboard.

use bytes::Bytes;
use chrono::{DateTime, NaiveDateTime};
use futures::stream::BoxStream;
use serde::{Deserialize, Deserializer};
use uuid::Uuid;

use crate::error::Result;
use crate::path::RemotePath;

/// Content type the dashboard gives to zero-byte folder marker objects.
pub const DIRECTORY_CONTENT_TYPE: &str = "application/directory";

/// Streamed body of a download or upload.
pub type ByteStream = BoxStream<'static, Result<Bytes>>;

/// One element of a directory listing.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RemoteEntry {
    /// Subdirectory that has not been listed yet.
    Subdir(SubdirRef),
    /// Concrete file metadata.
    File(FileRecord),
}

/// Placeholder for a subdirectory in a listing.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SubdirRef {
    #[serde(rename = "subdir")]
    pub path: RemotePath,
}

impl SubdirRef {
    pub fn new(path: impl Into<RemotePath>) -> Self {
        Self { path: path.into() }
    }

    /// Folder name (last path component).
    pub fn name(&self) -> &str {
        self.path.name()
    }
}

/// File metadata as listed by the dashboard.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FileRecord {
    /// MD5 of the content.
    pub hash: String,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub last_modified: NaiveDateTime,
    pub bytes: u64,
    /// Object name; may carry the folder prefix.
    pub name: String,
    pub content_type: String,
}

impl FileRecord {
    /// Whether this record is a folder marker rather than a file.
    pub fn is_directory_marker(&self) -> bool {
        self.content_type == DIRECTORY_CONTENT_TYPE
    }
}

fn deserialize_timestamp<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> std::result::Result<NaiveDateTime, D::Error> {
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {raw}")))
}

/// Parse the dashboard's ISO-8601 timestamps, with or without fraction or offset.
pub(crate) fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    raw.parse::<NaiveDateTime>()
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.naive_local()))
        .or_else(|| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f").ok())
}

/// Text outcome of rename, move and share-switch calls.
///
/// The dashboard answers HTTP 200 in every case and signals success with
/// the literal body `success`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Success,
    Failure(String),
}

impl Outcome {
    pub fn from_body(body: impl Into<String>) -> Self {
        let body = body.into();
        if body == "success" {
            Outcome::Success
        } else {
            Outcome::Failure(body)
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success)
    }
}

/// Kind of a node as named by the rename and move endpoints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    File,
    Folder,
}

impl EntryKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryKind::File => "file",
            EntryKind::Folder => "folder",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveAction {
    Move,
    Copy,
}

impl MoveAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            MoveAction::Move => "move",
            MoveAction::Copy => "copy",
        }
    }
}

/// Parameters of the move/copy endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveRequest {
    /// Full file path, or directory key of a folder.
    pub original_path: String,
    pub action: MoveAction,
    /// Directory key of the destination folder.
    pub target_path: String,
    /// File name; empty for folders.
    pub file_name: String,
    pub kind: EntryKind,
}

/// Share record of a file, as returned by the share-link endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ShareInfo {
    pub id: u64,
    /// Server-issued link slug.
    pub link: String,
    /// `1` when sharing is switched on.
    pub status: i64,
    #[serde(default)]
    pub permission: i64,
    #[serde(default)]
    pub container: Option<String>,
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub size: Option<u64>,
}

/// Who may open a shared link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SharePermission {
    /// Only invited registered users.
    Invited = 0,
    /// Anyone with the link.
    Anyone = 1,
}

/// Single-chunk upload of one file.
pub struct UploadRequest {
    /// Directory key of the destination folder.
    pub folder: String,
    pub file_name: String,
    pub size: u64,
    pub upload_id: Uuid,
    pub mime_type: String,
    pub content: ByteStream,
}

impl std::fmt::Debug for UploadRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UploadRequest")
            .field("folder", &self.folder)
            .field("file_name", &self.file_name)
            .field("size", &self.size)
            .field("upload_id", &self.upload_id)
            .field("mime_type", &self.mime_type)
            .finish_non_exhaustive()
    }
}
