//! In-memory dashboard used by the integration tests.

#![allow(dead_code)]

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use bytes::Bytes;
use chrono::NaiveDateTime;
use futures::{stream, StreamExt};

use blomplib::api::{
    ByteStream, EntryKind, FileRecord, MoveAction, MoveRequest, Outcome, RemoteEntry,
    RemoteStorageApi, ShareInfo, SharePermission, SubdirRef, UploadRequest,
};
use blomplib::{BlompError, Drive, Result};

#[derive(Debug, Clone)]
pub struct StoredFile {
    pub content: Vec<u8>,
    pub size: u64,
    pub content_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invite {
    pub emails: Vec<String>,
    pub link: String,
    pub permission: SharePermission,
}

#[derive(Default)]
struct State {
    folders: BTreeSet<String>,
    files: BTreeMap<String, StoredFile>,
    extra: HashMap<String, Vec<RemoteEntry>>,
    calls: HashMap<&'static str, usize>,
    listed: Vec<String>,
    moves: Vec<MoveRequest>,
    fail_moves_after: Option<usize>,
    fail_uploads: bool,
    fail_switch: bool,
    shares: HashMap<String, ShareInfo>,
    next_share_id: u64,
    invites: Vec<Invite>,
}

impl State {
    fn bump(&mut self, call: &'static str) {
        *self.calls.entry(call).or_default() += 1;
    }

    fn ensure_folders(&mut self, key: &str) {
        let mut current = String::new();
        for part in key.split('/').filter(|p| !p.is_empty()) {
            current.push_str(part);
            current.push('/');
            self.folders.insert(current.clone());
        }
    }

    fn relocate(&mut self, old_key: &str, new_key: &str, copy: bool) {
        let folders: Vec<String> = self
            .folders
            .iter()
            .filter(|f| f.starts_with(old_key))
            .cloned()
            .collect();
        for folder in folders {
            if !copy {
                self.folders.remove(&folder);
            }
            self.folders
                .insert(format!("{}{}", new_key, &folder[old_key.len()..]));
        }

        let files: Vec<String> = self
            .files
            .keys()
            .filter(|f| f.starts_with(old_key))
            .cloned()
            .collect();
        for path in files {
            let stored = if copy {
                self.files.get(&path).cloned()
            } else {
                self.files.remove(&path)
            };
            if let Some(stored) = stored {
                self.files
                    .insert(format!("{}{}", new_key, &path[old_key.len()..]), stored);
            }
        }
    }
}

/// Directory key of the folder holding `path` (a file path or a directory key).
fn parent_key(path: &str) -> String {
    let trimmed = path.trim_end_matches('/');
    match trimmed.rfind('/') {
        Some(i) => trimmed[..=i].to_string(),
        None => String::new(),
    }
}

fn last_component(path: &str) -> &str {
    let trimmed = path.trim_end_matches('/');
    match trimmed.rfind('/') {
        Some(i) => &trimmed[i + 1..],
        None => trimmed,
    }
}

pub fn timestamp() -> NaiveDateTime {
    "2024-03-01T12:00:00".parse().unwrap()
}

pub fn record(name: &str, size: u64, content_type: &str) -> FileRecord {
    FileRecord {
        hash: format!("{:032x}", size),
        last_modified: timestamp(),
        bytes: size,
        name: name.to_string(),
        content_type: content_type.to_string(),
    }
}

/// A dashboard kept in memory. Folders are directory keys (`"a/b/"`) and
/// files full paths (`"a/b/x.txt"`), exactly as on the wire.
#[derive(Default)]
pub struct FakeRemote {
    state: Mutex<State>,
}

impl FakeRemote {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_folder(mut self, key: &str) -> Self {
        self.state.get_mut().unwrap().ensure_folders(key);
        self
    }

    pub fn with_file(mut self, path: &str, content: &[u8]) -> Self {
        let state = self.state.get_mut().unwrap();
        state.ensure_folders(&parent_key(path));
        state.files.insert(
            path.to_string(),
            StoredFile {
                content: content.to_vec(),
                size: content.len() as u64,
                content_type: "text/plain".to_string(),
            },
        );
        self
    }

    /// A file that claims `size` bytes without holding any content.
    pub fn with_sized_file(mut self, path: &str, size: u64) -> Self {
        let state = self.state.get_mut().unwrap();
        state.ensure_folders(&parent_key(path));
        state.files.insert(
            path.to_string(),
            StoredFile {
                content: Vec::new(),
                size,
                content_type: "application/octet-stream".to_string(),
            },
        );
        self
    }

    /// Append a raw entry to the listing of `prefix`.
    pub fn with_entry(mut self, prefix: &str, entry: RemoteEntry) -> Self {
        self.state
            .get_mut()
            .unwrap()
            .extra
            .entry(prefix.to_string())
            .or_default()
            .push(entry);
        self
    }

    pub fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    /// Let the first `n` move/copy calls succeed and refuse the rest.
    pub fn fail_moves_after(&self, n: usize) {
        self.state.lock().unwrap().fail_moves_after = Some(n);
    }

    pub fn fail_uploads(&self) {
        self.state.lock().unwrap().fail_uploads = true;
    }

    pub fn fail_share_switch(&self) {
        self.state.lock().unwrap().fail_switch = true;
    }

    pub fn calls(&self, call: &str) -> usize {
        self.state
            .lock()
            .unwrap()
            .calls
            .get(call)
            .copied()
            .unwrap_or(0)
    }

    /// How many times the folder keyed by `prefix` was listed.
    pub fn listings_of(&self, prefix: &str) -> usize {
        self.state
            .lock()
            .unwrap()
            .listed
            .iter()
            .filter(|p| p.as_str() == prefix)
            .count()
    }

    pub fn has_file(&self, path: &str) -> bool {
        self.state.lock().unwrap().files.contains_key(path)
    }

    pub fn has_folder(&self, key: &str) -> bool {
        self.state.lock().unwrap().folders.contains(key)
    }

    pub fn file(&self, path: &str) -> Option<StoredFile> {
        self.state.lock().unwrap().files.get(path).cloned()
    }

    pub fn remove_folder(&self, key: &str) {
        let mut state = self.state.lock().unwrap();
        state.folders.retain(|f| !f.starts_with(key));
        state.files.retain(|f, _| !f.starts_with(key));
    }

    pub fn remove_file(&self, path: &str) {
        self.state.lock().unwrap().files.remove(path);
    }

    pub fn moves(&self) -> Vec<MoveRequest> {
        self.state.lock().unwrap().moves.clone()
    }

    pub fn invites(&self) -> Vec<Invite> {
        self.state.lock().unwrap().invites.clone()
    }

    pub fn share_status(&self, path: &str) -> Option<i64> {
        self.state
            .lock()
            .unwrap()
            .shares
            .get(path)
            .map(|info| info.status)
    }
}

#[async_trait]
impl RemoteStorageApi for FakeRemote {
    async fn list_directory(&self, prefix: &str) -> Result<Vec<RemoteEntry>> {
        let mut state = self.state.lock().unwrap();
        state.bump("list_directory");
        state.listed.push(prefix.to_string());

        let mut entries: Vec<RemoteEntry> = state
            .folders
            .iter()
            .filter(|f| parent_key(f) == prefix)
            .map(|f| RemoteEntry::Subdir(SubdirRef::new(f.as_str())))
            .collect();
        entries.extend(
            state
                .files
                .iter()
                .filter(|(path, _)| parent_key(path) == prefix)
                .map(|(path, file)| RemoteEntry::File(record(path, file.size, &file.content_type))),
        );
        if let Some(extra) = state.extra.get(prefix) {
            entries.extend(extra.iter().cloned());
        }
        Ok(entries)
    }

    async fn download_stream(&self, path: &str, _file_name: &str, _size: u64) -> Result<ByteStream> {
        let mut state = self.state.lock().unwrap();
        state.bump("download_stream");
        let file = state
            .files
            .get(path)
            .cloned()
            .ok_or(BlompError::HttpError(404))?;
        let chunks: Vec<Result<Bytes>> = file
            .content
            .chunks(4)
            .map(|chunk| Ok(Bytes::copy_from_slice(chunk)))
            .collect();
        Ok(stream::iter(chunks).boxed())
    }

    async fn upload_multipart(&self, request: UploadRequest) -> Result<()> {
        let fail = {
            let mut state = self.state.lock().unwrap();
            state.bump("upload_multipart");
            state.fail_uploads
        };

        let mut content = Vec::new();
        let mut body = request.content;
        while let Some(chunk) = body.next().await {
            content.extend_from_slice(&chunk?);
        }
        if fail {
            return Err(BlompError::HttpError(500));
        }

        let mut state = self.state.lock().unwrap();
        state.files.insert(
            format!("{}{}", request.folder, request.file_name),
            StoredFile {
                size: content.len() as u64,
                content,
                content_type: request.mime_type,
            },
        );
        Ok(())
    }

    async fn rename_entry(
        &self,
        original_name: &str,
        kind: EntryKind,
        new_name: &str,
        parent_path: &str,
    ) -> Result<Outcome> {
        let mut state = self.state.lock().unwrap();
        state.bump("rename_entry");
        match kind {
            EntryKind::File => {
                let old = format!("{}{}", parent_path, original_name);
                match state.files.remove(&old) {
                    Some(file) => {
                        state.files.insert(format!("{}{}", parent_path, new_name), file);
                        Ok(Outcome::Success)
                    }
                    None => Ok(Outcome::Failure("not found".to_string())),
                }
            }
            EntryKind::Folder => {
                // The folder endpoint takes the folder's own key as `path`.
                if !state.folders.contains(parent_path) {
                    return Ok(Outcome::Failure("not found".to_string()));
                }
                let new_key = format!("{}{}/", parent_key(parent_path), new_name);
                state.relocate(parent_path, &new_key, false);
                Ok(Outcome::Success)
            }
        }
    }

    async fn delete_file(&self, path: &str) -> Result<bool> {
        let mut state = self.state.lock().unwrap();
        state.bump("delete_file");
        Ok(state.files.remove(path).is_some())
    }

    async fn delete_folder(&self, path: &str) -> Result<bool> {
        let mut state = self.state.lock().unwrap();
        state.bump("delete_folder");
        let existed = state.folders.contains(path);
        state.folders.retain(|f| !f.starts_with(path));
        state.files.retain(|f, _| !f.starts_with(path));
        Ok(existed)
    }

    async fn move_or_copy(&self, request: MoveRequest) -> Result<Outcome> {
        let mut state = self.state.lock().unwrap();
        state.bump("move_or_copy");
        state.moves.push(request.clone());
        if let Some(limit) = state.fail_moves_after {
            if state.moves.len() > limit {
                return Ok(Outcome::Failure("error".to_string()));
            }
        }

        let copy = request.action == MoveAction::Copy;
        match request.kind {
            EntryKind::File => {
                let stored = if copy {
                    state.files.get(&request.original_path).cloned()
                } else {
                    state.files.remove(&request.original_path)
                };
                let Some(stored) = stored else {
                    return Ok(Outcome::Failure("not found".to_string()));
                };
                state
                    .files
                    .insert(format!("{}{}", request.target_path, request.file_name), stored);
            }
            EntryKind::Folder => {
                if !state.folders.contains(&request.original_path) {
                    return Ok(Outcome::Failure("not found".to_string()));
                }
                let new_key = format!(
                    "{}{}/",
                    request.target_path,
                    last_component(&request.original_path)
                );
                state.relocate(&request.original_path, &new_key, copy);
            }
        }
        Ok(Outcome::Success)
    }

    async fn create_folder(&self, parent_path: &str, name: &str) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.bump("create_folder");
        state.ensure_folders(&format!("{}{}/", parent_path, name));
        Ok(())
    }

    async fn fetch_share_link(&self, path: &str, size: u64) -> Result<ShareInfo> {
        let mut state = self.state.lock().unwrap();
        state.bump("fetch_share_link");
        if let Some(info) = state.shares.get(path) {
            return Ok(info.clone());
        }
        state.next_share_id += 1;
        let id = state.next_share_id;
        let info = ShareInfo {
            id,
            link: format!("slug{}", id),
            status: 0,
            permission: 0,
            container: None,
            path: Some(path.to_string()),
            size: Some(size),
        };
        state.shares.insert(path.to_string(), info.clone());
        Ok(info)
    }

    async fn send_share_invite(
        &self,
        emails: &[String],
        link: &str,
        permission: SharePermission,
    ) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.bump("send_share_invite");
        state.invites.push(Invite {
            emails: emails.to_vec(),
            link: link.to_string(),
            permission,
        });
        Ok(())
    }

    async fn set_share_status(&self, id: u64, enabled: bool) -> Result<Outcome> {
        let mut state = self.state.lock().unwrap();
        state.bump("set_share_status");
        if state.fail_switch {
            return Ok(Outcome::Failure("error".to_string()));
        }
        for info in state.shares.values_mut() {
            if info.id == id {
                info.status = i64::from(enabled);
            }
        }
        Ok(Outcome::Success)
    }

    fn share_link(&self, slug: &str) -> String {
        format!("https://sharedby.blomp.com/{}", slug)
    }
}

/// Open a drive over `remote` with its root listed.
pub async fn open(remote: &Arc<FakeRemote>) -> Drive {
    Drive::open(remote.clone()).await.unwrap()
}
