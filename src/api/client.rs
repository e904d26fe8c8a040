//! Dashboard client with request/response handling.

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::multipart::{Form, Part};
use reqwest::Body;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

use super::storage::RemoteStorageApi;
use super::types::{
    ByteStream, EntryKind, MoveRequest, Outcome, RemoteEntry, SharePermission, ShareInfo,
    UploadRequest,
};
use crate::error::{BlompError, Result};
use crate::http::HttpClient;

const LIST_ENDPOINT: &str = "/dashboard/folder";
const DOWNLOAD_ENDPOINT: &str = "/dashboard/storage/download_object";
const UPLOAD_ENDPOINT: &str = "/dashboard/storage/upload_object";
const RENAME_ENDPOINT: &str = "/dashboard/file/rename";
const DELETE_FILE_ENDPOINT: &str = "/dashboard/storage/delete_object";
const DELETE_FOLDER_ENDPOINT: &str = "/dashboard/storage/delete_folder";
const MOVE_ENDPOINT: &str = "/dashboard/file/move";
const CREATE_FOLDER_ENDPOINT: &str = "/dashboard/storage/create_folder";
const SHARE_LINK_ENDPOINT: &str = "/dashboard/file/share/link";
const SHARE_SEND_ENDPOINT: &str = "/dashboard/file/share/send";
const SHARE_SWITCH_ENDPOINT: &str = "/dashboard/file/share/switch";

/// Credentials scraped from the dashboard after login.
///
/// Immutable for the lifetime of a session and shared by every request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionContext {
    /// CSRF token sent as `_token` with form posts.
    pub token: String,
    /// Numeric client identifier sent with uploads.
    pub client_id: u64,
}

#[derive(Deserialize)]
struct ListingResponse {
    data: Vec<RemoteEntry>,
}

#[derive(Deserialize)]
struct DeleteResponse {
    response: Value,
}

#[derive(Deserialize)]
struct ShareLinkResponse {
    info: ShareInfo,
}

/// [`RemoteStorageApi`] over the dashboard's HTTP endpoints.
#[derive(Debug, Clone)]
pub struct DashboardClient {
    http: HttpClient,
    context: SessionContext,
}

impl DashboardClient {
    /// Wrap an authenticated HTTP client.
    pub fn new(http: HttpClient, context: SessionContext) -> Self {
        Self { http, context }
    }

    pub fn context(&self) -> &SessionContext {
        &self.context
    }

    pub fn http(&self) -> &HttpClient {
        &self.http
    }
}

/// Render recipients the way the dashboard form expects: `['a@x','b@y']`.
pub(crate) fn format_recipients(emails: &[String]) -> String {
    if emails.is_empty() {
        return String::new();
    }
    let quoted: Vec<String> = emails.iter().map(|e| format!("'{}'", e)).collect();
    format!("[{}]", quoted.join(","))
}

/// Truthiness of the `response` field of delete calls.
fn response_flag(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(false),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
        Value::Null => false,
    }
}

#[async_trait]
impl RemoteStorageApi for DashboardClient {
    async fn list_directory(&self, prefix: &str) -> Result<Vec<RemoteEntry>> {
        let listing: ListingResponse = self
            .http
            .get_json(LIST_ENDPOINT, &[("prefix", prefix.to_string())])
            .await?;
        debug!(prefix, entries = listing.data.len(), "listed folder");
        Ok(listing.data)
    }

    async fn download_stream(
        &self,
        path: &str,
        file_name: &str,
        size: u64,
    ) -> Result<ByteStream> {
        let response = self
            .http
            .get_stream(
                DOWNLOAD_ENDPOINT,
                &[
                    ("path", path.to_string()),
                    ("filename", file_name.to_string()),
                    ("size", size.to_string()),
                ],
            )
            .await?;
        Ok(response
            .bytes_stream()
            .map(|chunk| chunk.map_err(BlompError::from))
            .boxed())
    }

    async fn upload_multipart(&self, request: UploadRequest) -> Result<()> {
        let size = request.size.to_string();
        let file_part = Part::stream_with_length(Body::wrap_stream(request.content), request.size)
            .file_name(request.file_name.clone())
            .mime_str(&request.mime_type)?;

        let form = Form::new()
            .text("dzUuid", request.upload_id.to_string())
            .text("dzChunkIndex", "0")
            .text("dzTotalFileSize", size.clone())
            .text("dzCurrentChunkSize", size)
            .text("dzTotalChunkCount", "1")
            .text("dzChunkByteOffset", "0")
            .text("dzChunkSize", (request.size + 1).to_string())
            .text("dzFilename", request.file_name.clone())
            .text("folder", request.folder.clone())
            .text("sub_folder", "")
            .text("_token", self.context.token.clone())
            .text("client-id", self.context.client_id.to_string())
            .text("pseudo-folder", request.folder)
            .part("myfile", file_part);

        let body = self.http.post_multipart(UPLOAD_ENDPOINT, form).await?;
        debug!(file = %request.file_name, response = %body, "upload finished");
        Ok(())
    }

    async fn rename_entry(
        &self,
        original_name: &str,
        kind: EntryKind,
        new_name: &str,
        parent_path: &str,
    ) -> Result<Outcome> {
        let body = self
            .http
            .get_text(
                RENAME_ENDPOINT,
                &[
                    ("original_name", original_name.to_string()),
                    ("type", kind.as_str().to_string()),
                    ("name", new_name.to_string()),
                    ("path", parent_path.to_string()),
                ],
            )
            .await?;
        Ok(Outcome::from_body(body))
    }

    async fn delete_file(&self, path: &str) -> Result<bool> {
        let response: DeleteResponse = self
            .http
            .get_json(DELETE_FILE_ENDPOINT, &[("path", path.to_string())])
            .await?;
        Ok(response_flag(&response.response))
    }

    async fn delete_folder(&self, path: &str) -> Result<bool> {
        let response: DeleteResponse = self
            .http
            .get_json(DELETE_FOLDER_ENDPOINT, &[("folder", path.to_string())])
            .await?;
        Ok(response_flag(&response.response))
    }

    async fn move_or_copy(&self, request: MoveRequest) -> Result<Outcome> {
        let body = self
            .http
            .get_text(
                MOVE_ENDPOINT,
                &[
                    ("original_path", request.original_path),
                    ("action", request.action.as_str().to_string()),
                    ("target_path", request.target_path),
                    ("file_name", request.file_name),
                    ("type", request.kind.as_str().to_string()),
                ],
            )
            .await?;
        Ok(Outcome::from_body(body))
    }

    async fn create_folder(&self, parent_path: &str, name: &str) -> Result<()> {
        self.http
            .post_form(
                CREATE_FOLDER_ENDPOINT,
                &[
                    ("_token", self.context.token.clone()),
                    ("pseudo-folder", parent_path.to_string()),
                    ("folder_name", format!("{}/", name)),
                ],
            )
            .await?;
        Ok(())
    }

    async fn fetch_share_link(&self, path: &str, size: u64) -> Result<ShareInfo> {
        let response: ShareLinkResponse = self
            .http
            .get_json(
                SHARE_LINK_ENDPOINT,
                &[("path", path.to_string()), ("size", size.to_string())],
            )
            .await?;
        Ok(response.info)
    }

    async fn send_share_invite(
        &self,
        emails: &[String],
        link: &str,
        permission: SharePermission,
    ) -> Result<()> {
        self.http
            .post_form_no_redirect(
                SHARE_SEND_ENDPOINT,
                &[
                    ("_token", self.context.token.clone()),
                    ("email", format_recipients(emails)),
                    ("link", link.to_string()),
                    ("permission", (permission as u8).to_string()),
                ],
            )
            .await
    }

    async fn set_share_status(&self, id: u64, enabled: bool) -> Result<Outcome> {
        let body = self
            .http
            .get_text(
                SHARE_SWITCH_ENDPOINT,
                &[
                    ("status", u8::from(enabled).to_string()),
                    ("id", id.to_string()),
                ],
            )
            .await?;
        Ok(Outcome::from_body(body))
    }

    fn share_link(&self, slug: &str) -> String {
        self.http.config().share_link(slug)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClientConfig;

    #[test]
    fn test_format_recipients() {
        assert_eq!(format_recipients(&[]), "");
        assert_eq!(
            format_recipients(&["a@x.com".to_string(), "b@y.org".to_string()]),
            "['a@x.com','b@y.org']"
        );
    }

    #[test]
    fn test_response_flag() {
        assert!(response_flag(&Value::Bool(true)));
        assert!(response_flag(&serde_json::json!(1)));
        assert!(!response_flag(&serde_json::json!(0)));
        assert!(!response_flag(&Value::Null));
    }

    #[test]
    fn test_share_link_uses_config() {
        let http = HttpClient::new(ClientConfig::default()).unwrap();
        let client = DashboardClient::new(
            http,
            SessionContext {
                token: "t".to_string(),
                client_id: 1,
            },
        );
        assert_eq!(client.share_link("xyz"), "https://sharedby.blomp.com/xyz");
        assert_eq!(client.context().client_id, 1);
    }
}
