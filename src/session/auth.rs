//! Dashboard login and account page scraping.

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::api::SessionContext;
use crate::error::{BlompError, Result};
use crate::http::HttpClient;

const AUTHORIZE_ENDPOINT: &str = "/authorize";
const DASHBOARD_INDEX_ENDPOINT: &str = "/dashboard/index";

static TOKEN_RE: LazyLock<Regex> =
    LazyLock::new(|| pattern(r#"<meta name="csrf_token" content="([^"]+)" />"#));
static CLIENT_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| pattern(r#"<input type="hidden" id="clientId" value="(\d+)">"#));
static USED_STORAGE_RE: LazyLock<Regex> = LazyLock::new(|| pattern(r"<h5>Used Storage: (.+)</h5>"));
static AVAILABLE_STORAGE_RE: LazyLock<Regex> =
    LazyLock::new(|| pattern(r"<h5>Available Storage: (.+)</h5>"));
static STORAGE_CAPACITY_RE: LazyLock<Regex> =
    LazyLock::new(|| pattern(r"Storage Capacity:\s*(.+?)</h5>"));
static SHARED_FILES_RE: LazyLock<Regex> = LazyLock::new(|| pattern(r"<h5>Shared Files: (.+)</h5>"));
static FILES_AND_FOLDERS_RE: LazyLock<Regex> =
    LazyLock::new(|| pattern(r"<h5>Files & Folders: (.+)</h5>"));

/// Compile one of the fixed scraping patterns above.
fn pattern(raw: &str) -> Regex {
    Regex::new(raw).unwrap_or_else(|e| panic!("invalid scraping pattern {:?}: {}", raw, e))
}

/// Account figures shown on the dashboard home page.
///
/// Each field is `None` when the page did not contain it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccountStats {
    /// Used storage as rendered, e.g. `"1.5 GB"`.
    pub used_storage: Option<String>,
    pub available_storage: Option<String>,
    pub storage_capacity: Option<String>,
    pub shared_files: Option<u64>,
    pub files_and_folders: Option<u64>,
}

/// Log in and scrape the session credentials from the landing page.
///
/// A failed login redirects back to the dashboard origin.
pub(crate) async fn authorize(http: &HttpClient, email: &str, password: &str) -> Result<SessionContext> {
    let form = [("email", email.to_string()), ("password", password.to_string())];
    let response = http.post_form_raw(AUTHORIZE_ENDPOINT, &form).await?;

    let base_url = http.config().base_url.trim_end_matches('/');
    if response.url().as_str().trim_end_matches('/') == base_url {
        return Err(BlompError::Auth("Incorrect email or password".to_string()));
    }
    let status = response.status();
    if status.is_client_error() || status.is_server_error() {
        return Err(BlompError::Auth(format!(
            "Login returned status code {}",
            status.as_u16()
        )));
    }

    let page = response.text().await?;
    let context = parse_login_page(&page)?;
    debug!(client_id = context.client_id, "authorized");
    Ok(context)
}

/// Fetch the dashboard home page and read the account figures.
pub(crate) async fn fetch_account_stats(http: &HttpClient) -> Result<AccountStats> {
    let page = http.get_text(DASHBOARD_INDEX_ENDPOINT, &[]).await?;
    Ok(parse_account_stats(&page))
}

pub(crate) fn parse_login_page(page: &str) -> Result<SessionContext> {
    let token = capture(&TOKEN_RE, page)
        .ok_or_else(|| BlompError::Auth("CSRF token not found on the login page".to_string()))?;
    let client_id = capture(&CLIENT_ID_RE, page)
        .and_then(|id| id.parse().ok())
        .ok_or_else(|| BlompError::Auth("Client id not found on the login page".to_string()))?;
    Ok(SessionContext { token, client_id })
}

pub(crate) fn parse_account_stats(page: &str) -> AccountStats {
    AccountStats {
        used_storage: capture(&USED_STORAGE_RE, page),
        available_storage: capture(&AVAILABLE_STORAGE_RE, page),
        storage_capacity: capture(&STORAGE_CAPACITY_RE, page)
            .map(|s| s.trim().to_string()),
        shared_files: capture(&SHARED_FILES_RE, page).and_then(|s| parse_count(&s)),
        files_and_folders: capture(&FILES_AND_FOLDERS_RE, page)
            .and_then(|s| parse_count(&s)),
    }
}

fn capture(re: &Regex, haystack: &str) -> Option<String> {
    re.captures(haystack)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

fn parse_count(raw: &str) -> Option<u64> {
    raw.trim().replace(',', "").parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    const LOGIN_PAGE: &str = r#"<html><head>
<meta name="csrf_token" content="Xy12abCD34" />
</head><body>
<input type="hidden" id="clientId" value="48213">
</body></html>"#;

    const INDEX_PAGE: &str = r#"<div class="stats">
<h5>Used Storage: 1.2 GB</h5>
<h5>Available Storage: 38.8 GB</h5>
<h5>Storage Capacity:
  40 GB</h5>
<h5>Shared Files: 3</h5>
<h5>Files & Folders: 1,204</h5>
</div>"#;

    #[test]
    fn test_patterns_compile() {
        for re in [
            &TOKEN_RE,
            &CLIENT_ID_RE,
            &USED_STORAGE_RE,
            &AVAILABLE_STORAGE_RE,
            &STORAGE_CAPACITY_RE,
            &SHARED_FILES_RE,
            &FILES_AND_FOLDERS_RE,
        ] {
            assert_eq!(LazyLock::force(re).captures_len(), 2);
        }
    }

    #[test]
    fn test_parse_login_page() {
        let context = parse_login_page(LOGIN_PAGE).unwrap();
        assert_eq!(context.token, "Xy12abCD34");
        assert_eq!(context.client_id, 48213);
    }

    #[test]
    fn test_parse_login_page_missing_token() {
        let page = r#"<input type="hidden" id="clientId" value="1">"#;
        assert!(matches!(parse_login_page(page), Err(BlompError::Auth(_))));
    }

    #[test]
    fn test_parse_login_page_missing_client_id() {
        let page = r#"<meta name="csrf_token" content="abc" />"#;
        assert!(matches!(parse_login_page(page), Err(BlompError::Auth(_))));
    }

    #[test]
    fn test_parse_account_stats() {
        let stats = parse_account_stats(INDEX_PAGE);
        assert_eq!(stats.used_storage.as_deref(), Some("1.2 GB"));
        assert_eq!(stats.available_storage.as_deref(), Some("38.8 GB"));
        assert_eq!(stats.storage_capacity.as_deref(), Some("40 GB"));
        assert_eq!(stats.shared_files, Some(3));
        assert_eq!(stats.files_and_folders, Some(1204));
    }

    #[test]
    fn test_parse_account_stats_partial() {
        let stats = parse_account_stats("<h5>Shared Files: 7</h5>");
        assert_eq!(stats.shared_files, Some(7));
        assert_eq!(stats.used_storage, None);
        assert_eq!(stats.files_and_folders, None);
    }
}
