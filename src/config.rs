//! Client configuration.

use std::time::Duration;

use crate::user_agent::{user_agent, Browser};

/// Dashboard origin used by the official web client.
pub const DEFAULT_BASE_URL: &str = "https://dashboard.blomp.com";

/// Origin of public share links.
pub const DEFAULT_SHARE_BASE_URL: &str = "https://sharedby.blomp.com";

/// Referer the dashboard expects on the login form.
pub const DEFAULT_REFERER: &str = "https://www.blomp.com/";

/// Settings for [`crate::api::DashboardClient`] and the login flow.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Dashboard origin, without trailing slash.
    pub base_url: String,
    /// Origin prepended to share-link slugs.
    pub share_base_url: String,
    pub user_agent: String,
    pub referer: String,
    /// Optional HTTP(S)/SOCKS proxy URL.
    pub proxy: Option<String>,
    /// Timeout for request/response calls. Transfers are not limited.
    pub request_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            share_base_url: DEFAULT_SHARE_BASE_URL.to_string(),
            user_agent: user_agent(Browser::default()).to_string(),
            referer: DEFAULT_REFERER.to_string(),
            proxy: None,
            request_timeout: Duration::from_secs(30),
        }
    }
}

impl ClientConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_share_base_url(mut self, share_base_url: impl Into<String>) -> Self {
        self.share_base_url = share_base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Impersonate a different browser.
    pub fn with_browser(mut self, browser: Browser) -> Self {
        self.user_agent = user_agent(browser).to_string();
        self
    }

    pub fn with_proxy(mut self, proxy: impl Into<String>) -> Self {
        self.proxy = Some(proxy.into());
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub(crate) fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.base_url, endpoint)
    }

    /// Public link for a server-issued share slug.
    pub(crate) fn share_link(&self, slug: &str) -> String {
        format!("{}/{}", self.share_base_url, slug)
    }
}
