//! Authenticated dashboard session.

use std::fmt;
use std::sync::Arc;

use tracing::{info, warn};

use super::auth::{authorize, fetch_account_stats, AccountStats};
use crate::api::{DashboardClient, RemoteStorageApi};
use crate::config::ClientConfig;
use crate::error::Result;
use crate::fs::Drive;
use crate::http::HttpClient;

/// A logged-in account.
///
/// Holds the storage API shared by every [`Drive`] opened from it and the
/// account figures scraped at login.
///
/// # Example
/// ```no_run
/// use blomplib::RemoteSession;
///
/// # async fn example() -> blomplib::Result<()> {
/// let session = RemoteSession::login("user@example.com", "password").await?;
/// if let Some(used) = &session.account_stats().used_storage {
///     println!("Using {}", used);
/// }
/// let drive = session.get_root_directory().await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct RemoteSession {
    api: Arc<dyn RemoteStorageApi>,
    stats: AccountStats,
}

impl RemoteSession {
    /// Log in with the default configuration.
    pub async fn login(email: &str, password: &str) -> Result<Self> {
        Self::login_with_config(email, password, ClientConfig::default()).await
    }

    /// Log in with a custom configuration (proxy, browser, endpoints).
    ///
    /// Failing to read the account figures does not fail the login; the
    /// figures are then all `None`.
    pub async fn login_with_config(email: &str, password: &str, config: ClientConfig) -> Result<Self> {
        let http = HttpClient::new(config)?;
        let context = authorize(&http, email, password).await?;

        let stats = match fetch_account_stats(&http).await {
            Ok(stats) => stats,
            Err(e) => {
                warn!(error = %e, "could not read account figures");
                AccountStats::default()
            }
        };
        info!(client_id = context.client_id, "logged in");

        Ok(Self {
            api: Arc::new(DashboardClient::new(http, context)),
            stats,
        })
    }

    /// Wrap an existing storage API, e.g. an in-memory one.
    pub fn with_api(api: Arc<dyn RemoteStorageApi>) -> Self {
        Self {
            api,
            stats: AccountStats::default(),
        }
    }

    pub fn api(&self) -> &Arc<dyn RemoteStorageApi> {
        &self.api
    }

    pub fn account_stats(&self) -> &AccountStats {
        &self.stats
    }

    /// Open the account's root folder, listed.
    pub async fn get_root_directory(&self) -> Result<Drive> {
        Drive::open(self.api.clone()).await
    }
}

impl fmt::Debug for RemoteSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RemoteSession")
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}
