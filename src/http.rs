//! HTTP client wrapper for dashboard requests.

use std::sync::Arc;

use reqwest::cookie::Jar;
use reqwest::header::{HeaderMap, HeaderValue, REFERER, USER_AGENT};
use reqwest::redirect::Policy;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::config::ClientConfig;
use crate::error::{BlompError, Result};

/// HTTP client for making requests to the dashboard.
///
/// Two reqwest clients share one cookie jar: the default one follows
/// redirects, the other does not (the share-invite form answers with a
/// redirect that must not be followed).
#[derive(Debug, Clone)]
pub struct HttpClient {
    client: Client,
    no_redirect: Client,
    config: Arc<ClientConfig>,
}

impl HttpClient {
    /// Create a new HTTP client from `config`.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let jar = Arc::new(Jar::default());
        let client = Self::builder(&config, jar.clone())?
            .build()
            .map_err(|e| BlompError::InvalidResponse(format!("Failed to build client: {}", e)))?;
        let no_redirect = Self::builder(&config, jar)?
            .redirect(Policy::none())
            .build()
            .map_err(|e| BlompError::InvalidResponse(format!("Failed to build client: {}", e)))?;

        Ok(Self {
            client,
            no_redirect,
            config: Arc::new(config),
        })
    }

    fn builder(config: &ClientConfig, jar: Arc<Jar>) -> Result<reqwest::ClientBuilder> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&config.user_agent)
                .map_err(|e| BlompError::Validation(format!("Invalid user agent: {}", e)))?,
        );
        headers.insert(
            REFERER,
            HeaderValue::from_str(&config.referer)
                .map_err(|e| BlompError::Validation(format!("Invalid referer: {}", e)))?,
        );

        let mut builder = Client::builder()
            .cookie_provider(jar)
            .default_headers(headers);

        if let Some(proxy) = &config.proxy {
            let proxy = reqwest::Proxy::all(proxy)
                .map_err(|e| BlompError::Validation(format!("Invalid proxy: {}", e)))?;
            builder = builder.proxy(proxy);
        }

        Ok(builder)
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// GET `endpoint` with query parameters and return the body as text.
    pub async fn get_text(&self, endpoint: &str, query: &[(&str, String)]) -> Result<String> {
        let url = self.config.url(endpoint);
        debug!(%url, "GET");
        let response = self.timed(self.client.get(&url).query(query)).send().await?;
        Self::text(response).await
    }

    /// GET `endpoint` with query parameters and decode the JSON body.
    pub async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        query: &[(&str, String)],
    ) -> Result<T> {
        let body = self.get_text(endpoint, query).await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// GET `endpoint` without a timeout, for streamed bodies.
    pub async fn get_stream(&self, endpoint: &str, query: &[(&str, String)]) -> Result<Response> {
        let url = self.config.url(endpoint);
        debug!(%url, "GET (stream)");
        let response = self.client.get(&url).query(query).send().await?;
        Self::check_status(response)
    }

    /// POST a urlencoded form and return the raw response.
    ///
    /// The status is not checked: the login flow inspects the final URL
    /// and status itself.
    pub async fn post_form_raw(&self, endpoint: &str, form: &[(&str, String)]) -> Result<Response> {
        let url = self.config.url(endpoint);
        debug!(%url, "POST");
        Ok(self.timed(self.client.post(&url).form(form)).send().await?)
    }

    /// POST a urlencoded form and return the body as text.
    pub async fn post_form(&self, endpoint: &str, form: &[(&str, String)]) -> Result<String> {
        let response = self.post_form_raw(endpoint, form).await?;
        Self::text(response).await
    }

    /// POST a urlencoded form without following redirects.
    pub async fn post_form_no_redirect(&self, endpoint: &str, form: &[(&str, String)]) -> Result<()> {
        let url = self.config.url(endpoint);
        debug!(%url, "POST (no redirect)");
        let response = self.timed(self.no_redirect.post(&url).form(form)).send().await?;
        let status = response.status();
        if status.is_client_error() || status.is_server_error() {
            return Err(BlompError::HttpError(status.as_u16()));
        }
        Ok(())
    }

    /// POST a multipart form without a timeout and return the body as text.
    pub async fn post_multipart(
        &self,
        endpoint: &str,
        form: reqwest::multipart::Form,
    ) -> Result<String> {
        let url = self.config.url(endpoint);
        debug!(%url, "POST (multipart)");
        let response = self.client.post(&url).multipart(form).send().await?;
        Self::text(response).await
    }

    fn timed(&self, request: RequestBuilder) -> RequestBuilder {
        request.timeout(self.config.request_timeout)
    }

    fn check_status(response: Response) -> Result<Response> {
        if !response.status().is_success() {
            return Err(BlompError::HttpError(response.status().as_u16()));
        }
        Ok(response)
    }

    async fn text(response: Response) -> Result<String> {
        let response = Self::check_status(response)?;
        let body = response.text().await?;
        debug!(bytes = body.len(), "response");
        Ok(body)
    }
}
