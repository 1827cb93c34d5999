//! HTTP client with timeout, bearer auth and error normalization.

use super::error::{ApiError, Result};
use crate::config::{ClientConfig, ConfigError, DEFAULT_TIMEOUT};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::Method;
use serde::{de::DeserializeOwned, Serialize};
use std::sync::{Arc, RwLock};
use std::time::{Duration, Instant};

/// JSON-over-HTTP client for a REST API.
///
/// Every request carries the default JSON headers plus a bearer token when
/// one is set, and is aborted once the timeout elapses. All failures come
/// back as [`ApiError`].
///
/// # Examples
///
/// ```rust,no_run
/// use optimist_client::ApiClient;
/// use optimist_engine::User;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = ApiClient::builder()
///     .base_url("http://localhost:3001/api")
///     .timeout(std::time::Duration::from_secs(5))
///     .build()?;
///
/// let users: Vec<User> = client.get("/users").await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct ApiClient {
    base_url: String,
    http: reqwest::Client,
    timeout: Duration,
    auth_token: Arc<RwLock<Option<String>>>,
}

impl ApiClient {
    /// Create a new builder for configuring the client.
    pub fn builder() -> ApiClientBuilder {
        ApiClientBuilder::new()
    }

    /// Build a client from loaded configuration.
    pub fn from_config(config: &ClientConfig) -> std::result::Result<Self, ConfigError> {
        let mut builder = Self::builder()
            .base_url(config.api_url.clone())
            .timeout(config.timeout);
        if let Some(token) = &config.auth_token {
            builder = builder.auth_token(token.clone());
        }
        builder.build()
    }

    /// Base URL request paths are appended to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Per-request timeout.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Set or clear the bearer token for subsequent requests.
    ///
    /// Shared by every clone of this client.
    pub fn set_auth_token(&self, token: Option<String>) {
        let mut slot = match self.auth_token.write() {
            Ok(slot) => slot,
            Err(poisoned) => poisoned.into_inner(),
        };
        *slot = token;
    }

    fn current_token(&self) -> Option<String> {
        match self.auth_token.read() {
            Ok(slot) => slot.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// GET `path`.
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.send(Method::GET, path, None::<&()>, None::<&()>).await
    }

    /// GET `path` with query parameters. Absent (`None`) values are skipped.
    pub async fn get_with<T, Q>(&self, path: &str, query: &Q) -> Result<T>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
    {
        self.send(Method::GET, path, Some(query), None::<&()>).await
    }

    /// POST a JSON body to `path`.
    pub async fn post<T, B>(&self, path: &str, body: &B) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.send(Method::POST, path, None::<&()>, Some(body)).await
    }

    /// PUT a JSON body to `path`.
    pub async fn put<T, B>(&self, path: &str, body: &B) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.send(Method::PUT, path, None::<&()>, Some(body)).await
    }

    /// PATCH a JSON body to `path`.
    pub async fn patch<T, B>(&self, path: &str, body: &B) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.send(Method::PATCH, path, None::<&()>, Some(body)).await
    }

    /// DELETE `path`. An empty response body decodes as `null`, so `T = ()`
    /// accepts a bare 204.
    pub async fn delete<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.send(Method::DELETE, path, None::<&()>, None::<&()>).await
    }

    async fn send<T, Q, B>(
        &self,
        method: Method,
        path: &str,
        query: Option<&Q>,
        body: Option<&B>,
    ) -> Result<T>
    where
        T: DeserializeOwned,
        Q: Serialize + ?Sized,
        B: Serialize + ?Sized,
    {
        let url = format!("{}{}", self.base_url, path);
        let mut request = self.http.request(method.clone(), &url);
        if let Some(query) = query {
            request = request.query(query);
        }
        if let Some(token) = self.current_token() {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let start = Instant::now();
        tracing::debug!(%method, %url, "sending request");

        let exchange = async {
            let response = request.send().await?;
            decode(response).await
        };

        let result = match tokio::time::timeout(self.timeout, exchange).await {
            Ok(result) => result,
            Err(_) => Err(ApiError::Timeout),
        };

        match &result {
            Ok(_) => tracing::debug!(%method, %url, elapsed = ?start.elapsed(), "request succeeded"),
            Err(e) => tracing::warn!(
                %method,
                %url,
                status = e.status(),
                elapsed = ?start.elapsed(),
                error = %e,
                "request failed"
            ),
        }

        result
    }
}

/// Non-2xx responses become [`ApiError::Status`]. The fallback message uses
/// the canonical reason phrase for the status code; reqwest does not expose
/// a custom phrase the server may have sent.
async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    let status = response.status();
    let bytes = response.bytes().await?;

    if !status.is_success() {
        let reason = status.canonical_reason().unwrap_or("Unknown Status");
        return Err(ApiError::from_response(status.as_u16(), reason, &bytes));
    }

    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(serde_json::from_value(serde_json::Value::Null)?);
    }
    Ok(serde_json::from_slice(&bytes)?)
}

/// Builder for configuring [`ApiClient`] instances.
#[derive(Debug)]
pub struct ApiClientBuilder {
    base_url: String,
    timeout: Duration,
    auth_token: Option<String>,
}

impl ApiClientBuilder {
    fn new() -> Self {
        Self {
            base_url: crate::config::DEFAULT_API_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
            auth_token: None,
        }
    }

    /// Set the base URL for the API.
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the per-request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the initial bearer token.
    pub fn auth_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
        self
    }

    /// Build the client.
    pub fn build(self) -> std::result::Result<ApiClient, ConfigError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .pool_idle_timeout(Duration::from_secs(90))
            .build()?;

        Ok(ApiClient {
            base_url: self.base_url,
            http,
            timeout: self.timeout,
            auth_token: Arc::new(RwLock::new(self.auth_token)),
        })
    }
}
