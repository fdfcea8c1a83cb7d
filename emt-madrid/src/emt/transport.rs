//! HTTP transport for the EMT API.
//!
//! Issues one request against the configured base URL and hands back the
//! parsed JSON body. Response codes inside the body are not inspected here.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde_json::Value;
use tokio::sync::Semaphore;
use tracing::debug;

use super::endpoints::HttpMethod;
use super::error::TransportError;

/// Default base URL for the EMT MobilityLabs API.
pub const DEFAULT_BASE_URL: &str = "https://openapi.emtmadrid.es/";

/// Default per-request timeout in seconds.
const DEFAULT_TIMEOUT_SECS: u64 = 10;

/// Default maximum concurrent requests.
const DEFAULT_MAX_CONCURRENT: usize = 10;

/// Configuration for the HTTP transport.
#[derive(Debug, Clone)]
pub struct EmtConfig {
    /// Base URL for the API (defaults to production EMT)
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Maximum concurrent requests
    pub max_concurrent: usize,
}

impl EmtConfig {
    /// Set a custom base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Set maximum concurrent requests.
    pub fn with_max_concurrent(mut self, n: usize) -> Self {
        self.max_concurrent = n;
        self
    }
}

impl Default for EmtConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            max_concurrent: DEFAULT_MAX_CONCURRENT,
        }
    }
}

/// One request to the API.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: HttpMethod,
    /// Path relative to the base URL.
    pub path: String,
    pub params: Vec<(String, String)>,
    pub body: Option<Value>,
    pub headers: HeaderMap,
}

impl ApiRequest {
    pub fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            params: Vec::new(),
            body: None,
            headers: HeaderMap::new(),
        }
    }

    /// Add a query parameter.
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.push((key.into(), value.into()));
        self
    }

    /// Set a JSON body.
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Set a header, replacing any previous value under the same name.
    ///
    /// Header names are case-insensitive.
    pub fn with_header(mut self, name: &str, value: &str) -> Result<Self, TransportError> {
        self.set_header(name, value)?;
        Ok(self)
    }

    /// Set a header in place, replacing any previous value under the same name.
    pub fn set_header(&mut self, name: &str, value: &str) -> Result<(), TransportError> {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|_| TransportError::InvalidHeader(format!("name {name:?}")))?;
        // The value may be a credential, so keep it out of the error.
        let value = HeaderValue::from_str(value)
            .map_err(|_| TransportError::InvalidHeader(format!("value for {name}")))?;
        self.headers.insert(name, value);
        Ok(())
    }

    /// Read a header back as a string.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }
}

/// Something that can perform a single API exchange.
///
/// [`HttpTransport`] is the production implementation. Tests substitute
/// scripted transports that never touch the network.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Perform the request and return the parsed JSON body.
    ///
    /// Fails on non-2xx statuses, timeouts and unparseable bodies.
    async fn exchange(&self, request: ApiRequest) -> Result<Value, TransportError>;
}

/// reqwest-backed transport.
///
/// Uses a semaphore to limit concurrent requests and stay within the
/// API's fair-use limits.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    http: reqwest::Client,
    base_url: String,
    timeout_secs: u64,
    semaphore: Arc<Semaphore>,
}

impl HttpTransport {
    /// Create a new transport with the given configuration.
    pub fn new(config: &EmtConfig) -> Result<Self, TransportError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.clone(),
            timeout_secs: config.timeout_secs,
            semaphore: Arc::new(Semaphore::new(config.max_concurrent.max(1))),
        })
    }

    /// Full URL for a path relative to the base URL.
    fn url_for(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }

    fn map_reqwest(&self, err: reqwest::Error) -> TransportError {
        if err.is_timeout() {
            TransportError::Timeout {
                timeout_secs: self.timeout_secs,
            }
        } else {
            TransportError::Http(err)
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn exchange(&self, request: ApiRequest) -> Result<Value, TransportError> {
        let _permit = self
            .semaphore
            .acquire()
            .await
            .map_err(|_| TransportError::Unavailable("semaphore closed".to_string()))?;

        let url = self.url_for(&request.path);
        debug!(method = %request.method, path = %request.path, "EMT request");

        let mut builder = self
            .http
            .request(request.method.as_reqwest(), &url)
            .headers(request.headers);

        if !request.params.is_empty() {
            builder = builder.query(&request.params);
        }

        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await.map_err(|e| self.map_reqwest(e))?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(TransportError::Status {
                status: status.as_u16(),
                message: body.chars().take(500).collect(),
            });
        }

        let body = response.text().await.map_err(|e| self.map_reqwest(e))?;

        serde_json::from_str(&body).map_err(|e| TransportError::Json {
            message: e.to_string(),
            body: Some(body.chars().take(500).collect()),
        })
    }
}
