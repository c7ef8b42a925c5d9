// crates/logstream-harness/src/client.rs
// ============================================================================
// Module: HTTP Client
// Description: Request/response capability consumed by contract operations.
// Purpose: Build requests relative to a base URL and execute them once.
// Dependencies: async-trait, reqwest, url
// ============================================================================

//! ## Overview
//! Contract operations only need two things from HTTP: build a request for a
//! method, a relative path, and an optional body, then execute it. The
//! [`HttpTransport`] trait captures that seam; [`ServiceClient`] implements it
//! with reqwest. The transport never retries: a transient failure must surface
//! as a scenario failure rather than be masked.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use std::time::Instant;

use async_trait::async_trait;
use reqwest::Client;
use reqwest::Method;
use reqwest::StatusCode;
use reqwest::header::CONTENT_TYPE;
use reqwest::header::HeaderMap;
use reqwest::header::HeaderName;
use reqwest::header::HeaderValue;
use reqwest::redirect::Policy;
use url::Url;

use crate::audit::ExchangeEvent;
use crate::audit::ExchangeEventParams;
use crate::audit::ExchangeSink;
use crate::audit::NoopExchangeSink;
use crate::audit::ViolationEvent;
use crate::error::HarnessError;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default request timeout when none is configured.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

// ============================================================================
// SECTION: Request / Response
// ============================================================================

/// Basic-auth principal used by a client.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Username.
    pub username: String,
    /// Password.
    pub password: String,
}

impl Credentials {
    /// Creates credentials from a username/password pair.
    #[must_use]
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// An HTTP request relative to a client's base URL.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    /// Request method.
    method: Method,
    /// Path relative to the base URL (no leading slash).
    path: String,
    /// Extra request headers.
    headers: HeaderMap,
    /// Optional request body.
    body: Option<Vec<u8>>,
}

impl ApiRequest {
    /// Creates a request with no headers.
    #[must_use]
    pub fn new(method: Method, path: &str, body: Option<Vec<u8>>) -> Self {
        Self {
            method,
            path: path.trim_start_matches('/').to_string(),
            headers: HeaderMap::new(),
            body,
        }
    }

    /// Adds a header, keeping any existing values for the same name.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::InvalidRequest`] when the name or value is not a
    /// valid HTTP header.
    pub fn header(mut self, name: &str, value: &str) -> Result<Self, HarnessError> {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|_| HarnessError::InvalidRequest(format!("invalid header name {name:?}")))?;
        let value = HeaderValue::from_str(value).map_err(|_| {
            HarnessError::InvalidRequest(format!("invalid value for header {name}"))
        })?;
        self.headers.append(name, value);
        Ok(self)
    }

    /// Marks the body as JSON.
    #[must_use]
    pub fn json(mut self) -> Self {
        self.headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        self
    }

    /// Returns the request method.
    #[must_use]
    pub const fn method(&self) -> &Method {
        &self.method
    }

    /// Returns the relative request path.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns the request headers.
    #[must_use]
    pub const fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Returns the request body, if any.
    #[must_use]
    pub fn body(&self) -> Option<&[u8]> {
        self.body.as_deref()
    }
}

/// A received response, tagged with the request it answers.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    /// Method of the originating request.
    method: Method,
    /// Path of the originating request.
    path: String,
    /// Response status code.
    status: StatusCode,
    /// Raw response body decoded as UTF-8 (lossy).
    body: String,
}

impl ApiResponse {
    /// Creates a response record for the given request.
    #[must_use]
    pub fn new(request: &ApiRequest, status: StatusCode, body: String) -> Self {
        Self {
            method: request.method.clone(),
            path: request.path.clone(),
            status,
            body,
        }
    }

    /// Returns the originating request method.
    #[must_use]
    pub const fn method(&self) -> &Method {
        &self.method
    }

    /// Returns the originating request path.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Returns the status code.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    /// Returns the status line, e.g. `400 Bad Request`.
    #[must_use]
    pub fn status_line(&self) -> String {
        self.status.to_string()
    }

    /// Returns the raw body.
    #[must_use]
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Consumes the response and returns the body.
    #[must_use]
    pub fn into_body(self) -> String {
        self.body
    }
}

// ============================================================================
// SECTION: Transport Trait
// ============================================================================

/// Capability to build and execute requests against one service endpoint.
#[async_trait]
pub trait HttpTransport: Send + Sync {
    /// Returns a short label identifying this client in logs.
    fn label(&self) -> &str;

    /// Builds a request relative to this client's base URL.
    fn new_request(&self, method: Method, path: &str, body: Option<Vec<u8>>) -> ApiRequest {
        ApiRequest::new(method, path, body)
    }

    /// Executes the request exactly once.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::Transport`] when no response was received.
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, HarnessError>;

    /// Derives a client for the same endpoint authenticated as another principal.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::Config`] when the derived client cannot be built.
    fn with_credentials(
        &self,
        credentials: Credentials,
    ) -> Result<Arc<dyn HttpTransport>, HarnessError>;

    /// Records a contract violation observed on a response from this client.
    fn record_violation(&self, _event: &ViolationEvent) {}
}

// ============================================================================
// SECTION: Reqwest Client
// ============================================================================

/// Configuration for a [`ServiceClient`].
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL every request path is joined to.
    pub base_url: String,
    /// Basic-auth credentials, if the endpoint requires them.
    pub credentials: Option<Credentials>,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Label recorded with each exchange.
    pub label: String,
}

impl ClientConfig {
    /// Creates a config with the default timeout and no credentials.
    #[must_use]
    pub fn new(base_url: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            credentials: None,
            timeout: DEFAULT_REQUEST_TIMEOUT,
            label: label.into(),
        }
    }

    /// Attaches basic-auth credentials.
    #[must_use]
    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// Overrides the request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// reqwest-backed [`HttpTransport`].
#[derive(Clone)]
pub struct ServiceClient {
    /// Base URL, always ending in `/`.
    base_url: Url,
    /// Credentials applied to every request.
    credentials: Option<Credentials>,
    /// Label recorded with each exchange.
    label: String,
    /// Configured request timeout.
    timeout: Duration,
    /// Underlying HTTP client.
    client: Client,
    /// Exchange log destination.
    sink: Arc<dyn ExchangeSink>,
}

impl ServiceClient {
    /// Builds a client from configuration.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::Config`] when the base URL is invalid or the
    /// HTTP client cannot be built.
    pub fn new(config: ClientConfig) -> Result<Self, HarnessError> {
        let base_url = normalize_base_url(&config.base_url)?;
        let client = Client::builder()
            .timeout(config.timeout)
            .redirect(Policy::none())
            .build()
            .map_err(|err| HarnessError::Config(format!("failed to build http client: {err}")))?;
        Ok(Self {
            base_url,
            credentials: config.credentials,
            label: config.label,
            timeout: config.timeout,
            client,
            sink: Arc::new(NoopExchangeSink),
        })
    }

    /// Routes exchange records to `sink`.
    #[must_use]
    pub fn with_sink(mut self, sink: Arc<dyn ExchangeSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Returns the normalized base URL.
    #[must_use]
    pub const fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Returns the username this client authenticates as, if any.
    #[must_use]
    pub fn username(&self) -> Option<&str> {
        self.credentials.as_ref().map(|creds| creds.username.as_str())
    }

    /// Records one exchange.
    fn record(
        &self,
        request: &ApiRequest,
        status: Option<StatusCode>,
        error: Option<String>,
        response_bytes: usize,
        started: Instant,
    ) {
        self.sink.record_exchange(&ExchangeEvent::new(ExchangeEventParams {
            client: self.label.clone(),
            method: request.method.to_string(),
            path: request.path.clone(),
            status: status.map(|status| status.as_u16()),
            error,
            request_bytes: request.body.as_ref().map_or(0, Vec::len),
            response_bytes,
            duration_ms: started.elapsed().as_millis(),
        }));
    }
}

#[async_trait]
impl HttpTransport for ServiceClient {
    fn label(&self) -> &str {
        &self.label
    }

    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, HarnessError> {
        let started = Instant::now();
        let url = self.base_url.join(&request.path).map_err(|err| {
            HarnessError::InvalidRequest(format!("invalid path {}: {err}", request.path))
        })?;
        let mut builder =
            self.client.request(request.method.clone(), url).headers(request.headers.clone());
        if let Some(creds) = &self.credentials {
            builder = builder.basic_auth(&creds.username, Some(&creds.password));
        }
        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }
        let transport_error = |message: String| HarnessError::Transport {
            method: request.method.clone(),
            path: request.path.clone(),
            message,
        };
        let response = match builder.send().await {
            Ok(response) => response,
            Err(err) => {
                self.record(&request, None, Some(err.to_string()), 0, started);
                return Err(transport_error(err.to_string()));
            }
        };
        let status = response.status();
        let bytes = match response.bytes().await {
            Ok(bytes) => bytes,
            Err(err) => {
                self.record(&request, Some(status), Some(err.to_string()), 0, started);
                return Err(transport_error(format!("failed to read response body: {err}")));
            }
        };
        self.record(&request, Some(status), None, bytes.len(), started);
        let body = String::from_utf8_lossy(&bytes).into_owned();
        Ok(ApiResponse::new(&request, status, body))
    }

    fn with_credentials(
        &self,
        credentials: Credentials,
    ) -> Result<Arc<dyn HttpTransport>, HarnessError> {
        let label = format!("{}:{}", self.label, credentials.username);
        let config = ClientConfig {
            base_url: self.base_url.to_string(),
            credentials: Some(credentials),
            timeout: self.timeout,
            label,
        };
        let client = Self::new(config)?.with_sink(Arc::clone(&self.sink));
        Ok(Arc::new(client))
    }

    fn record_violation(&self, event: &ViolationEvent) {
        self.sink.record_violation(event);
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Parses a base URL and guarantees a trailing slash so relative joins append.
///
/// # Errors
///
/// Returns [`HarnessError::Config`] when the URL cannot be parsed or is not
/// an http(s) URL.
pub fn normalize_base_url(raw: &str) -> Result<Url, HarnessError> {
    let trimmed = raw.trim();
    let with_slash =
        if trimmed.ends_with('/') { trimmed.to_string() } else { format!("{trimmed}/") };
    let url = Url::parse(&with_slash)
        .map_err(|err| HarnessError::Config(format!("invalid base url {trimmed:?}: {err}")))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(HarnessError::Config(format!("unsupported scheme in base url {trimmed:?}")));
    }
    Ok(url)
}

// ============================================================================
// SECTION: Tests
// ============================================================================
