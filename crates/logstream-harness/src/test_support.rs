// crates/logstream-harness/src/test_support.rs
// ============================================================================
// Module: Test Support
// Description: Scripted in-memory transport for unit tests.
// Purpose: Replay canned responses and capture every request issued.
// Dependencies: async-trait, reqwest
// ============================================================================

//! ## Overview
//! [`ScriptedTransport`] answers requests from a FIFO script and records what
//! was sent. Clients derived through `with_credentials` share the script and
//! the transcript, so a multi-principal scenario reads as one ordered log.

#![allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::panic,
    reason = "Test-only fixtures use unwrap/expect for clarity."
)]

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::Mutex;

use async_trait::async_trait;
use reqwest::Method;
use reqwest::StatusCode;
use reqwest::header::HeaderMap;

use crate::audit::ViolationEvent;
use crate::client::ApiRequest;
use crate::client::ApiResponse;
use crate::client::Credentials;
use crate::client::HttpTransport;
use crate::context::TestContext;
use crate::error::HarnessError;

// ============================================================================
// SECTION: Types
// ============================================================================

/// A request as the scripted transport saw it.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    /// Label of the issuing client.
    pub client: String,
    /// Request method.
    pub method: Method,
    /// Relative path.
    pub path: String,
    /// Request headers.
    pub headers: HeaderMap,
    /// Request body as UTF-8.
    pub body: Option<String>,
}

impl RecordedRequest {
    /// Returns a header value as a string.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|value| value.to_str().ok())
    }
}

/// One scripted answer.
enum Scripted {
    Respond(StatusCode, String),
    Fail(String),
}

/// State shared between a transport and its derived clients.
#[derive(Default)]
struct Shared {
    script: Mutex<VecDeque<Scripted>>,
    requests: Mutex<Vec<RecordedRequest>>,
    violations: Mutex<Vec<ViolationEvent>>,
}

/// Transport that replays a script.
pub struct ScriptedTransport {
    label: String,
    shared: Arc<Shared>,
}

impl ScriptedTransport {
    /// Creates a transport labelled `admin` with an empty script.
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            label: "admin".to_string(),
            shared: Arc::new(Shared::default()),
        })
    }

    /// Queues a response.
    pub fn respond(&self, status: u16, body: &str) -> &Self {
        let status = StatusCode::from_u16(status).expect("valid status");
        self.shared.script.lock().unwrap().push_back(Scripted::Respond(status, body.to_string()));
        self
    }

    /// Queues a transport failure.
    pub fn fail(&self, message: &str) -> &Self {
        self.shared.script.lock().unwrap().push_back(Scripted::Fail(message.to_string()));
        self
    }

    /// Returns every request issued so far, across derived clients.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.shared.requests.lock().unwrap().clone()
    }

    /// Returns `METHOD path` for every request issued so far.
    pub fn calls(&self) -> Vec<String> {
        self.requests()
            .iter()
            .map(|request| format!("{} {}", request.method, request.path))
            .collect()
    }

    /// Returns the violations reported so far.
    pub fn violations(&self) -> Vec<ViolationEvent> {
        self.shared.violations.lock().unwrap().clone()
    }

    /// Number of scripted answers not yet consumed.
    pub fn remaining(&self) -> usize {
        self.shared.script.lock().unwrap().len()
    }
}

#[async_trait]
impl HttpTransport for ScriptedTransport {
    fn label(&self) -> &str {
        &self.label
    }

    async fn send(&self, request: ApiRequest) -> Result<ApiResponse, HarnessError> {
        self.shared.requests.lock().unwrap().push(RecordedRequest {
            client: self.label.clone(),
            method: request.method().clone(),
            path: request.path().to_string(),
            headers: request.headers().clone(),
            body: request.body().map(|body| String::from_utf8_lossy(body).into_owned()),
        });
        let next = self.shared.script.lock().unwrap().pop_front();
        match next {
            Some(Scripted::Respond(status, body)) => Ok(ApiResponse::new(&request, status, body)),
            Some(Scripted::Fail(message)) => Err(HarnessError::Transport {
                method: request.method().clone(),
                path: request.path().to_string(),
                message,
            }),
            None => Err(HarnessError::Transport {
                method: request.method().clone(),
                path: request.path().to_string(),
                message: "script exhausted".to_string(),
            }),
        }
    }

    fn with_credentials(
        &self,
        credentials: Credentials,
    ) -> Result<Arc<dyn HttpTransport>, HarnessError> {
        Ok(Arc::new(Self {
            label: credentials.username,
            shared: Arc::clone(&self.shared),
        }))
    }

    fn record_violation(&self, event: &ViolationEvent) {
        self.shared.violations.lock().unwrap().push(event.clone());
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Standalone context over `transport` targeting `stream`.
pub fn standalone_context(transport: &Arc<ScriptedTransport>, stream: &str) -> TestContext {
    let client: Arc<dyn HttpTransport> = Arc::clone(transport) as Arc<dyn HttpTransport>;
    TestContext::standalone(client, stream)
}

/// Distributed context where both clients share `transport`'s script.
pub fn distributed_context(transport: &Arc<ScriptedTransport>, stream: &str) -> TestContext {
    let query: Arc<dyn HttpTransport> = Arc::clone(transport) as Arc<dyn HttpTransport>;
    let ingestor = Arc::clone(&query);
    TestContext::distributed(query, ingestor, stream)
}
