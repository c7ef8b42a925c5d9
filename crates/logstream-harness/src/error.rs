// crates/logstream-harness/src/error.rs
// ============================================================================
// Module: Harness Errors
// Description: Transport failures and contract violations.
// Purpose: Carry full request diagnostics out of a failed scenario.
// Dependencies: reqwest, thiserror
// ============================================================================

//! ## Overview
//! Two failure classes exist: transport errors (the call itself failed) and
//! contract violations (the call completed but the status or body was wrong).
//! Both end the current scenario. Each variant carries the method and path of
//! the offending request so a failure report is self-contained.

use reqwest::Method;
use reqwest::StatusCode;
use thiserror::Error;

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Harness failures surfaced by contract operations.
#[derive(Debug, Error)]
pub enum HarnessError {
    /// Request could not be constructed (bad path, header name, or value).
    #[error("invalid request: {0}")]
    InvalidRequest(String),
    /// Client construction failed.
    #[error("client config error: {0}")]
    Config(String),
    /// The HTTP call failed before a response was received.
    #[error("{method} {path}: request failed: {message}")]
    Transport {
        /// Request method.
        method: Method,
        /// Request path relative to the client base URL.
        path: String,
        /// Underlying transport message.
        message: String,
    },
    /// The response status differs from the expected status.
    #[error(
        "{method} {path}: expected http {expected}, server returned {status_line} with response: {body}"
    )]
    UnexpectedStatus {
        /// Request method.
        method: Method,
        /// Request path relative to the client base URL.
        path: String,
        /// Expected status code.
        expected: StatusCode,
        /// Actual status code.
        actual: StatusCode,
        /// Actual status line.
        status_line: String,
        /// Raw response body.
        body: String,
    },
    /// A non-matching status was required but the server returned it anyway.
    #[error("{method} {path}: expected anything but http {rejected}, server returned {status_line} with response: {body}")]
    UnexpectedSuccess {
        /// Request method.
        method: Method,
        /// Request path relative to the client base URL.
        path: String,
        /// Status code that must not be returned.
        rejected: StatusCode,
        /// Actual status line.
        status_line: String,
        /// Raw response body.
        body: String,
    },
    /// Byte-exact body comparison failed.
    #[error("{method} {path}: response body mismatch; expected {expected}, actual {actual}")]
    BodyMismatch {
        /// Request method.
        method: Method,
        /// Request path relative to the client base URL.
        path: String,
        /// Expected body.
        expected: String,
        /// Actual body.
        actual: String,
    },
    /// Structural JSON comparison failed.
    #[error("{method} {path}: json body mismatch; expected {expected}, actual {actual}")]
    JsonMismatch {
        /// Request method.
        method: Method,
        /// Request path relative to the client base URL.
        path: String,
        /// Expected JSON document (canonical rendering).
        expected: String,
        /// Actual JSON document (raw body).
        actual: String,
    },
    /// The response body does not conform to the expected shape.
    #[error("{method} {path}: response isn't of expected schema ({message}): {body}")]
    Decode {
        /// Request method.
        method: Method,
        /// Request path relative to the client base URL.
        path: String,
        /// Decoder message.
        message: String,
        /// Raw response body.
        body: String,
    },
    /// Synthetic event generation failed.
    #[error("event generator failed: {0}")]
    Generator(String),
    /// Bounded polling never observed the expected query result.
    #[error("query for {stream} did not return {expected} within {waited_ms}ms; last response: {last}")]
    ConsistencyTimeout {
        /// Stream being polled.
        stream: String,
        /// Expected response body.
        expected: String,
        /// Last observed response body.
        last: String,
        /// Total time spent polling in milliseconds.
        waited_ms: u128,
    },
    /// Resources created by the scenario were never deleted.
    #[error("scenario leaked resources: {0}")]
    LeakedResources(String),
}

impl HarnessError {
    /// Returns a stable label for the error kind.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::InvalidRequest(_) => "invalid_request",
            Self::Config(_) => "config",
            Self::Transport {
                ..
            } => "transport",
            Self::UnexpectedStatus {
                ..
            } => "unexpected_status",
            Self::UnexpectedSuccess {
                ..
            } => "unexpected_success",
            Self::BodyMismatch {
                ..
            } => "body_mismatch",
            Self::JsonMismatch {
                ..
            } => "json_mismatch",
            Self::Decode {
                ..
            } => "decode",
            Self::Generator(_) => "generator",
            Self::ConsistencyTimeout {
                ..
            } => "consistency_timeout",
            Self::LeakedResources(_) => "leaked_resources",
        }
    }

    /// Returns true for failures where no response was received.
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        matches!(self, Self::Transport { .. })
    }
}
