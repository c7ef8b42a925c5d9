// crates/logstream-harness/src/assertions.rs
// ============================================================================
// Module: Response Assertions
// Description: Status and body assertions shared by every contract operation.
// Purpose: Turn a response into Ok or a fully described contract violation.
// Dependencies: reqwest, serde, serde_json
// ============================================================================

//! ## Overview
//! Pure checks (`check_*`, [`decode_json`]) compare a response against an
//! expectation and build the error. The client-aware wrappers ([`exchange`],
//! [`expect_body`], [`expect_json`], [`decode`]) also report the violation to
//! the issuing client's sink before returning it, so the exchange log shows
//! exactly where a scenario stopped.
//!
//! JSON comparison is structural: key order and insignificant whitespace never
//! cause a mismatch. Body comparison is byte-exact.

// ============================================================================
// SECTION: Imports
// ============================================================================

use reqwest::Method;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::audit::ViolationEvent;
use crate::client::ApiRequest;
use crate::client::ApiResponse;
use crate::client::HttpTransport;
use crate::error::HarnessError;

// ============================================================================
// SECTION: Expectations
// ============================================================================

/// Expected status outcome for a single exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusExpectation {
    /// The response must carry exactly this status.
    Exactly(StatusCode),
    /// The response must carry any status except this one.
    Not(StatusCode),
}

impl StatusExpectation {
    /// Expect `200 OK`.
    pub const OK: Self = Self::Exactly(StatusCode::OK);
    /// Expect anything but `200 OK`.
    pub const NOT_OK: Self = Self::Not(StatusCode::OK);
    /// Expect `400 Bad Request`.
    pub const BAD_REQUEST: Self = Self::Exactly(StatusCode::BAD_REQUEST);
    /// Expect `403 Forbidden`.
    pub const FORBIDDEN: Self = Self::Exactly(StatusCode::FORBIDDEN);

    /// Maps a caller's "this should fail" flag to an expectation on `200 OK`.
    #[must_use]
    pub const fn ok_unless(should_fail: bool) -> Self {
        if should_fail { Self::NOT_OK } else { Self::OK }
    }
}

// ============================================================================
// SECTION: Pure Checks
// ============================================================================

/// Checks the response status against an expectation.
///
/// # Errors
///
/// Returns [`HarnessError::UnexpectedStatus`] or
/// [`HarnessError::UnexpectedSuccess`] carrying the status line and raw body.
pub fn check_status(
    response: &ApiResponse,
    expectation: StatusExpectation,
) -> Result<(), HarnessError> {
    match expectation {
        StatusExpectation::Exactly(expected) if response.status() != expected => {
            Err(HarnessError::UnexpectedStatus {
                method: response.method().clone(),
                path: response.path().to_string(),
                expected,
                actual: response.status(),
                status_line: response.status_line(),
                body: response.body().to_string(),
            })
        }
        StatusExpectation::Not(rejected) if response.status() == rejected => {
            Err(HarnessError::UnexpectedSuccess {
                method: response.method().clone(),
                path: response.path().to_string(),
                rejected,
                status_line: response.status_line(),
                body: response.body().to_string(),
            })
        }
        _ => Ok(()),
    }
}

/// Checks the body byte-for-byte.
///
/// # Errors
///
/// Returns [`HarnessError::BodyMismatch`] when the bodies differ.
pub fn check_body_eq(response: &ApiResponse, expected: &str) -> Result<(), HarnessError> {
    if response.body() == expected {
        return Ok(());
    }
    Err(HarnessError::BodyMismatch {
        method: response.method().clone(),
        path: response.path().to_string(),
        expected: expected.to_string(),
        actual: response.body().to_string(),
    })
}

/// Checks the body for structural JSON equality with `expected`.
///
/// # Errors
///
/// Returns [`HarnessError::InvalidRequest`] when `expected` is not JSON,
/// [`HarnessError::Decode`] when the body is not JSON, and
/// [`HarnessError::JsonMismatch`] when the documents differ.
pub fn check_json_eq(response: &ApiResponse, expected: &str) -> Result<(), HarnessError> {
    let expected_value: Value = serde_json::from_str(expected)
        .map_err(|err| HarnessError::InvalidRequest(format!("expected document is not json: {err}")))?;
    check_json_value_eq(response, &expected_value)
}

/// Checks the body for structural JSON equality with an already-parsed value.
///
/// # Errors
///
/// Returns [`HarnessError::Decode`] when the body is not JSON and
/// [`HarnessError::JsonMismatch`] when the documents differ.
pub fn check_json_value_eq(response: &ApiResponse, expected: &Value) -> Result<(), HarnessError> {
    let actual: Value = decode_json(response)?;
    if &actual == expected {
        return Ok(());
    }
    Err(HarnessError::JsonMismatch {
        method: response.method().clone(),
        path: response.path().to_string(),
        expected: expected.to_string(),
        actual: response.body().to_string(),
    })
}

/// Decodes the body into `T`.
///
/// # Errors
///
/// Returns [`HarnessError::Decode`] when the body does not match `T`.
pub fn decode_json<T: DeserializeOwned>(response: &ApiResponse) -> Result<T, HarnessError> {
    serde_json::from_str(response.body()).map_err(|err| HarnessError::Decode {
        method: response.method().clone(),
        path: response.path().to_string(),
        message: err.to_string(),
        body: response.body().to_string(),
    })
}

// ============================================================================
// SECTION: Client-Aware Assertions
// ============================================================================

/// Sends `request` and checks the status, reporting any violation.
///
/// # Errors
///
/// Returns the transport error or the status violation.
pub async fn exchange(
    client: &dyn HttpTransport,
    request: ApiRequest,
    expectation: StatusExpectation,
) -> Result<ApiResponse, HarnessError> {
    let response = client.send(request).await?;
    report(client, &response, check_status(&response, expectation))?;
    Ok(response)
}

/// Builds a request with `client` and runs [`exchange`] on it.
///
/// # Errors
///
/// Returns the transport error or the status violation.
pub async fn call(
    client: &dyn HttpTransport,
    method: Method,
    path: &str,
    body: Option<Vec<u8>>,
    expectation: StatusExpectation,
) -> Result<ApiResponse, HarnessError> {
    let request = client.new_request(method, path, body);
    exchange(client, request, expectation).await
}

/// Byte-exact body assertion with violation reporting.
///
/// # Errors
///
/// Returns [`HarnessError::BodyMismatch`] when the bodies differ.
pub fn expect_body(
    client: &dyn HttpTransport,
    response: &ApiResponse,
    expected: &str,
) -> Result<(), HarnessError> {
    report(client, response, check_body_eq(response, expected))
}

/// Structural JSON assertion with violation reporting.
///
/// # Errors
///
/// Returns the error produced by [`check_json_eq`].
pub fn expect_json(
    client: &dyn HttpTransport,
    response: &ApiResponse,
    expected: &str,
) -> Result<(), HarnessError> {
    report(client, response, check_json_eq(response, expected))
}

/// Typed decode with violation reporting.
///
/// # Errors
///
/// Returns [`HarnessError::Decode`] when the body does not match `T`.
pub fn decode<T: DeserializeOwned>(
    client: &dyn HttpTransport,
    response: &ApiResponse,
) -> Result<T, HarnessError> {
    report(client, response, decode_json(response))
}

/// Forwards a failed check to the client's violation sink.
fn report<T>(
    client: &dyn HttpTransport,
    response: &ApiResponse,
    result: Result<T, HarnessError>,
) -> Result<T, HarnessError> {
    if let Err(err) = &result {
        client.record_violation(&ViolationEvent::new(
            response.method().to_string(),
            response.path().to_string(),
            err.kind(),
            err.to_string(),
        ));
    }
    result
}

// ============================================================================
// SECTION: Tests
// ============================================================================
