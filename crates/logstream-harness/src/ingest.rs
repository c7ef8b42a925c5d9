// crates/logstream-harness/src/ingest.rs
// ============================================================================
// Module: Ingestion
// Description: Event submission through the ingest endpoints.
// Purpose: Feed streams with generated or fixed events and assert acceptance.
// Dependencies: reqwest, serde_json
// ============================================================================

//! ## Overview
//! `POST ingest` takes a JSON array of events and names the stream in the
//! `X-P-Stream` header. `POST logstream/{name}` is the older single-object
//! path; it is still part of the contract and doubles as the write probe in
//! access checks.

// ============================================================================
// SECTION: Imports
// ============================================================================

use reqwest::Method;
use serde_json::Value;
use serde_json::json;

use crate::assertions::StatusExpectation;
use crate::assertions::exchange;
use crate::client::ApiResponse;
use crate::client::HttpTransport;
use crate::error::HarnessError;
use crate::generator::EventGenerator;
use crate::lifecycle::stream_path;
use crate::model::STREAM_HEADER;

// ============================================================================
// SECTION: Ingest Endpoint
// ============================================================================

/// Posts a raw body to `POST ingest` for `stream` and checks the status.
///
/// # Errors
///
/// Returns the transport error or a status violation.
pub async fn ingest_raw(
    client: &dyn HttpTransport,
    stream: &str,
    payload: &str,
    expectation: StatusExpectation,
) -> Result<ApiResponse, HarnessError> {
    let request = client
        .new_request(Method::POST, "ingest", Some(payload.as_bytes().to_vec()))
        .json()
        .header(STREAM_HEADER, stream)?;
    exchange(client, request, expectation).await
}

/// Posts each event as its own one-element batch, requiring `200 OK` each time.
///
/// # Errors
///
/// Returns the first transport error or status violation.
pub async fn ingest_events(
    client: &dyn HttpTransport,
    stream: &str,
    events: &[Value],
) -> Result<(), HarnessError> {
    for event in events {
        let payload = Value::Array(vec![event.clone()]).to_string();
        ingest_raw(client, stream, &payload, StatusExpectation::OK).await?;
    }
    Ok(())
}

/// Generates `count` events and ingests them one by one.
///
/// # Errors
///
/// Returns a generator error, or the first transport error or status violation.
pub async fn ingest_generated(
    client: &dyn HttpTransport,
    stream: &str,
    generator: &dyn EventGenerator,
    count: usize,
) -> Result<(), HarnessError> {
    let events = generator.generate(count)?;
    ingest_events(client, stream, &events).await
}

// ============================================================================
// SECTION: Single-Event Endpoint
// ============================================================================

/// Fixed single event used by the legacy ingest path.
#[must_use]
pub fn single_event_payload() -> Value {
    json!({
        "id": "id;objectId",
        "maxRunDistance": "float;1;20;1",
        "cpf": "cpf",
        "cnpj": "cnpj",
        "pretendSalary": "money",
        "age": "int;20;80",
        "gender": "gender",
        "firstName": "firstName",
        "lastName": "lastName",
        "phone": "maskInt;+55 (83) 9####-####",
        "address": "address",
        "hairColor": "color"
    })
}

/// Posts the fixed single event to `POST logstream/{stream}` and requires `200 OK`.
///
/// # Errors
///
/// Returns the transport error or a status violation.
pub async fn put_single_event(
    client: &dyn HttpTransport,
    stream: &str,
) -> Result<(), HarnessError> {
    put_single_event_expecting(client, stream, StatusExpectation::OK).await
}

/// Posts the fixed single event and requires `403 Forbidden`.
///
/// # Errors
///
/// Returns the transport error or a status violation.
pub async fn put_single_event_expect_forbidden(
    client: &dyn HttpTransport,
    stream: &str,
) -> Result<(), HarnessError> {
    put_single_event_expecting(client, stream, StatusExpectation::FORBIDDEN).await
}

/// Shared body of the single-event operations.
async fn put_single_event_expecting(
    client: &dyn HttpTransport,
    stream: &str,
    expectation: StatusExpectation,
) -> Result<(), HarnessError> {
    let body = single_event_payload().to_string().into_bytes();
    let request = client.new_request(Method::POST, &stream_path(stream), Some(body)).json();
    exchange(client, request, expectation).await?;
    Ok(())
}

// ============================================================================
// SECTION: Tests
// ============================================================================
