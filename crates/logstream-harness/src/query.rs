// crates/logstream-harness/src/query.rs
// ============================================================================
// Module: Query Verification
// Description: Time-windowed count queries and schema read-back.
// Purpose: Assert that ingested data is queryable with exact aggregate output.
// Dependencies: reqwest, serde_json, time
// ============================================================================

//! ## Overview
//! Count assertions compare the response body byte-for-byte with
//! `[{"count":N}]`: the aggregate's serialization is part of the contract.
//! Windows are half-open `[start, end)` and rendered as RFC 3339.
//!
//! [`await_stream_count`] applies the context's [`ConsistencyWait`] before or
//! while checking, for scenarios that query right after ingesting.

// ============================================================================
// SECTION: Imports
// ============================================================================

use reqwest::Method;
use serde_json::Value;
use time::Duration;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

use crate::assertions::StatusExpectation;
use crate::assertions::call;
use crate::assertions::exchange;
use crate::assertions::expect_body;
use crate::assertions::expect_json;
use crate::client::ApiResponse;
use crate::client::HttpTransport;
use crate::consistency::Attempt;
use crate::consistency::ConsistencyWait;
use crate::consistency::pause;
use crate::consistency::poll_until;
use crate::context::TestContext;
use crate::error::HarnessError;
use crate::lifecycle::stream_path;
use crate::model::QueryRequest;

// ============================================================================
// SECTION: Windows
// ============================================================================

/// Half-open time range a query is bounded by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QueryWindow {
    /// Inclusive start.
    pub start: OffsetDateTime,
    /// Exclusive end.
    pub end: OffsetDateTime,
}

impl QueryWindow {
    /// Last 30 minutes, extended one second into the future.
    #[must_use]
    pub fn recent() -> Self {
        Self::recent_at(OffsetDateTime::now_utc())
    }

    /// Recent window anchored at `now`.
    #[must_use]
    pub fn recent_at(now: OffsetDateTime) -> Self {
        Self {
            start: now - Duration::minutes(30),
            end: now + Duration::seconds(1),
        }
    }

    /// From 33 days ago to 27 days ago.
    #[must_use]
    pub fn historical() -> Self {
        Self::historical_at(OffsetDateTime::now_utc())
    }

    /// Historical window anchored at `now`.
    #[must_use]
    pub fn historical_at(now: OffsetDateTime) -> Self {
        Self {
            start: now - Duration::days(33),
            end: now - Duration::days(27),
        }
    }

    /// Builds the `POST query` body for `query` over this window.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::InvalidRequest`] when a bound cannot be
    /// rendered as RFC 3339.
    pub fn request(&self, query: impl Into<String>) -> Result<QueryRequest, HarnessError> {
        Ok(QueryRequest {
            query: query.into(),
            start_time: format_rfc3339(self.start)?,
            end_time: format_rfc3339(self.end)?,
        })
    }
}

/// Renders a timestamp as RFC 3339.
fn format_rfc3339(at: OffsetDateTime) -> Result<String, HarnessError> {
    at.format(&Rfc3339)
        .map_err(|err| HarnessError::InvalidRequest(format!("timestamp formatting: {err}")))
}

// ============================================================================
// SECTION: Query Text
// ============================================================================

/// `select count(*) as count from <stream>`.
#[must_use]
pub fn count_query(stream: &str) -> String {
    format!("select count(*) as count from {stream}")
}

/// Sum of the per-stream counts of two streams.
#[must_use]
pub fn union_count_query(first: &str, second: &str) -> String {
    format!(
        "select sum(c) as count from (select count(*) as c from {first} union all select count(*) as c from {second})"
    )
}

/// Exact body a single-row count aggregate must produce.
#[must_use]
pub fn expected_count_body(count: u64) -> String {
    format!(r#"[{{"count":{count}}}]"#)
}

// ============================================================================
// SECTION: Operations
// ============================================================================

/// Submits `query` over `window` and checks the status.
///
/// # Errors
///
/// Returns an encoding error, the transport error, or a status violation.
pub async fn submit_query(
    client: &dyn HttpTransport,
    query: &str,
    window: &QueryWindow,
    expectation: StatusExpectation,
) -> Result<ApiResponse, HarnessError> {
    let body = serde_json::to_vec(&window.request(query)?)
        .map_err(|err| HarnessError::InvalidRequest(format!("query encoding: {err}")))?;
    let request = client.new_request(Method::POST, "query", Some(body)).json();
    exchange(client, request, expectation).await
}

/// Runs a count query and requires the body to be exactly `[{"count":N}]`.
async fn assert_count(
    client: &dyn HttpTransport,
    query: &str,
    window: &QueryWindow,
    count: u64,
) -> Result<String, HarnessError> {
    let response = submit_query(client, query, window, StatusExpectation::OK).await?;
    expect_body(client, &response, &expected_count_body(count))?;
    Ok(response.into_body())
}

/// Counts `stream` over the recent window and returns the body.
///
/// # Errors
///
/// Returns the transport error, a status violation, or a body mismatch.
pub async fn query_stream_count(
    client: &dyn HttpTransport,
    stream: &str,
    count: u64,
) -> Result<String, HarnessError> {
    assert_count(client, &count_query(stream), &QueryWindow::recent(), count).await
}

/// Counts `stream` over the historical window.
///
/// # Errors
///
/// Returns the transport error, a status violation, or a body mismatch.
pub async fn query_stream_count_historical(
    client: &dyn HttpTransport,
    stream: &str,
    count: u64,
) -> Result<(), HarnessError> {
    assert_count(client, &count_query(stream), &QueryWindow::historical(), count).await?;
    Ok(())
}

/// Counts two streams together over the recent window.
///
/// # Errors
///
/// Returns the transport error, a status violation, or a body mismatch.
pub async fn query_two_stream_count(
    client: &dyn HttpTransport,
    first: &str,
    second: &str,
    count: u64,
) -> Result<(), HarnessError> {
    assert_count(client, &union_count_query(first, second), &QueryWindow::recent(), count)
        .await?;
    Ok(())
}

/// Submits an arbitrary query over the recent window, requiring only `200 OK`.
///
/// # Errors
///
/// Returns the transport error or a status violation.
pub async fn assert_query_ok(client: &dyn HttpTransport, query: &str) -> Result<(), HarnessError> {
    submit_query(client, query, &QueryWindow::recent(), StatusExpectation::OK).await?;
    Ok(())
}

/// Requires `GET logstream/{stream}/schema` to be JSON-equal to `schema`.
///
/// # Errors
///
/// Returns the transport error, a status violation, or a JSON mismatch.
pub async fn assert_stream_schema(
    client: &dyn HttpTransport,
    stream: &str,
    schema: &str,
) -> Result<(), HarnessError> {
    let path = format!("{}/schema", stream_path(stream));
    let response = call(client, Method::GET, &path, None, StatusExpectation::OK).await?;
    expect_json(client, &response, schema)
}

/// Waits per the context's consistency strategy, then requires the recent
/// count of `stream` to equal `count`.
///
/// # Errors
///
/// Returns the transport error, a status violation, a body mismatch, or
/// [`HarnessError::ConsistencyTimeout`] when polling never sees the count.
/// A count above `count` fails immediately.
pub async fn await_stream_count(
    ctx: &TestContext,
    client: &dyn HttpTransport,
    stream: &str,
    count: u64,
) -> Result<String, HarnessError> {
    match *ctx.consistency() {
        ConsistencyWait::Fixed(duration) => {
            pause(duration).await;
            query_stream_count(client, stream, count).await
        }
        ConsistencyWait::Poll(policy) => {
            let expected = expected_count_body(count);
            let expected_ref = expected.as_str();
            let query = count_query(stream);
            let query_ref = query.as_str();
            poll_until(
                &policy,
                || async move {
                    let response = submit_query(
                        client,
                        query_ref,
                        &QueryWindow::recent(),
                        StatusExpectation::OK,
                    )
                    .await?;
                    if response.body() != expected_ref
                        && observed_count(response.body()).is_none_or(|observed| observed < count)
                    {
                        return Ok(Attempt::Pending(response.into_body()));
                    }
                    expect_body(client, &response, expected_ref)?;
                    Ok(Attempt::Ready(response.into_body()))
                },
                |last, waited| HarnessError::ConsistencyTimeout {
                    stream: stream.to_string(),
                    expected: expected.clone(),
                    last,
                    waited_ms: waited.as_millis(),
                },
            )
            .await
        }
    }
}

/// Count carried by a `[{"count":N}]` body, if it has that shape.
fn observed_count(body: &str) -> Option<u64> {
    let rows: Value = serde_json::from_str(body).ok()?;
    rows.get(0)?.get("count")?.as_u64()
}

// ============================================================================
// SECTION: Tests
// ============================================================================
