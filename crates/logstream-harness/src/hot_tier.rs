// crates/logstream-harness/src/hot_tier.rs
// ============================================================================
// Module: Hot-Tier Lifecycle
// Description: Activate, inspect, and disable a stream's hot tier.
// Purpose: Assert topology-dependent hot-tier outcomes.
// Dependencies: reqwest, serde_json
// ============================================================================

//! ## Overview
//! The hot tier exists only in distributed deployments. In standalone mode
//! the correct outcome of an activation is any non-`200` status, so the
//! expectation is derived from the context's [`crate::Topology`] rather than
//! from a specific error code. Callers that know a tier should be absent pass
//! `should_fail`. Transport errors are fatal in every mode.

// ============================================================================
// SECTION: Imports
// ============================================================================

use reqwest::Method;
use reqwest::StatusCode;

use crate::assertions::StatusExpectation;
use crate::assertions::decode;
use crate::assertions::exchange;
use crate::client::HttpTransport;
use crate::context::TestContext;
use crate::error::HarnessError;
use crate::lifecycle::stream_path;
use crate::model::DEFAULT_HOT_TIER_SIZE;
use crate::model::HotTierDescriptor;

// ============================================================================
// SECTION: Operations
// ============================================================================

/// Requests a hot tier of `size` (default `20 GiB`) for the context stream.
///
/// With `verify`, distributed deployments must answer `200 OK` and standalone
/// deployments must not. Returns the status and raw body either way.
///
/// # Errors
///
/// Returns the transport error, or a status violation when `verify` is set.
pub async fn activate_hot_tier(
    ctx: &TestContext,
    size: Option<&str>,
    verify: bool,
) -> Result<(StatusCode, String), HarnessError> {
    let client = ctx.query_client();
    let descriptor = HotTierDescriptor::with_size(size.unwrap_or(DEFAULT_HOT_TIER_SIZE));
    let body = serde_json::to_vec(&descriptor)
        .map_err(|err| HarnessError::InvalidRequest(format!("hot tier encoding: {err}")))?;
    let request = client.new_request(Method::PUT, &hot_tier_path(ctx), Some(body)).json();
    let response = if verify {
        let expectation = StatusExpectation::ok_unless(!ctx.topology().is_distributed());
        exchange(client, request, expectation).await?
    } else {
        client.send(request).await?
    };
    Ok((response.status(), response.into_body()))
}

/// Reads the context stream's hot-tier descriptor.
///
/// With `should_fail`, requires a non-`200` status and returns
/// [`HotTierDescriptor::absent`] without parsing.
///
/// # Errors
///
/// Returns the transport error, a status violation, or a decode error.
pub async fn get_hot_tier_status(
    ctx: &TestContext,
    should_fail: bool,
) -> Result<HotTierDescriptor, HarnessError> {
    let client = ctx.query_client();
    let request = client.new_request(Method::GET, &hot_tier_path(ctx), None).json();
    let response = exchange(client, request, StatusExpectation::ok_unless(should_fail)).await?;
    if should_fail {
        return Ok(HotTierDescriptor::absent());
    }
    decode(client, &response)
}

/// Removes the context stream's hot tier.
///
/// With `should_fail`, requires a non-`200` status.
///
/// # Errors
///
/// Returns the transport error or a status violation.
pub async fn disable_hot_tier(ctx: &TestContext, should_fail: bool) -> Result<(), HarnessError> {
    let client: &dyn HttpTransport = ctx.query_client();
    let request = client.new_request(Method::DELETE, &hot_tier_path(ctx), None);
    exchange(client, request, StatusExpectation::ok_unless(should_fail)).await?;
    Ok(())
}

/// Path of the context stream's hot tier.
fn hot_tier_path(ctx: &TestContext) -> String {
    format!("{}/hottier", stream_path(ctx.stream()))
}

// ============================================================================
// SECTION: Tests
// ============================================================================
