// crates/logstream-harness/src/metadata.rs
// ============================================================================
// Module: Stream Metadata
// Description: Accessor for a stream's declared configuration.
// Purpose: Expose `StreamInfo` to scenarios asserting on partitioning or cache flags.
// Dependencies: reqwest
// ============================================================================

//! ## Overview
//! Reads `GET logstream/{stream}/info` and decodes it into [`StreamInfo`].
//! Optional keys the service omits stay `None`, so scenarios can tell an
//! absent time partition or cache flag apart from an empty one.

use reqwest::Method;

use crate::assertions::StatusExpectation;
use crate::assertions::decode;
use crate::assertions::exchange;
use crate::context::TestContext;
use crate::error::HarnessError;
use crate::lifecycle::stream_path;
use crate::model::StreamInfo;

/// Fetches `GET logstream/{stream}/info` for the context stream.
///
/// # Errors
///
/// Returns the transport error, a status violation, or a decode error.
pub async fn get_stream_info(ctx: &TestContext) -> Result<StreamInfo, HarnessError> {
    let client = ctx.query_client();
    let path = format!("{}/info", stream_path(ctx.stream()));
    let request = client.new_request(Method::GET, &path, None).json();
    let response = exchange(client, request, StatusExpectation::OK).await?;
    decode(client, &response)
}
