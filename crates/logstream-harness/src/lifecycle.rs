// crates/logstream-harness/src/lifecycle.rs
// ============================================================================
// Module: Resource Lifecycle
// Description: Create/delete operations for streams, users, and roles.
// Purpose: Set up and tear down scenario state with one request per call.
// Dependencies: reqwest, serde_json
// ============================================================================

//! ## Overview
//! Each operation issues exactly one request and requires `200 OK`. Nothing
//! is retried. Creations are registered in the context's
//! [`crate::ResourceLedger`] and deletions release them, so a scenario that
//! forgets its teardown is caught by [`crate::ResourceLedger::ensure_no_leaks`].
//!
//! The client is passed separately from the context because the same
//! operation is issued as different principals: an administrator creating a
//! stream is a different contract from an ingestor creating one.

// ============================================================================
// SECTION: Imports
// ============================================================================

use reqwest::Method;
use serde::Serialize;

use crate::assertions::StatusExpectation;
use crate::assertions::call;
use crate::assertions::exchange;
use crate::assertions::expect_body;
use crate::assertions::expect_json;
use crate::client::HttpTransport;
use crate::context::Resource;
use crate::context::TestContext;
use crate::error::HarnessError;
use crate::model::StreamOptions;
use crate::model::static_schema_document;

// ============================================================================
// SECTION: Streams
// ============================================================================

/// Creates a stream with no schema and no extra headers.
///
/// # Errors
///
/// Returns the transport error or a status violation.
pub async fn create_stream(
    ctx: &TestContext,
    client: &dyn HttpTransport,
    stream: &str,
) -> Result<(), HarnessError> {
    create_stream_with_options(ctx, client, stream, &StreamOptions::default()).await
}

/// Creates a stream with the given raw headers.
///
/// # Errors
///
/// Returns an invalid-header error, the transport error, or a status violation.
pub async fn create_stream_with_headers(
    ctx: &TestContext,
    client: &dyn HttpTransport,
    stream: &str,
    headers: &[(&str, &str)],
) -> Result<(), HarnessError> {
    let options = headers
        .iter()
        .fold(StreamOptions::default(), |options, (name, value)| options.header(*name, *value));
    create_stream_with_options(ctx, client, stream, &options).await
}

/// Creates a stream whose body is the fixed field-schema document.
///
/// # Errors
///
/// Returns an invalid-header error, the transport error, or a status violation.
pub async fn create_stream_with_schema_body(
    ctx: &TestContext,
    client: &dyn HttpTransport,
    stream: &str,
    headers: &[(&str, &str)],
) -> Result<(), HarnessError> {
    let mut options = StreamOptions {
        schema: Some(static_schema_document()),
        ..StreamOptions::default()
    };
    for (name, value) in headers {
        options = options.header(*name, *value);
    }
    create_stream_with_options(ctx, client, stream, &options).await
}

/// Creates a stream with declared partitioning/schema options.
///
/// # Errors
///
/// Returns an invalid-header error, the transport error, or a status violation.
pub async fn create_stream_with_options(
    ctx: &TestContext,
    client: &dyn HttpTransport,
    stream: &str,
    options: &StreamOptions,
) -> Result<(), HarnessError> {
    let body = options.schema.as_ref().map(|schema| schema.to_string().into_bytes());
    let mut request = client.new_request(Method::PUT, &stream_path(stream), body);
    if options.schema.is_some() {
        request = request.json();
    }
    for (name, value) in options.headers() {
        request = request.header(&name, &value)?;
    }
    exchange(client, request, StatusExpectation::OK).await?;
    ctx.ledger().created(Resource::Stream(stream.to_string()));
    Ok(())
}

/// Deletes a stream.
///
/// # Errors
///
/// Returns the transport error or a status violation.
pub async fn delete_stream(
    ctx: &TestContext,
    client: &dyn HttpTransport,
    stream: &str,
) -> Result<(), HarnessError> {
    call(client, Method::DELETE, &stream_path(stream), None, StatusExpectation::OK).await?;
    ctx.ledger().deleted(&Resource::Stream(stream.to_string()));
    Ok(())
}

// ============================================================================
// SECTION: Roles
// ============================================================================

/// Creates (or replaces) a role from an opaque role document.
///
/// # Errors
///
/// Returns the transport error or a status violation.
pub async fn create_role(
    ctx: &TestContext,
    client: &dyn HttpTransport,
    name: &str,
    role: &str,
) -> Result<(), HarnessError> {
    let request =
        client.new_request(Method::PUT, &role_path(name), Some(role.as_bytes().to_vec())).json();
    exchange(client, request, StatusExpectation::OK).await?;
    ctx.ledger().created(Resource::Role(name.to_string()));
    Ok(())
}

/// Reads a role back and requires it to be JSON-equal to `role`.
///
/// # Errors
///
/// Returns the transport error, a status violation, or a JSON mismatch.
pub async fn assert_role(
    client: &dyn HttpTransport,
    name: &str,
    role: &str,
) -> Result<(), HarnessError> {
    let response = call(client, Method::GET, &role_path(name), None, StatusExpectation::OK).await?;
    expect_json(client, &response, role)
}

/// Deletes a role.
///
/// # Errors
///
/// Returns the transport error or a status violation.
pub async fn delete_role(
    ctx: &TestContext,
    client: &dyn HttpTransport,
    name: &str,
) -> Result<(), HarnessError> {
    call(client, Method::DELETE, &role_path(name), None, StatusExpectation::OK).await?;
    ctx.ledger().deleted(&Resource::Role(name.to_string()));
    Ok(())
}

/// Sets the service-wide default role.
///
/// # Errors
///
/// Returns the transport error or a status violation.
pub async fn set_default_role(client: &dyn HttpTransport, name: &str) -> Result<(), HarnessError> {
    let body = json_body(&name)?;
    let request = client.new_request(Method::PUT, "role/default", Some(body)).json();
    exchange(client, request, StatusExpectation::OK).await?;
    Ok(())
}

/// Reads the default role and requires the body to be exactly `name`.
///
/// # Errors
///
/// Returns the transport error, a status violation, or a body mismatch.
pub async fn assert_default_role(
    client: &dyn HttpTransport,
    name: &str,
) -> Result<(), HarnessError> {
    let response = call(client, Method::GET, "role/default", None, StatusExpectation::OK).await?;
    expect_body(client, &response, name)
}

// ============================================================================
// SECTION: Users
// ============================================================================

/// Creates a user with no roles and returns the generated credential body.
///
/// # Errors
///
/// Returns the transport error or a status violation.
pub async fn create_user(
    ctx: &TestContext,
    client: &dyn HttpTransport,
    user: &str,
) -> Result<String, HarnessError> {
    let response = call(client, Method::POST, &user_path(user), None, StatusExpectation::OK).await?;
    ctx.ledger().created(Resource::User(user.to_string()));
    Ok(response.into_body())
}

/// Creates a user bound to `roles` and returns the generated credential body.
///
/// # Errors
///
/// Returns the transport error or a status violation.
pub async fn create_user_with_roles(
    ctx: &TestContext,
    client: &dyn HttpTransport,
    user: &str,
    roles: &[&str],
) -> Result<String, HarnessError> {
    let body = json_body(&roles)?;
    let request = client.new_request(Method::POST, &user_path(user), Some(body)).json();
    let response = exchange(client, request, StatusExpectation::OK).await?;
    ctx.ledger().created(Resource::User(user.to_string()));
    Ok(response.into_body())
}

/// Replaces a user's roles.
///
/// # Errors
///
/// Returns the transport error or a status violation.
pub async fn assign_roles(
    client: &dyn HttpTransport,
    user: &str,
    roles: &[&str],
) -> Result<(), HarnessError> {
    let body = json_body(&roles)?;
    let path = format!("{}/role", user_path(user));
    let request = client.new_request(Method::PUT, &path, Some(body)).json();
    exchange(client, request, StatusExpectation::OK).await?;
    Ok(())
}

/// Requires the user's role mapping to be exactly `{role_name: role_body}`.
///
/// # Errors
///
/// Returns the transport error, a status violation, or a JSON mismatch.
pub async fn assert_user_role(
    client: &dyn HttpTransport,
    user: &str,
    role_name: &str,
    role_body: &str,
) -> Result<(), HarnessError> {
    let path = format!("{}/role", user_path(user));
    let response = call(client, Method::GET, &path, None, StatusExpectation::OK).await?;
    let role_key = serde_json::to_string(role_name)
        .map_err(|err| HarnessError::InvalidRequest(format!("role name encoding: {err}")))?;
    let expected = format!("{{{role_key}:{role_body}}}");
    expect_json(client, &response, &expected)
}

/// Regenerates a user's password and returns the new credential body.
///
/// # Errors
///
/// Returns the transport error or a status violation.
pub async fn regenerate_password(
    client: &dyn HttpTransport,
    user: &str,
) -> Result<String, HarnessError> {
    let path = format!("{}/generate-new-password", user_path(user));
    let response = call(client, Method::POST, &path, None, StatusExpectation::OK).await?;
    Ok(response.into_body())
}

/// Deletes a user.
///
/// # Errors
///
/// Returns the transport error or a status violation.
pub async fn delete_user(
    ctx: &TestContext,
    client: &dyn HttpTransport,
    user: &str,
) -> Result<(), HarnessError> {
    call(client, Method::DELETE, &user_path(user), None, StatusExpectation::OK).await?;
    ctx.ledger().deleted(&Resource::User(user.to_string()));
    Ok(())
}

// ============================================================================
// SECTION: Paths
// ============================================================================

/// Path of a stream resource.
#[must_use]
pub fn stream_path(stream: &str) -> String {
    format!("logstream/{stream}")
}

/// Path of a role resource.
fn role_path(name: &str) -> String {
    format!("role/{name}")
}

/// Path of a user resource.
fn user_path(user: &str) -> String {
    format!("user/{user}")
}

/// Serializes a request body.
fn json_body<T: Serialize + ?Sized>(value: &T) -> Result<Vec<u8>, HarnessError> {
    serde_json::to_vec(value)
        .map_err(|err| HarnessError::InvalidRequest(format!("body encoding: {err}")))
}

// ============================================================================
// SECTION: Tests
// ============================================================================
