// crates/logstream-harness/src/rbac.rs
// ============================================================================
// Module: RBAC Verification
// Description: Role-keyed probe sequences for least-privilege checks.
// Purpose: Assert what each built-in privilege may and may not do to a stream.
// Dependencies: reqwest, serde_json
// ============================================================================

//! ## Overview
//! Every probed role reads, only the ingestor writes, and none deletes. The
//! check is a mapping from [`ProbeRole`] to an ordered list of [`ProbeStep`]s,
//! each of which carries its own expected status. The delete probe is always
//! last so a role that wrongly holds delete authority removes the stream only
//! after every other step has run.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use reqwest::Method;
use serde_json::Value;
use serde_json::json;

use crate::assertions::StatusExpectation;
use crate::assertions::call;
use crate::client::Credentials;
use crate::client::HttpTransport;
use crate::context::TestContext;
use crate::error::HarnessError;
use crate::ingest::put_single_event;
use crate::lifecycle::create_role;
use crate::lifecycle::create_user_with_roles;
use crate::lifecycle::stream_path;

// ============================================================================
// SECTION: Roles
// ============================================================================

/// Built-in privilege levels covered by the access check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProbeRole {
    /// Manages streams and users below admin level.
    Editor,
    /// Reads and writes a stream.
    Writer,
    /// Reads a stream.
    Reader,
    /// Ingests into a stream.
    Ingestor,
}

impl ProbeRole {
    /// Every probed role.
    pub const ALL: [Self; 4] = [Self::Editor, Self::Writer, Self::Reader, Self::Ingestor];

    /// Privilege name as the service spells it.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Editor => "editor",
            Self::Writer => "writer",
            Self::Reader => "reader",
            Self::Ingestor => "ingestor",
        }
    }
}

impl fmt::Display for ProbeRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProbeRole {
    type Err = HarnessError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "editor" => Ok(Self::Editor),
            "writer" => Ok(Self::Writer),
            "reader" => Ok(Self::Reader),
            "ingestor" => Ok(Self::Ingestor),
            other => Err(HarnessError::InvalidRequest(format!("unknown probe role {other:?}"))),
        }
    }
}

/// Role document granting `role` on `stream`.
///
/// The editor privilege is service-wide and carries no resource.
#[must_use]
pub fn role_document(role: ProbeRole, stream: &str) -> Value {
    match role {
        ProbeRole::Editor => json!([{ "privilege": role.as_str() }]),
        _ => json!([{ "privilege": role.as_str(), "resource": { "stream": stream } }]),
    }
}

// ============================================================================
// SECTION: Probe Plan
// ============================================================================

/// One request of an access check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeStep {
    /// `GET liveness`, open to everyone.
    Liveness,
    /// `GET logstream`, granted to every probed role.
    ListStreams,
    /// Single-event ingest into the target stream.
    IngestOneEvent,
    /// `DELETE logstream/{stream}`, denied to every probed role.
    DeleteStreamForbidden,
}

impl ProbeStep {
    /// Status the step must produce.
    #[must_use]
    pub const fn expected(self) -> StatusExpectation {
        match self {
            Self::Liveness | Self::ListStreams | Self::IngestOneEvent => StatusExpectation::OK,
            Self::DeleteStreamForbidden => StatusExpectation::FORBIDDEN,
        }
    }
}

/// Ordered probe sequence for `role`.
#[must_use]
pub fn probe_plan(role: ProbeRole) -> Vec<ProbeStep> {
    let mut steps = vec![ProbeStep::Liveness, ProbeStep::ListStreams];
    if role == ProbeRole::Ingestor {
        steps.push(ProbeStep::IngestOneEvent);
    }
    steps.push(ProbeStep::DeleteStreamForbidden);
    steps
}

// ============================================================================
// SECTION: Operations
// ============================================================================

/// Runs the probe plan for `role` with a client authenticated as that role.
///
/// # Errors
///
/// Returns the first transport error or status violation.
pub async fn check_api_access(
    client: &dyn HttpTransport,
    stream: &str,
    role: ProbeRole,
) -> Result<(), HarnessError> {
    for step in probe_plan(role) {
        run_step(client, stream, step).await?;
    }
    Ok(())
}

/// Issues one probe.
async fn run_step(
    client: &dyn HttpTransport,
    stream: &str,
    step: ProbeStep,
) -> Result<(), HarnessError> {
    match step {
        ProbeStep::Liveness => {
            call(client, Method::GET, "liveness", None, step.expected()).await?;
        }
        ProbeStep::ListStreams => {
            call(client, Method::GET, "logstream", None, step.expected()).await?;
        }
        ProbeStep::IngestOneEvent => put_single_event(client, stream).await?,
        ProbeStep::DeleteStreamForbidden => {
            call(client, Method::DELETE, &stream_path(stream), None, step.expected()).await?;
        }
    }
    Ok(())
}

/// Creates `role_name` granting `role` on `stream`, creates `user` bound to it,
/// and returns a client authenticated as that user.
///
/// # Errors
///
/// Returns the first transport error or status violation, or a config error
/// when the derived client cannot be built.
pub async fn provision_role_user(
    ctx: &TestContext,
    admin: &dyn HttpTransport,
    role_name: &str,
    user: &str,
    role: ProbeRole,
    stream: &str,
) -> Result<Arc<dyn HttpTransport>, HarnessError> {
    create_role(ctx, admin, role_name, &role_document(role, stream).to_string()).await?;
    let password = create_user_with_roles(ctx, admin, user, &[role_name]).await?;
    admin.with_credentials(Credentials::new(user, password.trim()))
}

// ============================================================================
// SECTION: Tests
// ============================================================================
