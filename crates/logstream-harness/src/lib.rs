// crates/logstream-harness/src/lib.rs
// ============================================================================
// Module: Logstream Harness Library
// Description: Behavioral conformance operations for a log ingestion service.
// Purpose: Drive the service HTTP API and assert its observable contract.
// Dependencies: reqwest, serde, thiserror, time, tokio
// ============================================================================

//! ## Overview
//! This crate encodes the HTTP contract of a multi-tenant log ingestion and
//! query service as fail-fast operations: stream/user/role lifecycle,
//! ingestion validation rules, query counts, role-based access probes, hot-tier
//! lifecycle, and stream metadata reads.
//!
//! Every operation takes an explicit [`TestContext`] and/or client handle,
//! issues its requests sequentially, and returns the first contract violation
//! as a [`HarnessError`]. Nothing is retried.
//!
//! Invariants:
//! - A non-matching status or body ends the scenario with full diagnostics.
//! - Every created stream, user, and role is tracked until deleted.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod assertions;
pub mod audit;
pub mod client;
pub mod consistency;
pub mod context;
pub mod error;
pub mod generator;
pub mod hot_tier;
pub mod ingest;
pub mod lifecycle;
pub mod metadata;
pub mod model;
pub mod names;
pub mod query;
pub mod rbac;
pub mod validation;

#[cfg(test)]
mod test_support;

// ============================================================================
// SECTION: Re-exports
// ============================================================================

pub use client::ApiRequest;
pub use client::ApiResponse;
pub use client::ClientConfig;
pub use client::Credentials;
pub use client::HttpTransport;
pub use client::ServiceClient;
pub use consistency::ConsistencyWait;
pub use context::ResourceLedger;
pub use context::TestContext;
pub use context::Topology;
pub use error::HarnessError;
pub use model::HotTierDescriptor;
pub use model::StreamInfo;
pub use model::StreamOptions;
