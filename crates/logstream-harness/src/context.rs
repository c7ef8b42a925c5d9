// crates/logstream-harness/src/context.rs
// ============================================================================
// Module: Test Context
// Description: Shared client handles, target stream, topology, and ledger.
// Purpose: Pass run-wide state explicitly into every contract operation.
// Dependencies: std
// ============================================================================

//! ## Overview
//! A [`TestContext`] is built once per run and handed by reference to every
//! operation. It is read-only apart from [`TestContext::with_stream`], which
//! derives a copy targeting another stream for scenario isolation. The
//! [`ResourceLedger`] is the one shared mutable piece: it tracks every stream,
//! user, and role a scenario created until it is deleted.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::PoisonError;

use crate::client::HttpTransport;
use crate::consistency::ConsistencyWait;
use crate::error::HarnessError;

// ============================================================================
// SECTION: Topology
// ============================================================================

/// Deployment topology of the service under test.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Topology {
    /// One process serves ingest and query.
    Standalone,
    /// A distinct ingestor endpoint exists.
    Distributed,
}

impl Topology {
    /// Infers the topology from whether a distinct ingestor URL is configured.
    #[must_use]
    pub fn from_ingestor_url(ingestor_url: Option<&str>) -> Self {
        match ingestor_url.map(str::trim) {
            Some(url) if !url.is_empty() => Self::Distributed,
            _ => Self::Standalone,
        }
    }

    /// Returns true for distributed deployments.
    #[must_use]
    pub const fn is_distributed(self) -> bool {
        matches!(self, Self::Distributed)
    }
}

// ============================================================================
// SECTION: Resource Ledger
// ============================================================================

/// A server-side resource created by a scenario.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub enum Resource {
    /// A log stream.
    Stream(String),
    /// A user.
    User(String),
    /// A role.
    Role(String),
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stream(name) => write!(f, "stream {name}"),
            Self::User(name) => write!(f, "user {name}"),
            Self::Role(name) => write!(f, "role {name}"),
        }
    }
}

/// Tracks resources created and not yet deleted.
#[derive(Debug, Default)]
pub struct ResourceLedger {
    /// Outstanding resources.
    outstanding: Mutex<BTreeSet<Resource>>,
}

impl ResourceLedger {
    /// Creates an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a successful creation.
    pub fn created(&self, resource: Resource) {
        self.outstanding.lock().unwrap_or_else(PoisonError::into_inner).insert(resource);
    }

    /// Records a successful deletion.
    pub fn deleted(&self, resource: &Resource) {
        self.outstanding.lock().unwrap_or_else(PoisonError::into_inner).remove(resource);
    }

    /// Returns the outstanding resources in a stable order.
    #[must_use]
    pub fn outstanding(&self) -> Vec<Resource> {
        self.outstanding
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .cloned()
            .collect()
    }

    /// Fails when any created resource was never deleted.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::LeakedResources`] listing every leak.
    pub fn ensure_no_leaks(&self) -> Result<(), HarnessError> {
        let outstanding = self.outstanding();
        if outstanding.is_empty() {
            return Ok(());
        }
        let listed: Vec<String> = outstanding.iter().map(ToString::to_string).collect();
        Err(HarnessError::LeakedResources(listed.join(", ")))
    }
}

// ============================================================================
// SECTION: Context
// ============================================================================

/// Run-wide state shared by every operation.
#[derive(Clone)]
pub struct TestContext {
    /// Administrative/query client.
    query_client: Arc<dyn HttpTransport>,
    /// Ingestor client (same as the query client when standalone).
    ingestor_client: Arc<dyn HttpTransport>,
    /// Stream under test.
    stream: String,
    /// Deployment topology.
    topology: Topology,
    /// Ingest-to-queryable wait strategy.
    consistency: ConsistencyWait,
    /// Created-resource ledger.
    ledger: Arc<ResourceLedger>,
}

impl TestContext {
    /// Creates a standalone context where one client serves ingest and query.
    #[must_use]
    pub fn standalone(client: Arc<dyn HttpTransport>, stream: impl Into<String>) -> Self {
        Self {
            ingestor_client: Arc::clone(&client),
            query_client: client,
            stream: stream.into(),
            topology: Topology::Standalone,
            consistency: ConsistencyWait::default(),
            ledger: Arc::new(ResourceLedger::new()),
        }
    }

    /// Creates a distributed context with a distinct ingestor client.
    #[must_use]
    pub fn distributed(
        query_client: Arc<dyn HttpTransport>,
        ingestor_client: Arc<dyn HttpTransport>,
        stream: impl Into<String>,
    ) -> Self {
        Self {
            query_client,
            ingestor_client,
            stream: stream.into(),
            topology: Topology::Distributed,
            consistency: ConsistencyWait::default(),
            ledger: Arc::new(ResourceLedger::new()),
        }
    }

    /// Overrides the consistency wait strategy.
    #[must_use]
    pub fn with_consistency(mut self, consistency: ConsistencyWait) -> Self {
        self.consistency = consistency;
        self
    }

    /// Derives a context targeting another stream; clients and ledger are shared.
    #[must_use]
    pub fn with_stream(&self, stream: impl Into<String>) -> Self {
        let mut derived = self.clone();
        derived.stream = stream.into();
        derived
    }

    /// Returns the administrative/query client.
    #[must_use]
    pub fn query_client(&self) -> &dyn HttpTransport {
        self.query_client.as_ref()
    }

    /// Returns the ingestor client.
    #[must_use]
    pub fn ingestor_client(&self) -> &dyn HttpTransport {
        self.ingestor_client.as_ref()
    }

    /// Returns a shared handle to the query client.
    #[must_use]
    pub fn query_client_handle(&self) -> Arc<dyn HttpTransport> {
        Arc::clone(&self.query_client)
    }

    /// Returns the stream under test.
    #[must_use]
    pub fn stream(&self) -> &str {
        &self.stream
    }

    /// Returns the deployment topology.
    #[must_use]
    pub const fn topology(&self) -> Topology {
        self.topology
    }

    /// Returns the consistency wait strategy.
    #[must_use]
    pub const fn consistency(&self) -> &ConsistencyWait {
        &self.consistency
    }

    /// Returns the created-resource ledger.
    #[must_use]
    pub fn ledger(&self) -> &ResourceLedger {
        &self.ledger
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
