// system-tests/tests/helpers/harness.rs
// ============================================================================
// Module: Contract Harness
// Description: Wires harness clients to an in-process service emulation.
// Purpose: Provide deterministic per-test service startup and teardown.
// Dependencies: logstream-harness, tokio
// ============================================================================

use std::error::Error;
use std::sync::Arc;
use std::time::Duration;

use logstream_harness::ClientConfig;
use logstream_harness::ConsistencyWait;
use logstream_harness::Credentials;
use logstream_harness::HttpTransport;
use logstream_harness::ServiceClient;
use logstream_harness::TestContext;
use logstream_harness::Topology;
use logstream_harness::audit::ExchangeSink;
use logstream_harness::audit::MemoryExchangeSink;
use logstream_harness::consistency::PollPolicy;
use logstream_harness::names::unique_name;

use super::artifacts::TestReporter;
use super::mock_service::MockServiceConfig;
use super::mock_service::MockServiceHandle;
use super::mock_service::spawn_mock_service;
use super::timeouts::resolve_timeout;

/// Request timeout for clients talking to the emulation.
const CONTRACT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Emulated service plus a context whose clients record into memory.
pub struct ContractHarness {
    service: MockServiceHandle,
    sink: Arc<MemoryExchangeSink>,
    ctx: TestContext,
}

impl ContractHarness {
    /// Spawns a standalone emulation; the context targets a fresh stream name.
    pub fn standalone(prefix: &str) -> Result<Self, String> {
        Self::spawn(Topology::Standalone, prefix)
    }

    /// Spawns a distributed emulation with distinct query and ingestor clients.
    pub fn distributed(prefix: &str) -> Result<Self, String> {
        Self::spawn(Topology::Distributed, prefix)
    }

    fn spawn(topology: Topology, prefix: &str) -> Result<Self, String> {
        let config = MockServiceConfig::new(topology);
        let credentials = Credentials::new(&config.admin_username, &config.admin_password);
        let service = spawn_mock_service(config)?;
        let sink = Arc::new(MemoryExchangeSink::new());
        let timeout = resolve_timeout(CONTRACT_REQUEST_TIMEOUT)?;
        let client = |label: &str| {
            admin_client(service.base_url(), label, &credentials, timeout, &sink)
        };
        let stream = unique_name(prefix);
        let ctx = match topology {
            Topology::Standalone => TestContext::standalone(client("query")?, stream),
            Topology::Distributed => {
                TestContext::distributed(client("query")?, client("ingestor")?, stream)
            }
        }
        .with_consistency(ConsistencyWait::Poll(PollPolicy {
            timeout: Duration::from_secs(5),
            initial_delay: Duration::from_millis(10),
            max_delay: Duration::from_millis(100),
        }));
        Ok(Self {
            service,
            sink,
            ctx,
        })
    }

    /// Returns the scenario context.
    pub fn ctx(&self) -> &TestContext {
        &self.ctx
    }

    /// Returns the admin query client.
    pub fn admin(&self) -> &dyn HttpTransport {
        self.ctx.query_client()
    }

    /// Returns the emulation handle for server-side inspection.
    pub fn service(&self) -> &MockServiceHandle {
        &self.service
    }

    /// Returns the recorded exchange transcript.
    pub fn sink(&self) -> &MemoryExchangeSink {
        &self.sink
    }

    /// Requires a balanced ledger and no server-side leftovers, then reports a pass.
    pub fn finish(&self, reporter: &mut TestReporter, notes: Vec<String>) -> Result<(), Box<dyn Error>> {
        self.ctx.ledger().ensure_no_leaks()?;
        let leftovers = [
            self.service.stream_names(),
            self.service.user_names(),
            self.service.role_names(),
        ]
        .concat();
        if !leftovers.is_empty() {
            return Err(format!("service still holds: {}", leftovers.join(", ")).into());
        }
        finish_report(reporter, &self.sink, notes)
    }
}

/// Writes the transcript and a passing summary.
pub fn finish_report(
    reporter: &mut TestReporter,
    sink: &MemoryExchangeSink,
    notes: Vec<String>,
) -> Result<(), Box<dyn Error>> {
    let mut artifacts = vec!["summary.json".to_string(), "summary.md".to_string()];
    artifacts.extend(reporter.artifacts().write_transcript(sink)?);
    reporter.finish("pass", notes, artifacts)?;
    Ok(())
}

fn admin_client(
    base_url: &str,
    label: &str,
    credentials: &Credentials,
    timeout: Duration,
    sink: &Arc<MemoryExchangeSink>,
) -> Result<Arc<dyn HttpTransport>, String> {
    let config = ClientConfig::new(base_url, label)
        .with_credentials(credentials.clone())
        .with_timeout(timeout);
    let sink: Arc<dyn ExchangeSink> = Arc::clone(sink) as Arc<dyn ExchangeSink>;
    let client = ServiceClient::new(config).map_err(|err| err.to_string())?.with_sink(sink);
    Ok(Arc::new(client))
}
