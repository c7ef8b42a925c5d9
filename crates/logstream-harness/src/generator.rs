// crates/logstream-harness/src/generator.rs
// ============================================================================
// Module: Event Generators
// Description: Sources of synthetic access-log events for ingestion.
// Purpose: Produce N JSON events shaped like web server access logs.
// Dependencies: rand, serde_json
// ============================================================================

//! ## Overview
//! [`FlogGenerator`] shells out to the external `flog` program, the source
//! used against real deployments. [`SyntheticAccessLog`] produces the same
//! field set in-process from a seed, so runs are reproducible and need no
//! external binary.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::PathBuf;
use std::process::Command;

use rand::Rng;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde_json::Value;
use serde_json::json;

use crate::error::HarnessError;

// ============================================================================
// SECTION: Trait
// ============================================================================

/// Source of synthetic ingestion events.
pub trait EventGenerator: Send + Sync {
    /// Produces exactly `count` JSON objects.
    ///
    /// # Errors
    ///
    /// Returns [`HarnessError::Generator`] when events cannot be produced.
    fn generate(&self, count: usize) -> Result<Vec<Value>, HarnessError>;
}

/// Fields a stream fed by an [`EventGenerator`] exposes in its schema,
/// including the service-added `p_*` columns.
#[must_use]
pub const fn flog_stream_fields() -> [&'static str; 12] {
    [
        "p_timestamp",
        "p_tags",
        "p_metadata",
        "host",
        "'user-identifier'",
        "datetime",
        "method",
        "request",
        "protocol",
        "status",
        "bytes",
        "referer",
    ]
}

// ============================================================================
// SECTION: flog
// ============================================================================

/// Runs `flog -f json -n <count>` and parses one object per output line.
#[derive(Debug, Clone)]
pub struct FlogGenerator {
    /// Program to execute.
    program: PathBuf,
}

impl Default for FlogGenerator {
    fn default() -> Self {
        Self {
            program: PathBuf::from("flog"),
        }
    }
}

impl FlogGenerator {
    /// Uses a specific `flog` binary.
    #[must_use]
    pub fn with_program(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl EventGenerator for FlogGenerator {
    fn generate(&self, count: usize) -> Result<Vec<Value>, HarnessError> {
        let output = Command::new(&self.program)
            .args(["-f", "json", "-n", &count.to_string()])
            .output()
            .map_err(|err| {
                HarnessError::Generator(format!("failed to run {}: {err}", self.program.display()))
            })?;
        if !output.status.success() {
            return Err(HarnessError::Generator(format!(
                "{} exited with {}: {}",
                self.program.display(),
                output.status,
                String::from_utf8_lossy(&output.stderr)
            )));
        }
        let stdout = String::from_utf8_lossy(&output.stdout);
        let events = stdout
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(|line| {
                serde_json::from_str::<Value>(line)
                    .map_err(|err| HarnessError::Generator(format!("invalid flog line: {err}")))
            })
            .collect::<Result<Vec<_>, _>>()?;
        if events.len() != count {
            return Err(HarnessError::Generator(format!(
                "flog produced {} events, expected {count}",
                events.len()
            )));
        }
        Ok(events)
    }
}

// ============================================================================
// SECTION: In-Process Generator
// ============================================================================

/// Request methods sampled by [`SyntheticAccessLog`].
const METHODS: &[&str] = &["GET", "POST", "PUT", "DELETE", "PATCH", "HEAD"];
/// Status codes sampled by [`SyntheticAccessLog`].
const STATUSES: &[u16] = &[200, 201, 204, 301, 302, 400, 401, 403, 404, 500, 502, 503];
/// Protocols sampled by [`SyntheticAccessLog`].
const PROTOCOLS: &[&str] = &["HTTP/1.0", "HTTP/1.1", "HTTP/2.0"];
/// Path segments sampled by [`SyntheticAccessLog`].
const SEGMENTS: &[&str] =
    &["api", "users", "orders", "checkout", "assets", "search", "v1", "v2", "health", "reports"];

/// Deterministic flog-shaped event source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SyntheticAccessLog {
    /// RNG seed.
    seed: u64,
}

impl SyntheticAccessLog {
    /// Creates a generator seeded with `seed`.
    #[must_use]
    pub const fn new(seed: u64) -> Self {
        Self {
            seed,
        }
    }
}

impl Default for SyntheticAccessLog {
    fn default() -> Self {
        Self::new(0x5eed)
    }
}

impl EventGenerator for SyntheticAccessLog {
    fn generate(&self, count: usize) -> Result<Vec<Value>, HarnessError> {
        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut events = Vec::with_capacity(count);
        for _ in 0..count {
            events.push(access_log_event(&mut rng));
        }
        Ok(events)
    }
}

/// Builds one access-log event.
fn access_log_event(rng: &mut StdRng) -> Value {
    let host = format!(
        "{}.{}.{}.{}",
        rng.gen_range(1..=254),
        rng.gen_range(0..=255),
        rng.gen_range(0..=255),
        rng.gen_range(1..=254)
    );
    let user = if rng.gen_bool(0.5) { "-".to_string() } else { format!("user{}", rng.gen_range(1..=999)) };
    let depth = rng.gen_range(1..=3);
    let request: String = (0..depth)
        .map(|_| format!("/{}", SEGMENTS.choose(rng).copied().unwrap_or("api")))
        .collect();
    json!({
        "host": host,
        "user-identifier": user,
        "datetime": format!(
            "{:02}/Mar/2024:{:02}:{:02}:{:02} +0000",
            rng.gen_range(1..=28),
            rng.gen_range(0..24),
            rng.gen_range(0..60),
            rng.gen_range(0..60)
        ),
        "method": METHODS.choose(rng).copied().unwrap_or("GET"),
        "request": request,
        "protocol": PROTOCOLS.choose(rng).copied().unwrap_or("HTTP/1.1"),
        "status": STATUSES.choose(rng).copied().unwrap_or(200),
        "bytes": rng.gen_range(0..50_000),
        "referer": format!("https://www.example{}.com{}", rng.gen_range(1..=50), request),
    })
}

// ============================================================================
// SECTION: Tests
// ============================================================================
