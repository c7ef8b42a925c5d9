// crates/logstream-harness/src/consistency.rs
// ============================================================================
// Module: Consistency Waiting
// Description: Ingest-to-queryable wait strategies.
// Purpose: Bridge the service's eventual-consistency window before queries.
// Dependencies: tokio
// ============================================================================

//! ## Overview
//! Freshly ingested events become queryable after a service-defined delay.
//! [`ConsistencyWait::Fixed`] sleeps once and then checks; it is simple and
//! flaky when the service is slower than the pause. [`ConsistencyWait::Poll`]
//! re-checks with doubling backoff until a deadline. Transport errors stop
//! polling immediately; only "not yet" results are retried.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::future::Future;
use std::time::Duration;
use std::time::Instant;

use tokio::time::sleep;

use crate::error::HarnessError;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default fixed pause between ingest and query.
pub const DEFAULT_CONSISTENCY_WAIT: Duration = Duration::from_secs(2);

// ============================================================================
// SECTION: Strategy
// ============================================================================

/// Bounded polling parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    /// Total time budget.
    pub timeout: Duration,
    /// Delay after the first unsuccessful attempt.
    pub initial_delay: Duration,
    /// Upper bound for a single delay.
    pub max_delay: Duration,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            initial_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(2),
        }
    }
}

impl PollPolicy {
    /// Returns the delay after `attempt` (1-based) unsuccessful attempts.
    #[must_use]
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let shift = attempt.saturating_sub(1).min(16);
        let factor = 1u32 << shift;
        self.initial_delay.saturating_mul(factor).min(self.max_delay)
    }
}

/// How the harness waits for ingested data to become queryable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsistencyWait {
    /// Sleep once, then check once.
    Fixed(Duration),
    /// Check repeatedly with backoff until the deadline.
    Poll(PollPolicy),
}

impl Default for ConsistencyWait {
    fn default() -> Self {
        Self::Fixed(DEFAULT_CONSISTENCY_WAIT)
    }
}

/// Result of one polling probe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Attempt<T> {
    /// The awaited condition holds.
    Ready(T),
    /// Not yet; carries a description of what was observed.
    Pending(String),
}

/// Sleeps for the configured fixed duration.
pub async fn pause(duration: Duration) {
    sleep(duration).await;
}

/// Runs `probe` until it reports [`Attempt::Ready`] or the policy deadline passes.
///
/// # Errors
///
/// Propagates the first error returned by `probe`; on deadline returns the
/// error built by `on_timeout` from the last observation and the elapsed time.
pub async fn poll_until<T, F, Fut, E>(
    policy: &PollPolicy,
    mut probe: F,
    on_timeout: E,
) -> Result<T, HarnessError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Attempt<T>, HarnessError>>,
    E: FnOnce(String, Duration) -> HarnessError,
{
    let start = Instant::now();
    let mut attempt = 0u32;
    loop {
        attempt = attempt.saturating_add(1);
        let last = match probe().await? {
            Attempt::Ready(value) => return Ok(value),
            Attempt::Pending(observed) => observed,
        };
        let elapsed = start.elapsed();
        if elapsed >= policy.timeout {
            return Err(on_timeout(last, elapsed));
        }
        let remaining = policy.timeout.saturating_sub(elapsed);
        sleep(policy.delay_for_attempt(attempt).min(remaining)).await;
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
