// crates/logstream-harness/src/names.rs
// ============================================================================
// Module: Resource Names
// Description: Collision-free names for streams, users, and roles.
// Purpose: Isolate scenarios that run in parallel against one service.
// Dependencies: rand
// ============================================================================

//! The service offers no isolation between scenarios, so parallel scenarios
//! must never share a stream, user, or role name. Names are lowercase ASCII
//! alphanumerics, which every resource kind accepts.

use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use rand::Rng;
use rand::distributions::Alphanumeric;

/// Per-process sequence mixed into every name.
static SEQUENCE: AtomicU64 = AtomicU64::new(0);

/// Length of the random suffix.
const SUFFIX_LEN: usize = 6;

/// Returns `prefix` followed by a time, sequence, and random component.
///
/// Non-alphanumeric characters in `prefix` are dropped and the result is
/// lowercased.
#[must_use]
pub fn unique_name(prefix: &str) -> String {
    let clean: String =
        prefix.chars().filter(char::is_ascii_alphanumeric).map(|ch| ch.to_ascii_lowercase()).collect();
    let millis = SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis();
    let sequence = SEQUENCE.fetch_add(1, Ordering::Relaxed);
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(SUFFIX_LEN)
        .map(|byte| char::from(byte).to_ascii_lowercase())
        .collect();
    format!("{clean}{millis:x}{sequence}{suffix}")
}
