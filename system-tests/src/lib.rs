// system-tests/src/lib.rs
// ============================================================================
// Module: Logstream System Tests Library
// Description: Shared configuration for the conformance test binaries.
// Purpose: Provide environment-backed settings for contract and live suites.
// Dependencies: logstream-harness
// ============================================================================

//! ## Overview
//! This crate hosts the shared configuration used by the system-test binaries
//! in `system-tests/tests`. The contract binary runs against an in-process
//! service emulation; the live binary targets a deployment described by
//! `LOGSTREAM_TEST_*` environment variables.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;
