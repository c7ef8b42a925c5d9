// crates/logstream-harness/src/validation.rs
// ============================================================================
// Module: Ingest Validation Scenarios
// Description: Fixed payloads probing time-partition and static-schema rules.
// Purpose: Assert the accept/reject boundary of the ingestion path.
// Dependencies: reqwest
// ============================================================================

//! ## Overview
//! Each scenario posts one literal event to `POST ingest` and requires a fixed
//! status. Partitioned streams only enforce the time-partition field; static
//! streams enforce the declared field set exactly. The payloads are kept
//! verbatim so that a failure always refers to the same bytes on the wire.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::assertions::StatusExpectation;
use crate::client::HttpTransport;
use crate::error::HarnessError;
use crate::ingest::ingest_raw;

// ============================================================================
// SECTION: Payloads
// ============================================================================

/// Valid date-time far outside any recent partition window, plus a field
/// no schema declares.
const TIME_PARTITION_MISMATCH: &str = r#"{"source_time":"2024-03-26T18:08:00.434Z","level":"info","message":"Application is failing","version":"1.2.0","user_id":13912,"device_id":4138,"session_id":"abc","os":"Windows","host":"112.168.1.110","location":"ngeuprqhynuvpxgp","request_body":"rnkmffyawtdcindtrdqruyxbndbjpfsptzpwtujbmkwcqastmxwbvjwphmyvpnhordwljnodxhtvpjesjldtifswqbpyuhlcytmm","status_code":300,"app_meta":"ckgpibhmlusqqfunnpxbfxbc", "new_field_added_by":"ingestor 8020"}"#;

/// Same event without `source_time`.
const MISSING_TIME_PARTITION: &str = r#"{"level":"info","message":"Application is failing","version":"1.2.0","user_id":13912,"device_id":4138,"session_id":"abc","os":"Windows","host":"112.168.1.110","location":"ngeuprqhynuvpxgp","request_body":"rnkmffyawtdcindtrdqruyxbndbjpfsptzpwtujbmkwcqastmxwbvjwphmyvpnhordwljnodxhtvpjesjldtifswqbpyuhlcytmm","status_code":300,"app_meta":"ckgpibhmlusqqfunnpxbfxbc", "new_field_added_by":"ingestor 8020"}"#;

/// `source_time` is a bare date, not a date-time.
const MALFORMED_TIME_PARTITION: &str = r#"{"source_time":"2024-03-26", "level":"info","message":"Application is failing","version":"1.2.0","user_id":13912,"device_id":4138,"session_id":"abc","os":"Windows","host":"112.168.1.110","location":"ngeuprqhynuvpxgp","request_body":"rnkmffyawtdcindtrdqruyxbndbjpfsptzpwtujbmkwcqastmxwbvjwphmyvpnhordwljnodxhtvpjesjldtifswqbpyuhlcytmm","status_code":300,"app_meta":"ckgpibhmlusqqfunnpxbfxbc", "new_field_added_by":"ingestor 8020"}"#;

/// Declared fields plus `new_field_added_by`.
const STATIC_SCHEMA_NEW_FIELD: &str = MALFORMED_TIME_PARTITION;

/// Declared fields only.
const STATIC_SCHEMA_SAME_FIELDS: &str = r#"{"source_time":"2024-03-26", "level":"info","message":"Application is failing","version":"1.2.0","user_id":13912,"device_id":4138,"session_id":"abc","os":"Windows","host":"112.168.1.110","location":"ngeuprqhynuvpxgp","request_body":"rnkmffyawtdcindtrdqruyxbndbjpfsptzpwtujbmkwcqastmxwbvjwphmyvpnhordwljnodxhtvpjesjldtifswqbpyuhlcytmm","status_code":300,"app_meta":"ckgpibhmlusqqfunnpxbfxbc"}"#;

// ============================================================================
// SECTION: Scenarios
// ============================================================================

/// One ingestion validation rule and its expected outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationScenario {
    /// Time-partition value outside the stream's tolerance.
    TimePartitionMismatch,
    /// Time-partition field missing.
    MissingTimePartition,
    /// Time-partition value is not a date-time.
    MalformedTimePartition,
    /// Static-schema stream receives an undeclared field.
    StaticSchemaNewField,
    /// Static-schema stream receives exactly its declared fields.
    StaticSchemaSameFields,
}

impl ValidationScenario {
    /// Every scenario, partitioned-stream rules first.
    pub const ALL: [Self; 5] = [
        Self::TimePartitionMismatch,
        Self::MissingTimePartition,
        Self::MalformedTimePartition,
        Self::StaticSchemaNewField,
        Self::StaticSchemaSameFields,
    ];

    /// Literal request body.
    #[must_use]
    pub const fn payload(self) -> &'static str {
        match self {
            Self::TimePartitionMismatch => TIME_PARTITION_MISMATCH,
            Self::MissingTimePartition => MISSING_TIME_PARTITION,
            Self::MalformedTimePartition => MALFORMED_TIME_PARTITION,
            Self::StaticSchemaNewField => STATIC_SCHEMA_NEW_FIELD,
            Self::StaticSchemaSameFields => STATIC_SCHEMA_SAME_FIELDS,
        }
    }

    /// Status the service must answer with.
    #[must_use]
    pub const fn expected(self) -> StatusExpectation {
        match self {
            Self::StaticSchemaSameFields => StatusExpectation::OK,
            _ => StatusExpectation::BAD_REQUEST,
        }
    }

    /// Returns true for rules that only apply to static-schema streams.
    #[must_use]
    pub const fn requires_static_schema(self) -> bool {
        matches!(self, Self::StaticSchemaNewField | Self::StaticSchemaSameFields)
    }
}

/// Posts the scenario's payload to `stream` and checks the outcome.
///
/// # Errors
///
/// Returns the transport error or a status violation.
pub async fn run_scenario(
    client: &dyn HttpTransport,
    stream: &str,
    scenario: ValidationScenario,
) -> Result<(), HarnessError> {
    ingest_raw(client, stream, scenario.payload(), scenario.expected()).await?;
    Ok(())
}

/// An out-of-window time-partition value is rejected with `400`.
///
/// # Errors
///
/// Returns the transport error or a status violation.
pub async fn ingest_time_partition_mismatch(
    client: &dyn HttpTransport,
    stream: &str,
) -> Result<(), HarnessError> {
    run_scenario(client, stream, ValidationScenario::TimePartitionMismatch).await
}

/// An event without the time-partition field is rejected with `400`.
///
/// # Errors
///
/// Returns the transport error or a status violation.
pub async fn ingest_missing_time_partition(
    client: &dyn HttpTransport,
    stream: &str,
) -> Result<(), HarnessError> {
    run_scenario(client, stream, ValidationScenario::MissingTimePartition).await
}

/// A time-partition value that is not a date-time is rejected with `400`.
///
/// # Errors
///
/// Returns the transport error or a status violation.
pub async fn ingest_malformed_time_partition(
    client: &dyn HttpTransport,
    stream: &str,
) -> Result<(), HarnessError> {
    run_scenario(client, stream, ValidationScenario::MalformedTimePartition).await
}

/// An undeclared field on a static-schema stream is rejected with `400`.
///
/// # Errors
///
/// Returns the transport error or a status violation.
pub async fn ingest_static_schema_new_field(
    client: &dyn HttpTransport,
    stream: &str,
) -> Result<(), HarnessError> {
    run_scenario(client, stream, ValidationScenario::StaticSchemaNewField).await
}

/// Declared fields on a static-schema stream are accepted with `200`.
///
/// # Errors
///
/// Returns the transport error or a status violation.
pub async fn ingest_static_schema_same_fields(
    client: &dyn HttpTransport,
    stream: &str,
) -> Result<(), HarnessError> {
    run_scenario(client, stream, ValidationScenario::StaticSchemaSameFields).await
}

// ============================================================================
// SECTION: Tests
// ============================================================================
