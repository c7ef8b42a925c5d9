// crates/logstream-harness/src/model.rs
// ============================================================================
// Module: Wire Model
// Description: JSON documents and headers exchanged with the service.
// Purpose: Type the hot-tier, stream-info, and query payloads.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! Optional fields are `Option` with `#[serde(default)]`, so an absent key
//! decodes to `None` while a present-but-empty string stays `Some("")`.
//! Callers can therefore tell "not reported" from "reported as empty".

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;
use serde_json::json;

// ============================================================================
// SECTION: Headers
// ============================================================================

/// Header naming the target stream on `POST ingest`.
pub const STREAM_HEADER: &str = "X-P-Stream";
/// Header declaring a stream's time-partition field.
pub const TIME_PARTITION_HEADER: &str = "X-P-Time-Partition";
/// Header declaring how far from now a time-partition value may be.
pub const TIME_PARTITION_LIMIT_HEADER: &str = "X-P-Time-Partition-Limit";
/// Header declaring a stream's custom partition fields.
pub const CUSTOM_PARTITION_HEADER: &str = "X-P-Custom-Partition";
/// Header marking a stream's schema as fixed at creation.
pub const STATIC_SCHEMA_HEADER: &str = "X-P-Static-Schema-Flag";

/// Hot-tier size requested when the caller does not supply one.
pub const DEFAULT_HOT_TIER_SIZE: &str = "20 GiB";

// ============================================================================
// SECTION: Documents
// ============================================================================

/// Declared and observed state of a stream's hot-tier cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HotTierDescriptor {
    /// Declared size, human readable (for example `20 GiB`).
    pub size: String,
    /// Bytes in use, once the server has accounted usage.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub used_size: Option<String>,
    /// Bytes still available, once the server has accounted usage.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub available_size: Option<String>,
    /// Timestamp of the oldest cached entry.
    #[serde(default, rename = "oldest_date_time_entry", skip_serializing_if = "Option::is_none")]
    pub oldest_entry_timestamp: Option<String>,
}

impl HotTierDescriptor {
    /// Creates an activation request for `size`.
    #[must_use]
    pub fn with_size(size: impl Into<String>) -> Self {
        Self {
            size: size.into(),
            used_size: None,
            available_size: None,
            oldest_entry_timestamp: None,
        }
    }

    /// Placeholder returned when a tier was expected to be absent.
    #[must_use]
    pub fn absent() -> Self {
        Self::with_size("0")
    }
}

/// Snapshot of a stream's declared configuration and first-ingest time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamInfo {
    /// Creation timestamp.
    #[serde(rename = "created-at")]
    pub created_at: String,
    /// Time of the first ingested event, if any.
    #[serde(default, rename = "first-event-at")]
    pub first_event_at: Option<String>,
    /// Hot-tier/cache flag.
    #[serde(default)]
    pub cache_enabled: Option<bool>,
    /// Declared time-partition field.
    #[serde(default, rename = "time_partition")]
    pub time_partition_field: Option<String>,
    /// Declared time-partition tolerance.
    #[serde(default)]
    pub time_partition_limit: Option<String>,
    /// Declared custom partition fields.
    #[serde(default, rename = "custom_partition")]
    pub custom_partition_fields: Option<String>,
    /// Static schema flag as reported by the server.
    #[serde(default)]
    pub static_schema_flag: Option<String>,
}

/// Body of `POST query`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryRequest {
    /// SQL text.
    pub query: String,
    /// Inclusive window start (RFC 3339).
    pub start_time: String,
    /// Exclusive window end (RFC 3339).
    pub end_time: String,
}

// ============================================================================
// SECTION: Stream Options
// ============================================================================

/// Declared configuration for a stream at creation time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StreamOptions {
    /// Time-partition field name.
    pub time_partition: Option<String>,
    /// Time-partition tolerance (for example `30d`).
    pub time_partition_limit: Option<String>,
    /// Comma-separated custom partition fields.
    pub custom_partition: Option<String>,
    /// Fix the schema at creation.
    pub static_schema: bool,
    /// Field-schema document sent as the creation body.
    pub schema: Option<Value>,
    /// Additional raw headers, in order.
    pub extra_headers: Vec<(String, String)>,
}

impl StreamOptions {
    /// Declares `field` as the time-partition key.
    #[must_use]
    pub fn time_partition(mut self, field: impl Into<String>) -> Self {
        self.time_partition = Some(field.into());
        self
    }

    /// Declares the time-partition tolerance.
    #[must_use]
    pub fn time_partition_limit(mut self, limit: impl Into<String>) -> Self {
        self.time_partition_limit = Some(limit.into());
        self
    }

    /// Declares custom partition fields.
    #[must_use]
    pub fn custom_partition(mut self, fields: impl Into<String>) -> Self {
        self.custom_partition = Some(fields.into());
        self
    }

    /// Fixes the schema to `schema` at creation.
    #[must_use]
    pub fn static_schema(mut self, schema: Value) -> Self {
        self.static_schema = true;
        self.schema = Some(schema);
        self
    }

    /// Adds a raw header.
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.extra_headers.push((name.into(), value.into()));
        self
    }

    /// Returns the headers these options translate to.
    #[must_use]
    pub fn headers(&self) -> Vec<(String, String)> {
        let mut headers = Vec::new();
        if let Some(field) = &self.time_partition {
            headers.push((TIME_PARTITION_HEADER.to_string(), field.clone()));
        }
        if let Some(limit) = &self.time_partition_limit {
            headers.push((TIME_PARTITION_LIMIT_HEADER.to_string(), limit.clone()));
        }
        if let Some(fields) = &self.custom_partition {
            headers.push((CUSTOM_PARTITION_HEADER.to_string(), fields.clone()));
        }
        if self.static_schema {
            headers.push((STATIC_SCHEMA_HEADER.to_string(), "true".to_string()));
        }
        headers.extend(self.extra_headers.iter().cloned());
        headers
    }
}

// ============================================================================
// SECTION: Fixtures
// ============================================================================

/// Field names of the fixed schema, paired with their declared types.
pub const STATIC_SCHEMA_FIELDS: &[(&str, &str)] = &[
    ("source_time", "string"),
    ("level", "string"),
    ("message", "string"),
    ("version", "string"),
    ("user_id", "int"),
    ("device_id", "int"),
    ("session_id", "string"),
    ("os", "string"),
    ("host", "string"),
    ("uuid", "string"),
    ("location", "string"),
    ("timezone", "string"),
    ("user_agent", "string"),
    ("runtime", "string"),
    ("request_body", "string"),
    ("status_code", "int"),
    ("response_time", "int"),
    ("process_id", "int"),
    ("app_meta", "string"),
];

/// Field-schema document used to create a static-schema stream.
#[must_use]
pub fn static_schema_document() -> Value {
    let fields: Vec<Value> = STATIC_SCHEMA_FIELDS
        .iter()
        .map(|(name, data_type)| json!({ "name": name, "data_type": data_type }))
        .collect();
    json!({ "fields": fields })
}
