// system-tests/src/config/env.rs
// ============================================================================
// Module: System Test Environment
// Description: Environment-backed configuration for system tests.
// Purpose: Centralize env parsing with strict UTF-8 validation.
// Dependencies: logstream-harness
// ============================================================================

//! ## Overview
//! Environment values are parsed with strict UTF-8 enforcement to avoid silent
//! misconfiguration. Invalid UTF-8 fails closed, as do empty values.
//!
//! The presence of an ingestor URL selects the distributed topology; without
//! one, the query endpoint serves both roles.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::PathBuf;
use std::time::Duration;

use logstream_harness::ClientConfig;
use logstream_harness::ConsistencyWait;
use logstream_harness::Credentials;
use logstream_harness::Topology;
use logstream_harness::consistency::DEFAULT_CONSISTENCY_WAIT;
use logstream_harness::consistency::PollPolicy;

// ============================================================================
// SECTION: Environment Constants
// ============================================================================

/// Query endpoint used when none is configured.
pub const DEFAULT_QUERY_URL: &str = "http://localhost:8000/api/v1/";
/// Username used when none is configured.
const DEFAULT_USERNAME: &str = "admin";
/// Password used when none is configured.
const DEFAULT_PASSWORD: &str = "admin";
/// Stream targeted when none is configured.
const DEFAULT_STREAM: &str = "app";

/// Environment keys for system test configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SystemTestEnv {
    /// Query endpoint base URL.
    QueryUrl,
    /// Optional ingestor endpoint base URL.
    IngestorUrl,
    /// Query endpoint username.
    Username,
    /// Query endpoint password.
    Password,
    /// Ingestor endpoint username.
    IngestorUsername,
    /// Ingestor endpoint password.
    IngestorPassword,
    /// Target stream name.
    Stream,
    /// Optional timeout override in seconds (positive integer).
    TimeoutSeconds,
    /// Fixed consistency pause in milliseconds (positive integer).
    ConsistencyWaitMs,
    /// Poll for consistency instead of pausing (`true`/`false` or `1`/`0`).
    ConsistencyPoll,
    /// Optional artifact root override.
    RunRoot,
    /// Optional JSON-lines exchange log path.
    AuditLog,
}

impl SystemTestEnv {
    /// Every key, in documentation order.
    pub const ALL: [Self; 12] = [
        Self::QueryUrl,
        Self::IngestorUrl,
        Self::Username,
        Self::Password,
        Self::IngestorUsername,
        Self::IngestorPassword,
        Self::Stream,
        Self::TimeoutSeconds,
        Self::ConsistencyWaitMs,
        Self::ConsistencyPoll,
        Self::RunRoot,
        Self::AuditLog,
    ];

    /// Returns the canonical environment variable name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::QueryUrl => "LOGSTREAM_TEST_QUERY_URL",
            Self::IngestorUrl => "LOGSTREAM_TEST_INGESTOR_URL",
            Self::Username => "LOGSTREAM_TEST_USERNAME",
            Self::Password => "LOGSTREAM_TEST_PASSWORD",
            Self::IngestorUsername => "LOGSTREAM_TEST_INGESTOR_USERNAME",
            Self::IngestorPassword => "LOGSTREAM_TEST_INGESTOR_PASSWORD",
            Self::Stream => "LOGSTREAM_TEST_STREAM",
            Self::TimeoutSeconds => "LOGSTREAM_TEST_TIMEOUT_SEC",
            Self::ConsistencyWaitMs => "LOGSTREAM_TEST_CONSISTENCY_WAIT_MS",
            Self::ConsistencyPoll => "LOGSTREAM_TEST_CONSISTENCY_POLL",
            Self::RunRoot => "LOGSTREAM_TEST_RUN_ROOT",
            Self::AuditLog => "LOGSTREAM_TEST_AUDIT_LOG",
        }
    }
}

// ============================================================================
// SECTION: Config Types
// ============================================================================

/// Typed system test configuration derived from environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemTestConfig {
    /// Query endpoint base URL.
    pub query_url: String,
    /// Ingestor endpoint base URL, when distributed.
    pub ingestor_url: Option<String>,
    /// Query endpoint username.
    pub username: String,
    /// Query endpoint password.
    pub password: String,
    /// Ingestor endpoint username.
    pub ingestor_username: String,
    /// Ingestor endpoint password.
    pub ingestor_password: String,
    /// Target stream name.
    pub stream: String,
    /// Optional timeout override in seconds (positive integer).
    pub timeout: Option<Duration>,
    /// Fixed consistency pause.
    pub consistency_wait: Duration,
    /// Poll for consistency instead of pausing.
    pub consistency_poll: bool,
    /// Optional artifact root override.
    pub run_root: Option<PathBuf>,
    /// Optional JSON-lines exchange log path.
    pub audit_log: Option<PathBuf>,
}

impl Default for SystemTestConfig {
    fn default() -> Self {
        Self {
            query_url: DEFAULT_QUERY_URL.to_string(),
            ingestor_url: None,
            username: DEFAULT_USERNAME.to_string(),
            password: DEFAULT_PASSWORD.to_string(),
            ingestor_username: DEFAULT_USERNAME.to_string(),
            ingestor_password: DEFAULT_PASSWORD.to_string(),
            stream: DEFAULT_STREAM.to_string(),
            timeout: None,
            consistency_wait: DEFAULT_CONSISTENCY_WAIT,
            consistency_poll: false,
            run_root: None,
            audit_log: None,
        }
    }
}

impl SystemTestConfig {
    /// Loads configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error when an environment value is not valid UTF-8, is empty,
    /// or fails validation (for example, an invalid timeout or boolean value).
    pub fn load() -> Result<Self, String> {
        let defaults = Self::default();
        let query_url =
            read_env_nonempty(SystemTestEnv::QueryUrl.as_str())?.unwrap_or(defaults.query_url);
        let ingestor_url = read_env_nonempty(SystemTestEnv::IngestorUrl.as_str())?;
        let username =
            read_env_nonempty(SystemTestEnv::Username.as_str())?.unwrap_or(defaults.username);
        let password =
            read_env_nonempty(SystemTestEnv::Password.as_str())?.unwrap_or(defaults.password);
        let ingestor_username = read_env_nonempty(SystemTestEnv::IngestorUsername.as_str())?
            .unwrap_or_else(|| username.clone());
        let ingestor_password = read_env_nonempty(SystemTestEnv::IngestorPassword.as_str())?
            .unwrap_or_else(|| password.clone());
        let stream = read_env_nonempty(SystemTestEnv::Stream.as_str())?.unwrap_or(defaults.stream);
        let timeout = read_env_nonempty(SystemTestEnv::TimeoutSeconds.as_str())?
            .map(|value| parse_timeout_seconds(SystemTestEnv::TimeoutSeconds.as_str(), &value))
            .transpose()?;
        let consistency_wait = read_env_nonempty(SystemTestEnv::ConsistencyWaitMs.as_str())?
            .map(|value| parse_millis(SystemTestEnv::ConsistencyWaitMs.as_str(), &value))
            .transpose()?
            .unwrap_or(defaults.consistency_wait);
        let consistency_poll = parse_bool_env(
            SystemTestEnv::ConsistencyPoll.as_str(),
            read_env_nonempty(SystemTestEnv::ConsistencyPoll.as_str())?,
        )?;
        let run_root = read_env_nonempty(SystemTestEnv::RunRoot.as_str())?.map(PathBuf::from);
        let audit_log = read_env_nonempty(SystemTestEnv::AuditLog.as_str())?.map(PathBuf::from);
        Ok(Self {
            query_url,
            ingestor_url,
            username,
            password,
            ingestor_username,
            ingestor_password,
            stream,
            timeout,
            consistency_wait,
            consistency_poll,
            run_root,
            audit_log,
        })
    }

    /// Returns the topology implied by the ingestor URL.
    #[must_use]
    pub fn topology(&self) -> Topology {
        Topology::from_ingestor_url(self.ingestor_url.as_deref())
    }

    /// Returns the configured ingest-to-queryable wait strategy.
    #[must_use]
    pub fn consistency(&self) -> ConsistencyWait {
        if self.consistency_poll {
            let defaults = PollPolicy::default();
            ConsistencyWait::Poll(PollPolicy {
                timeout: defaults.timeout.max(self.consistency_wait),
                ..defaults
            })
        } else {
            ConsistencyWait::Fixed(self.consistency_wait)
        }
    }

    /// Builds the query client configuration.
    #[must_use]
    pub fn query_client_config(&self) -> ClientConfig {
        self.apply_timeout(
            ClientConfig::new(self.query_url.clone(), "query")
                .with_credentials(Credentials::new(self.username.clone(), self.password.clone())),
        )
    }

    /// Builds the ingestor client configuration, if distributed.
    #[must_use]
    pub fn ingestor_client_config(&self) -> Option<ClientConfig> {
        self.ingestor_url.as_ref().map(|url| {
            self.apply_timeout(ClientConfig::new(url.clone(), "ingestor").with_credentials(
                Credentials::new(self.ingestor_username.clone(), self.ingestor_password.clone()),
            ))
        })
    }

    /// Applies the timeout override, when present.
    fn apply_timeout(&self, config: ClientConfig) -> ClientConfig {
        match self.timeout {
            Some(timeout) => config.with_timeout(timeout),
            None => config,
        }
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Reads an environment variable and enforces UTF-8 validity.
///
/// # Errors
///
/// Returns an error when the environment variable contains invalid UTF-8.
pub fn read_env_strict(name: &str) -> Result<Option<String>, String> {
    std::env::var_os(name).map_or(Ok(None), |raw| {
        raw.into_string().map(Some).map_err(|_| format!("{name} must be valid UTF-8"))
    })
}

/// Reads an environment variable and rejects empty values.
///
/// # Errors
///
/// Returns an error when the variable is set but empty or whitespace.
fn read_env_nonempty(name: &str) -> Result<Option<String>, String> {
    match read_env_strict(name)? {
        Some(value) if value.trim().is_empty() => Err(format!("{name} must not be empty")),
        Some(value) => Ok(Some(value.trim().to_string())),
        None => Ok(None),
    }
}

/// Parses a positive integer from an environment variable string.
fn parse_positive(name: &str, raw: &str, unit: &str) -> Result<u64, String> {
    let value: u64 = raw
        .trim()
        .parse()
        .map_err(|_| format!("{name} must be a positive integer number of {unit}"))?;
    if value == 0 {
        return Err(format!("{name} must be greater than zero"));
    }
    Ok(value)
}

/// Parses a positive timeout value from an environment variable string.
///
/// # Errors
///
/// Returns an error when the value is non-numeric or zero.
fn parse_timeout_seconds(name: &str, raw: &str) -> Result<Duration, String> {
    parse_positive(name, raw, "seconds").map(Duration::from_secs)
}

/// Parses a positive millisecond duration.
fn parse_millis(name: &str, raw: &str) -> Result<Duration, String> {
    parse_positive(name, raw, "milliseconds").map(Duration::from_millis)
}

/// Parses a boolean environment variable with permissive defaults.
///
/// # Errors
///
/// Returns an error when the value is not a recognized boolean literal.
fn parse_bool_env(name: &str, raw: Option<String>) -> Result<bool, String> {
    let Some(value) = raw else {
        return Ok(false);
    };
    let trimmed = value.trim();
    if trimmed.eq_ignore_ascii_case("true") || trimmed == "1" {
        return Ok(true);
    }
    if trimmed.eq_ignore_ascii_case("false") || trimmed == "0" {
        return Ok(false);
    }
    Err(format!("{name} must be 1, 0, true, or false"))
}
