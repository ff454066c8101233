//! Configuration types mapping to the TOML schema.
//!
//! Top-level config:
//! ```toml
//! [server]          # HTTP listener
//! [resource]        # resource-management API client
//! [remediation]     # generative model used for fix suggestions
//! [orchestration]   # durable (checkpointed) inspections
//! [logging]         # file logging
//! ```

use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use runmedic_types::config_defaults as defaults;
use serde::{Deserialize, Serialize};

use crate::{ConfigError, Result};

// ─────────────────────────────────────────────────────────────────────────────
// Top-level Config
// ─────────────────────────────────────────────────────────────────────────────

/// Root configuration structure.
///
/// All sections are optional so that partial configs (e.g., project-local
/// overrides) can be loaded and merged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RunmedicConfig {
    pub server: Option<ServerConfig>,
    pub resource: Option<ResourceConfig>,
    pub remediation: Option<RemediationConfig>,
    pub orchestration: Option<OrchestrationConfig>,
    pub logging: Option<LoggingConfig>,
}

impl RunmedicConfig {
    /// Create an empty config.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self> {
        Ok(toml::from_str(toml_str)?)
    }

    /// Serialize to a TOML string.
    pub fn to_toml(&self) -> Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Merge another config on top of this one (other takes priority).
    ///
    /// Merging is per section: a section present in `other` replaces the
    /// whole section here.
    pub fn merge(&mut self, other: RunmedicConfig) {
        if other.server.is_some() {
            self.server = other.server;
        }
        if other.resource.is_some() {
            self.resource = other.resource;
        }
        if other.remediation.is_some() {
            self.remediation = other.remediation;
        }
        if other.orchestration.is_some() {
            self.orchestration = other.orchestration;
        }
        if other.logging.is_some() {
            self.logging = other.logging;
        }
    }

    pub fn server(&self) -> ServerConfig {
        self.server.clone().unwrap_or_default()
    }

    pub fn resource(&self) -> ResourceConfig {
        self.resource.clone().unwrap_or_default()
    }

    pub fn remediation(&self) -> RemediationConfig {
        self.remediation.clone().unwrap_or_default()
    }

    pub fn orchestration(&self) -> OrchestrationConfig {
        self.orchestration.clone().unwrap_or_default()
    }

    pub fn logging(&self) -> LoggingConfig {
        self.logging.clone().unwrap_or_default()
    }

    /// Copy of this config with secrets replaced, for display.
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        if let Some(ref mut remediation) = copy.remediation
            && remediation.api_key.is_some()
        {
            remediation.api_key = Some("***".to_string());
        }
        copy
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Server
// ─────────────────────────────────────────────────────────────────────────────

/// `[server]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind to.
    pub bind: String,
    /// Port to listen on.
    pub port: u16,
    /// Enable request logging.
    pub request_logging: bool,
    /// Maximum request body size in bytes.
    pub max_body_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: defaults::DEFAULT_BIND.to_string(),
            port: defaults::DEFAULT_PORT,
            request_logging: true,
            max_body_size: defaults::MAX_BODY_SIZE,
        }
    }
}

impl ServerConfig {
    /// Parse `bind` and `port` into a socket address.
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        let ip: IpAddr = self.bind.parse().map_err(|_| ConfigError::InvalidValue {
            field: "server.bind".to_string(),
            reason: format!("'{}' is not an IP address", self.bind),
        })?;
        Ok(SocketAddr::new(ip, self.port))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Resource API
// ─────────────────────────────────────────────────────────────────────────────

/// `[resource]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ResourceConfig {
    /// Management endpoint, e.g. `https://management.azure.com`.
    pub base_url: String,
    /// `api-version` query parameter.
    pub api_version: String,
    /// Upper bound on concurrent per-run action lookups.
    pub max_concurrent_lookups: usize,
    /// Maximum number of `nextLink` pages followed per list call.
    pub max_pages: u32,
    /// Optional HTTP timeout. Unset means the client default.
    pub timeout_secs: Option<u64>,
}

impl Default for ResourceConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::RESOURCE_BASE_URL.to_string(),
            api_version: defaults::RESOURCE_API_VERSION.to_string(),
            max_concurrent_lookups: defaults::MAX_CONCURRENT_LOOKUPS,
            max_pages: defaults::MAX_PAGES,
            timeout_secs: None,
        }
    }
}

impl ResourceConfig {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Remediation
// ─────────────────────────────────────────────────────────────────────────────

/// `[remediation]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RemediationConfig {
    pub base_url: String,
    pub model: String,
    /// Plaintext API key. Prefer the environment; see [`crate::secrets`].
    pub api_key: Option<String>,
    pub timeout_secs: Option<u64>,
    /// Ask the model for code only, without explanation.
    pub raw_code_only: bool,
}

impl Default for RemediationConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::GENERATIVE_BASE_URL.to_string(),
            model: defaults::GENERATIVE_MODEL.to_string(),
            api_key: None,
            timeout_secs: None,
            raw_code_only: false,
        }
    }
}

impl RemediationConfig {
    pub fn has_plaintext_api_key(&self) -> bool {
        self.api_key.as_deref().is_some_and(|k| !k.is_empty())
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Orchestration
// ─────────────────────────────────────────────────────────────────────────────

/// Where orchestration checkpoints live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreLocation {
    Memory,
    Path(PathBuf),
}

/// `[orchestration]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OrchestrationConfig {
    /// Expose the durable endpoints.
    pub enabled: bool,
    /// `"memory"` or a path to a SQLite file. Unset means the data dir.
    pub store: Option<String>,
    /// Attempts per activity, including the first.
    pub max_attempts: u32,
    pub first_retry_interval_ms: u64,
    pub backoff_coefficient: f64,
    /// Ceiling for any single retry delay.
    pub max_retry_interval_secs: u64,
    /// Re-run unfinished instances when the server starts.
    pub resume_on_start: bool,
}

impl Default for OrchestrationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            store: None,
            max_attempts: defaults::ACTIVITY_MAX_ATTEMPTS,
            first_retry_interval_ms: defaults::FIRST_RETRY_INTERVAL_MS,
            backoff_coefficient: defaults::BACKOFF_COEFFICIENT,
            max_retry_interval_secs: defaults::MAX_RETRY_INTERVAL_SECS,
            resume_on_start: true,
        }
    }
}

impl OrchestrationConfig {
    pub fn store_location(&self) -> StoreLocation {
        match self.store.as_deref() {
            Some("memory") | Some(":memory:") => StoreLocation::Memory,
            Some(path) => StoreLocation::Path(PathBuf::from(path)),
            None => dirs::data_dir()
                .map(|d| StoreLocation::Path(d.join("runmedic").join("orchestrations.db")))
                .unwrap_or(StoreLocation::Memory),
        }
    }

    pub fn first_retry_interval(&self) -> Duration {
        Duration::from_millis(self.first_retry_interval_ms)
    }

    pub fn max_retry_interval(&self) -> Duration {
        Duration::from_secs(self.max_retry_interval_secs)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Logging
// ─────────────────────────────────────────────────────────────────────────────

/// `[logging]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Write a daily-rolling JSON log file in addition to the console.
    pub file: bool,
    /// Directory for log files. Unset means `<config dir>/logs`.
    pub directory: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            file: true,
            directory: None,
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
