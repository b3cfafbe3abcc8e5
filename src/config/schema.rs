//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from config files.
//! Every field has a default so an empty file is a valid configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GroupLogConfig {
    /// Where entries are delivered.
    pub backend: BackendConfig,

    /// Demo HTTP server settings.
    pub server: ServerConfig,

    /// Process logging and metrics.
    pub observability: ObservabilityConfig,

    /// Hostname labeling.
    pub metadata: MetadataConfig,
}

/// Destination for delivered entries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputKind {
    #[default]
    Stdout,
    File,
}

/// Logging backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Parent resource, e.g. "projects/my-project" or a bare project ID.
    pub parent: String,

    /// Output destination.
    pub output: OutputKind,

    /// File path, used when `output = "file"`.
    pub path: PathBuf,

    /// Entries queued for delivery before new ones are dropped.
    pub buffer_capacity: usize,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            parent: "projects/local".to_string(),
            output: OutputKind::Stdout,
            path: PathBuf::new(),
            buffer_capacity: 1024,
        }
    }
}

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Logical log name; streams are `<log_name>-request` and `<log_name>-app`.
    pub log_name: String,

    /// Request timeout in seconds.
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            log_name: "app".to_string(),
            request_timeout_secs: 30,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Hostname labeling configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct MetadataConfig {
    /// Add a `hostname` common label to every stream.
    pub hostname_label: bool,

    /// Metadata server host.
    pub host: String,

    /// Metadata request timeout in milliseconds.
    pub timeout_ms: u64,
}

impl Default for MetadataConfig {
    fn default() -> Self {
        Self {
            hostname_label: true,
            host: "169.254.169.254".to_string(),
            timeout_ms: 500,
        }
    }
}
