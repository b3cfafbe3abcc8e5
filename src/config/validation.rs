//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (capacities and timeouts > 0, addresses parse)
//! - Check that file output has a path
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GroupLogConfig → Result<(), Vec<ValidationError>>

use std::net::SocketAddr;
use thiserror::Error;

use crate::config::schema::{GroupLogConfig, OutputKind};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("backend.parent must not be empty")]
    EmptyParent,

    #[error("backend.buffer_capacity must be greater than 0")]
    ZeroBufferCapacity,

    #[error("backend.path must be set when output is 'file'")]
    MissingPath,

    #[error("server.bind_address '{0}' is not a socket address")]
    InvalidBindAddress(String),

    #[error("server.log_name '{0}' must be non-empty and use only [A-Za-z0-9_.-/]")]
    InvalidLogName(String),

    #[error("server.request_timeout_secs must be greater than 0")]
    ZeroRequestTimeout,

    #[error("observability.metrics_address '{0}' is not a socket address")]
    InvalidMetricsAddress(String),

    #[error("metadata.timeout_ms must be greater than 0")]
    ZeroMetadataTimeout,
}

fn is_valid_log_name(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.' | '/'))
}

/// Check a parsed configuration, collecting every violation.
pub fn validate_config(config: &GroupLogConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.backend.parent.trim().is_empty() {
        errors.push(ValidationError::EmptyParent);
    }
    if config.backend.buffer_capacity == 0 {
        errors.push(ValidationError::ZeroBufferCapacity);
    }
    if config.backend.output == OutputKind::File && config.backend.path.as_os_str().is_empty() {
        errors.push(ValidationError::MissingPath);
    }

    if config.server.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidBindAddress(config.server.bind_address.clone()));
    }
    if !is_valid_log_name(&config.server.log_name) {
        errors.push(ValidationError::InvalidLogName(config.server.log_name.clone()));
    }
    if config.server.request_timeout_secs == 0 {
        errors.push(ValidationError::ZeroRequestTimeout);
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidMetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if config.metadata.hostname_label && config.metadata.timeout_ms == 0 {
        errors.push(ValidationError::ZeroMetadataTimeout);
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
