//! Configuration loading from disk.

use std::fs;
use std::path::Path;
use thiserror::Error;

use crate::config::schema::GroupLogConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Parse and validate configuration from TOML text.
pub fn parse_config(content: &str) -> Result<GroupLogConfig, ConfigError> {
    let config: GroupLogConfig = toml::from_str(content)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<GroupLogConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::OutputKind;

    #[test]
    fn test_parse_full_config() {
        let config = parse_config(
            r#"
            [backend]
            parent = "projects/my-project"
            output = "file"
            path = "logs/grouped.jsonl"
            buffer_capacity = 64

            [server]
            bind_address = "127.0.0.1:3000"
            log_name = "checkout"

            [observability]
            log_level = "debug"

            [metadata]
            hostname_label = false
            "#,
        )
        .unwrap();

        assert_eq!(config.backend.parent, "projects/my-project");
        assert_eq!(config.backend.output, OutputKind::File);
        assert_eq!(config.backend.path, Path::new("logs/grouped.jsonl"));
        assert_eq!(config.backend.buffer_capacity, 64);
        assert_eq!(config.server.log_name, "checkout");
        assert_eq!(config.server.request_timeout_secs, 30);
        assert_eq!(config.observability.log_level, "debug");
        assert!(!config.metadata.hostname_label);
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = parse_config("").unwrap();
        assert_eq!(config.backend.output, OutputKind::Stdout);
        assert_eq!(config.server.log_name, "app");
    }

    #[test]
    fn test_invalid_config_reports_validation() {
        let err = parse_config("[backend]\noutput = \"file\"\n").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Validation(ref v) if v == &vec![ValidationError::MissingPath]
        ));
        assert!(err.to_string().contains("backend.path"));
    }

    #[test]
    fn test_syntax_error() {
        assert!(matches!(parse_config("[backend"), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_missing_file() {
        let err = load_config(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
