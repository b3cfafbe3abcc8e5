//! Platform metadata lookup.

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

use crate::config::schema::MetadataConfig;

/// Environment variable naming the metadata server; its presence also marks
/// the process as running on the managed platform.
pub const METADATA_HOST_ENV: &str = "GCE_METADATA_HOST";

const DEFAULT_METADATA_HOST: &str = "169.254.169.254";
const FLAVOR_HEADER: &str = "Metadata-Flavor";
const FLAVOR: &str = "Google";

/// What the platform reports about the current machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformInfo {
    /// Whether the process runs on the managed platform.
    pub managed: bool,
    /// Instance name when managed, OS hostname otherwise.
    pub name: String,
}

#[derive(Debug, Error)]
pub enum MetadataError {
    #[error("Metadata request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Metadata server returned status {0}")]
    Status(u16),

    #[error("Hostname lookup failed: {0}")]
    Hostname(#[from] std::io::Error),

    #[error("Hostname is not valid UTF-8")]
    NonUtf8Hostname,
}

/// Source of the machine's instance or host name.
#[async_trait]
pub trait PlatformMetadata: Send + Sync {
    async fn query(&self) -> Result<PlatformInfo, MetadataError>;
}

/// Queries the compute metadata server, falling back to the OS hostname
/// off-platform.
pub struct GceMetadata {
    client: reqwest::Client,
    host: String,
    timeout: Duration,
}

impl GceMetadata {
    /// `host` is overridden by `GCE_METADATA_HOST` when that is set.
    pub fn new(host: impl Into<String>, timeout: Duration) -> Self {
        let host = std::env::var(METADATA_HOST_ENV).unwrap_or_else(|_| host.into());
        Self {
            client: reqwest::Client::new(),
            host,
            timeout,
        }
    }

    pub fn from_config(config: &MetadataConfig) -> Self {
        Self::new(config.host.clone(), Duration::from_millis(config.timeout_ms))
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    async fn on_platform(&self) -> bool {
        if std::env::var_os(METADATA_HOST_ENV).is_some() {
            return true;
        }
        let probe = self
            .client
            .get(format!("http://{}", self.host))
            .header(FLAVOR_HEADER, FLAVOR)
            .timeout(self.timeout)
            .send()
            .await;
        match probe {
            Ok(resp) => {
                resp.headers()
                    .get(FLAVOR_HEADER)
                    .and_then(|v| v.to_str().ok())
                    == Some(FLAVOR)
            }
            Err(e) => {
                tracing::debug!(host = %self.host, error = %e, "Metadata server not reachable");
                false
            }
        }
    }

    async fn instance_name(&self) -> Result<String, MetadataError> {
        let resp = self
            .client
            .get(format!("http://{}/computeMetadata/v1/instance/name", self.host))
            .header(FLAVOR_HEADER, FLAVOR)
            .timeout(self.timeout)
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(MetadataError::Status(resp.status().as_u16()));
        }
        Ok(resp.text().await?.trim().to_string())
    }
}

impl Default for GceMetadata {
    fn default() -> Self {
        Self::new(DEFAULT_METADATA_HOST, Duration::from_millis(500))
    }
}

/// Hostname as reported by the operating system.
pub fn os_hostname() -> Result<String, MetadataError> {
    hostname::get()?
        .into_string()
        .map_err(|_| MetadataError::NonUtf8Hostname)
}

#[async_trait]
impl PlatformMetadata for GceMetadata {
    async fn query(&self) -> Result<PlatformInfo, MetadataError> {
        if self.on_platform().await {
            let name = self.instance_name().await?;
            Ok(PlatformInfo {
                managed: true,
                name,
            })
        } else {
            Ok(PlatformInfo {
                managed: false,
                name: os_hostname()?,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_off_platform_uses_os_hostname() {
        if std::env::var_os(METADATA_HOST_ENV).is_some() {
            return;
        }
        // Nothing listens on the discard port, so the probe fails fast.
        let metadata = GceMetadata::new("127.0.0.1:9", Duration::from_millis(200));
        let info = metadata.query().await.unwrap();

        assert!(!info.managed);
        assert_eq!(info.name, os_hostname().unwrap());
    }
}
