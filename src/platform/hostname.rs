//! Process-wide hostname label.

use std::collections::BTreeMap;
use tokio::sync::OnceCell;

use crate::platform::metadata::{GceMetadata, PlatformMetadata};

/// Label key the hostname is stored under.
pub const HOSTNAME_LABEL: &str = "hostname";

static DETECTED_HOST: HostnameCache = HostnameCache::new();

/// Hostname computed at most once.
///
/// Concurrent first callers wait for the single in-flight lookup and all
/// observe its result. A failed lookup caches the empty string.
pub struct HostnameCache {
    cell: OnceCell<String>,
}

impl HostnameCache {
    pub const fn new() -> Self {
        Self {
            cell: OnceCell::const_new(),
        }
    }

    /// Cached hostname, if the lookup has completed.
    pub fn get(&self) -> Option<&str> {
        self.cell.get().map(String::as_str)
    }

    pub async fn get_or_detect(&self, metadata: &dyn PlatformMetadata) -> &str {
        self.cell.get_or_init(|| detect(metadata)).await
    }
}

impl Default for HostnameCache {
    fn default() -> Self {
        Self::new()
    }
}

async fn detect(metadata: &dyn PlatformMetadata) -> String {
    match metadata.query().await {
        Ok(info) => {
            tracing::debug!(managed = info.managed, hostname = %info.name, "Hostname detected");
            info.name
        }
        Err(e) => {
            tracing::warn!(error = %e, "Hostname detection failed, label left empty");
            String::new()
        }
    }
}

/// Add the hostname label to `labels`, creating the map if needed.
///
/// Useful for common labels:
/// `LoggerOptions::new().with_common_labels(with_hostname(None).await)`.
pub async fn with_hostname(labels: Option<BTreeMap<String, String>>) -> BTreeMap<String, String> {
    match DETECTED_HOST.get() {
        Some(hostname) => insert_hostname(labels, hostname),
        None => with_hostname_via(&GceMetadata::default(), labels).await,
    }
}

/// [`with_hostname`] with a specific metadata source for the first lookup.
pub async fn with_hostname_via(
    metadata: &dyn PlatformMetadata,
    labels: Option<BTreeMap<String, String>>,
) -> BTreeMap<String, String> {
    with_hostname_from(&DETECTED_HOST, metadata, labels).await
}

/// [`with_hostname`] against an explicit cache and metadata source.
pub async fn with_hostname_from(
    cache: &HostnameCache,
    metadata: &dyn PlatformMetadata,
    labels: Option<BTreeMap<String, String>>,
) -> BTreeMap<String, String> {
    let hostname = cache.get_or_detect(metadata).await;
    insert_hostname(labels, hostname)
}

fn insert_hostname(
    labels: Option<BTreeMap<String, String>>,
    hostname: &str,
) -> BTreeMap<String, String> {
    let mut labels = labels.unwrap_or_default();
    labels.insert(HOSTNAME_LABEL.to_string(), hostname.to_string());
    labels
}
