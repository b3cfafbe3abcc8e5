//! Record transports.
//!
//! # Responsibilities
//! - Deliver one serialized record to its destination
//! - Flush buffered output on request
//!
//! # Design Decisions
//! - Newline-delimited JSON, one record per line
//! - Transports are called only from the client's delivery worker
//! - `MemoryTransport` keeps entries in-process for tests and embedding

use async_trait::async_trait;
use dashmap::DashMap;
use serde::Serialize;
use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::Mutex;

use crate::backend::types::TransportError;
use crate::entry::Entry;

/// An entry addressed to a full log name.
#[derive(Debug, Clone, Serialize)]
pub struct LogRecord {
    #[serde(rename = "logName")]
    pub log_name: String,
    #[serde(flatten)]
    pub entry: Entry,
}

/// Destination for log records.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn write(&self, record: &LogRecord) -> Result<(), TransportError>;

    async fn flush(&self) -> Result<(), TransportError> {
        Ok(())
    }
}

/// Writes records as JSON lines to any async writer.
pub struct WriterTransport {
    writer: Mutex<Box<dyn AsyncWrite + Send + Unpin>>,
    target: String,
}

impl WriterTransport {
    pub fn new<W>(writer: W, target: impl Into<String>) -> Self
    where
        W: AsyncWrite + Send + Unpin + 'static,
    {
        Self {
            writer: Mutex::new(Box::new(writer)),
            target: target.into(),
        }
    }

    pub fn stdout() -> Self {
        Self::new(tokio::io::stdout(), "stdout")
    }

    /// Append to the file at `path`, creating it and its parent directories.
    pub async fn file(path: &Path) -> Result<Self, TransportError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .await?;
        Ok(Self::new(file, path.display().to_string()))
    }

    /// Human-readable description of the destination.
    pub fn target(&self) -> &str {
        &self.target
    }
}

#[async_trait]
impl Transport for WriterTransport {
    async fn write(&self, record: &LogRecord) -> Result<(), TransportError> {
        let mut line = serde_json::to_vec(record)?;
        line.push(b'\n');
        let mut writer = self.writer.lock().await;
        writer.write_all(&line).await?;
        Ok(())
    }

    async fn flush(&self) -> Result<(), TransportError> {
        self.writer.lock().await.flush().await?;
        Ok(())
    }
}

/// Keeps delivered entries in memory, keyed by full log name.
#[derive(Default)]
pub struct MemoryTransport {
    records: DashMap<String, Vec<Entry>>,
    failing: AtomicBool,
    flushes: AtomicUsize,
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Entries delivered to `log_name`, in delivery order.
    pub fn entries(&self, log_name: &str) -> Vec<Entry> {
        self.records
            .get(log_name)
            .map(|r| r.value().clone())
            .unwrap_or_default()
    }

    /// Log names that received at least one entry, sorted.
    pub fn log_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.records.iter().map(|r| r.key().clone()).collect();
        names.sort();
        names
    }

    /// Total number of delivered entries.
    pub fn len(&self) -> usize {
        self.records.iter().map(|r| r.value().len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Make every subsequent write fail (or succeed again).
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn flush_count(&self) -> usize {
        self.flushes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Transport for MemoryTransport {
    async fn write(&self, record: &LogRecord) -> Result<(), TransportError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(TransportError::Rejected("memory transport set to fail".into()));
        }
        self.records
            .entry(record.log_name.clone())
            .or_default()
            .push(record.entry.clone());
        Ok(())
    }

    async fn flush(&self) -> Result<(), TransportError> {
        self.flushes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::Severity;

    fn record(log_name: &str, severity: Severity) -> LogRecord {
        let mut entry = Entry::new(severity, "payload");
        entry.trace = "group-1".into();
        LogRecord {
            log_name: log_name.into(),
            entry,
        }
    }

    #[test]
    fn test_record_serialization() {
        let entry = record("projects/p/logs/app-app", Severity::Error);
        let value = serde_json::to_value(entry).unwrap();
        assert_eq!(value["logName"], "projects/p/logs/app-app");
        assert_eq!(value["severity"], "ERROR");
        assert_eq!(value["trace"], "group-1");
        assert_eq!(value["textPayload"], "payload");
    }

    #[tokio::test]
    async fn test_memory_transport() {
        let transport = MemoryTransport::new();
        transport.write(&record("a", Severity::Info)).await.unwrap();
        transport.write(&record("b", Severity::Debug)).await.unwrap();
        transport.write(&record("a", Severity::Alert)).await.unwrap();

        assert_eq!(transport.len(), 3);
        assert_eq!(transport.log_names(), vec!["a".to_string(), "b".to_string()]);
        let a: Vec<Severity> = transport.entries("a").iter().map(|e| e.severity).collect();
        assert_eq!(a, vec![Severity::Info, Severity::Alert]);

        transport.set_failing(true);
        let err = transport.write(&record("a", Severity::Info)).await.unwrap_err();
        assert!(matches!(err, TransportError::Rejected(_)));
        assert_eq!(transport.len(), 3);
    }

    #[tokio::test]
    async fn test_file_transport_writes_json_lines() {
        let dir = std::env::temp_dir().join(format!("group-logger-{}", uuid::Uuid::new_v4()));
        let path = dir.join("nested").join("out.jsonl");

        let transport = WriterTransport::file(&path).await.unwrap();
        transport.write(&record("x-request", Severity::Warning)).await.unwrap();
        transport.write(&record("x-app", Severity::Info)).await.unwrap();
        transport.flush().await.unwrap();

        let content = tokio::fs::read_to_string(&path).await.unwrap();
        let lines: Vec<serde_json::Value> = content
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["logName"], "x-request");
        assert_eq!(lines[1]["severity"], "INFO");

        std::fs::remove_dir_all(&dir).unwrap_or_default();
    }
}
