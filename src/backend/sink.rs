//! Named log streams.

use chrono::Utc;
use std::collections::BTreeMap;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tokio::sync::mpsc::error::TrySendError;
use uuid::Uuid;

use crate::backend::client::{Command, Shared};
use crate::backend::transport::LogRecord;
use crate::backend::types::ClientError;
use crate::entry::Entry;

/// Submits entries to one named log stream.
///
/// `log` must not block on I/O and reports nothing to the caller.
pub trait LogSink: Send + Sync {
    /// Full name of the stream.
    fn name(&self) -> &str;

    fn log(&self, entry: Entry);
}

/// Per-stream settings.
#[derive(Debug, Clone, Default)]
pub struct LoggerOptions {
    /// Labels added to every entry of the stream. Entry labels win.
    pub common_labels: BTreeMap<String, String>,
}

impl LoggerOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_common_labels(mut self, labels: BTreeMap<String, String>) -> Self {
        self.common_labels = labels;
        self
    }

    pub fn with_label(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.common_labels.insert(key.into(), value.into());
        self
    }
}

/// A stream handed out by [`crate::backend::Client`].
///
/// Entries are queued for the client's delivery worker; a full queue or a
/// closed client drops the entry and notifies the error handler.
pub struct StreamLogger {
    log_name: String,
    common_labels: BTreeMap<String, String>,
    shared: Arc<Shared>,
}

impl StreamLogger {
    pub(crate) fn new(log_name: String, options: &LoggerOptions, shared: Arc<Shared>) -> Self {
        Self {
            log_name,
            common_labels: options.common_labels.clone(),
            shared,
        }
    }

    pub fn common_labels(&self) -> &BTreeMap<String, String> {
        &self.common_labels
    }

    fn decorate(&self, entry: &mut Entry) {
        entry.timestamp.get_or_insert_with(Utc::now);
        entry
            .insert_id
            .get_or_insert_with(|| Uuid::new_v4().simple().to_string());
        for (key, value) in &self.common_labels {
            entry
                .labels
                .entry(key.clone())
                .or_insert_with(|| value.clone());
        }
    }
}

impl LogSink for StreamLogger {
    fn name(&self) -> &str {
        &self.log_name
    }

    fn log(&self, mut entry: Entry) {
        if self.shared.closed.load(Ordering::Acquire) {
            self.shared.report(ClientError::Closed(self.log_name.clone()));
            return;
        }
        self.decorate(&mut entry);

        let record = LogRecord {
            log_name: self.log_name.clone(),
            entry,
        };
        match self.shared.queue.try_send(Command::Deliver(record)) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                self.shared.report(ClientError::BufferFull(self.log_name.clone()));
            }
            Err(TrySendError::Closed(_)) => {
                self.shared.report(ClientError::Closed(self.log_name.clone()));
            }
        }
    }
}
