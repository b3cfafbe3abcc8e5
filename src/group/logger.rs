//! Group accumulator.

use serde::Serialize;
use std::fmt;
use std::sync::Arc;

use crate::backend::LogSink;
use crate::entry::{Entry, HttpRequest, RequestContext, Severity};
use crate::observability::metrics;

/// Which of the group's two streams an entry goes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stream {
    /// The summary stream, one entry per group.
    Outer,
    /// The detail stream.
    Inner,
}

impl Stream {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stream::Outer => "outer",
            Stream::Inner => "inner",
        }
    }
}

/// Writes a group of entries correlated by a shared group ID.
///
/// Inner entries go to the inner stream as they are logged. Closing the
/// group writes one outer entry whose severity is the highest inner
/// severity seen so far. Closing does not clear the inner entries, and a
/// group may be closed more than once; each close writes its own outer
/// entry.
///
/// Logging takes `&mut self`. Tasks sharing one logger must serialize
/// access themselves, e.g. through [`crate::http::RequestLogger`].
pub struct GroupLogger {
    request: Option<Arc<RequestContext>>,
    group_id: String,
    outer: Arc<dyn LogSink>,
    inner: Arc<dyn LogSink>,
    inner_entries: Vec<Entry>,
}

impl GroupLogger {
    /// Create a logger for one group bound to an outer and an inner stream.
    pub fn new(
        request: Option<Arc<RequestContext>>,
        group_id: impl Into<String>,
        outer: Arc<dyn LogSink>,
        inner: Arc<dyn LogSink>,
    ) -> Self {
        Self {
            request,
            group_id: group_id.into(),
            outer,
            inner,
            inner_entries: Vec::new(),
        }
    }

    pub fn group_id(&self) -> &str {
        &self.group_id
    }

    pub fn request(&self) -> Option<&Arc<RequestContext>> {
        self.request.as_ref()
    }

    /// Inner entries logged so far, in call order, with their trace stamped.
    pub fn inner_entries(&self) -> &[Entry] {
        &self.inner_entries
    }

    /// Stamp the group ID onto the entry and submit it to the chosen stream.
    fn log_to(&self, stream: Stream, mut entry: Entry) -> Entry {
        entry.trace = self.group_id.clone();
        metrics::record_entry(stream.as_str(), entry.severity);
        let sink = match stream {
            Stream::Outer => &self.outer,
            Stream::Inner => &self.inner,
        };
        sink.log(entry.clone());
        entry
    }

    /// Push an inner entry for the group, decorated with the group ID.
    pub fn log_inner_entry(&mut self, entry: Entry) {
        let entry = self.log_to(Stream::Inner, entry);
        self.inner_entries.push(entry);
    }

    /// Push the top-level entry for the group, decorated with the group ID.
    ///
    /// The backend only nests inner entries under an outer entry that
    /// carries `http_request`.
    pub fn log_outer_entry(&self, entry: Entry) {
        self.log_to(Stream::Outer, entry);
    }

    /// Same as [`GroupLogger::log_inner_entry`].
    pub fn log(&mut self, entry: Entry) {
        self.log_inner_entry(entry);
    }

    pub fn default<P: Serialize>(&mut self, payload: P) {
        self.log_inner_entry(Entry::new(Severity::Default, payload));
    }

    pub fn debug<P: Serialize>(&mut self, payload: P) {
        self.log_inner_entry(Entry::new(Severity::Debug, payload));
    }

    pub fn info<P: Serialize>(&mut self, payload: P) {
        self.log_inner_entry(Entry::new(Severity::Info, payload));
    }

    pub fn notice<P: Serialize>(&mut self, payload: P) {
        self.log_inner_entry(Entry::new(Severity::Notice, payload));
    }

    pub fn warning<P: Serialize>(&mut self, payload: P) {
        self.log_inner_entry(Entry::new(Severity::Warning, payload));
    }

    pub fn error<P: Serialize>(&mut self, payload: P) {
        self.log_inner_entry(Entry::new(Severity::Error, payload));
    }

    pub fn critical<P: Serialize>(&mut self, payload: P) {
        self.log_inner_entry(Entry::new(Severity::Critical, payload));
    }

    pub fn alert<P: Serialize>(&mut self, payload: P) {
        self.log_inner_entry(Entry::new(Severity::Alert, payload));
    }

    pub fn emergency<P: Serialize>(&mut self, payload: P) {
        self.log_inner_entry(Entry::new(Severity::Emergency, payload));
    }

    /// Highest severity among the inner entries, `Default` when there are none.
    pub fn max_severity(&self) -> Severity {
        self.inner_entries
            .iter()
            .map(|e| e.severity)
            .fold(Severity::Default, Severity::max)
    }

    /// Close the group without statistics. Status, sizes and latency are zero.
    pub fn close(&self) {
        self.close_with(HttpRequest::default());
    }

    /// Close the group: write the outer entry carrying the group ID, the
    /// maximum inner severity and `stats` bound to the group's request.
    ///
    /// Without a close (or an explicit outer entry) nothing from this group
    /// appears in the outer log.
    pub fn close_with(&self, mut stats: HttpRequest) {
        stats.request = self.request.clone();
        let severity = self.max_severity();
        let entry = Entry {
            severity,
            http_request: Some(stats),
            trace: self.group_id.clone(),
            ..Default::default()
        };
        self.log_outer_entry(entry);
        metrics::record_group_closed(severity);
        tracing::trace!(
            group_id = %self.group_id,
            severity = %severity,
            inner_entries = self.inner_entries.len(),
            "Group closed"
        );
    }
}

impl fmt::Debug for GroupLogger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GroupLogger")
            .field("group_id", &self.group_id)
            .field("outer", &self.outer.name())
            .field("inner", &self.inner.name())
            .field("inner_entries", &self.inner_entries.len())
            .finish()
    }
}
