//! Logging client.
//!
//! # Responsibilities
//! - Validate the parent resource entries are written under
//! - Hand out named streams and per-request group loggers
//! - Own the delivery worker that drains queued records into the transport
//! - Route delivery failures to a single out-of-band error handler
//!
//! # Design Decisions
//! - Submission is a non-blocking `try_send`; the worker does the I/O
//! - The error handler is set at most once
//! - `close` drains everything queued before it, then flushes

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, OnceLock};
use tokio::runtime::Handle;
use tokio::sync::{mpsc, oneshot};

use crate::backend::sink::{LoggerOptions, StreamLogger};
use crate::backend::transport::{LogRecord, Transport, WriterTransport};
use crate::backend::types::{ClientError, ClientResult, ErrorHandler, TransportError};
use crate::config::schema::{BackendConfig, OutputKind};
use crate::entry::{Entry, RequestContext, Severity};
use crate::group::{new_group_id, resolve_group_id, GroupLogger};
use crate::observability::metrics;

/// Suffix of the stream holding one summary entry per group.
pub const OUTER_SUFFIX: &str = "-request";
/// Suffix of the stream holding the grouped entries.
pub const INNER_SUFFIX: &str = "-app";

const PARENT_KINDS: [&str; 4] = ["projects", "folders", "billingAccounts", "organizations"];

/// Name of the outer stream for a logical log, e.g. `app-request`.
pub fn outer_log_name(name: &str) -> String {
    format!("{}{}", name, OUTER_SUFFIX)
}

/// Name of the inner stream for a logical log, e.g. `app-app`.
pub fn inner_log_name(name: &str) -> String {
    format!("{}{}", name, INNER_SUFFIX)
}

/// Accept `<kind>/<id>` parents or a bare project ID.
fn normalize_parent(parent: &str) -> ClientResult<String> {
    let parent = parent.trim();
    if parent.is_empty() {
        return Err(ClientError::InvalidParent(parent.to_string()));
    }
    if !parent.contains('/') {
        return Ok(format!("projects/{}", parent));
    }
    match parent.split_once('/') {
        Some((kind, id)) if PARENT_KINDS.contains(&kind) && !id.is_empty() && !id.contains('/') => {
            Ok(parent.to_string())
        }
        _ => Err(ClientError::InvalidParent(parent.to_string())),
    }
}

pub(crate) enum Command {
    Deliver(LogRecord),
    Flush(oneshot::Sender<()>),
    Shutdown(oneshot::Sender<()>),
}

#[derive(Default)]
struct ErrorReporter {
    handler: OnceLock<ErrorHandler>,
}

impl ErrorReporter {
    fn report(&self, err: ClientError) {
        metrics::record_delivery_error(err.kind());
        match self.handler.get() {
            Some(handler) => handler(err),
            None => tracing::warn!(error = %err, "Log delivery failed"),
        }
    }
}

/// State shared between the client and its streams.
pub(crate) struct Shared {
    parent: String,
    pub(crate) queue: mpsc::Sender<Command>,
    pub(crate) closed: AtomicBool,
    reporter: Arc<ErrorReporter>,
}

impl Shared {
    pub(crate) fn report(&self, err: ClientError) {
        self.reporter.report(err);
    }
}

/// Client construction options.
#[derive(Clone)]
pub struct ClientOptions {
    /// Entries that may wait for delivery before new ones are dropped.
    pub buffer_capacity: usize,
    /// Error handler installed at construction.
    pub on_error: Option<ErrorHandler>,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            buffer_capacity: 1024,
            on_error: None,
        }
    }
}

/// Creates group loggers bound to one parent and one transport.
///
/// Cheap to clone; reuse one client across requests.
#[derive(Clone)]
pub struct Client {
    shared: Arc<Shared>,
    transport: Arc<dyn Transport>,
}

impl Client {
    /// Create a client and spawn its delivery worker on the current runtime.
    pub fn new(
        parent: &str,
        transport: Arc<dyn Transport>,
        options: ClientOptions,
    ) -> ClientResult<Self> {
        let parent = normalize_parent(parent)?;
        let runtime = Handle::try_current().map_err(|_| ClientError::NoRuntime)?;

        let reporter = Arc::new(ErrorReporter::default());
        if let Some(handler) = options.on_error {
            let _ = reporter.handler.set(handler);
        }

        let capacity = options.buffer_capacity.max(1);
        let (queue, receiver) = mpsc::channel(capacity);
        runtime.spawn(run_delivery(transport.clone(), receiver, reporter.clone()));

        tracing::info!(
            parent = %parent,
            buffer_capacity = capacity,
            "Logging client initialized"
        );

        Ok(Self {
            shared: Arc::new(Shared {
                parent,
                queue,
                closed: AtomicBool::new(false),
                reporter,
            }),
            transport,
        })
    }

    /// Create a client writing to the transport named in the configuration.
    pub async fn from_config(config: &BackendConfig) -> ClientResult<Self> {
        let transport: Arc<dyn Transport> = match config.output {
            OutputKind::Stdout => Arc::new(WriterTransport::stdout()),
            OutputKind::File => {
                let file = WriterTransport::file(&config.path)
                    .await
                    .map_err(|source| ClientError::Transport {
                        log_name: config.path.display().to_string(),
                        source,
                    })?;
                Arc::new(file)
            }
        };
        let options = ClientOptions {
            buffer_capacity: config.buffer_capacity,
            on_error: None,
        };
        Self::new(&config.parent, transport, options)
    }

    /// Normalized parent, e.g. `projects/my-project`.
    pub fn parent(&self) -> &str {
        &self.shared.parent
    }

    /// Full resource name of a log under this client's parent.
    pub fn full_log_name(&self, log_name: &str) -> String {
        format!("{}/logs/{}", self.shared.parent, log_name.replace('/', "%2F"))
    }

    /// A single named stream.
    pub fn stream(&self, log_name: &str, options: &LoggerOptions) -> Arc<StreamLogger> {
        Arc::new(StreamLogger::new(
            self.full_log_name(log_name),
            options,
            self.shared.clone(),
        ))
    }

    /// Open a group for one unit of work under the logical log `name`.
    ///
    /// The outer stream is `<name>-request`, the inner `<name>-app`. The group
    /// ID is the request's trace header when present, otherwise a new UUID.
    pub fn logger(
        &self,
        request: Option<Arc<RequestContext>>,
        name: &str,
        options: &LoggerOptions,
    ) -> GroupLogger {
        let outer = self.stream(&outer_log_name(name), options);
        let inner = self.stream(&inner_log_name(name), options);
        let group_id = resolve_group_id(request.as_deref(), new_group_id);
        GroupLogger::new(request, group_id, outer, inner)
    }

    /// Check that the transport accepts writes by writing `"ping"` to the
    /// log `ping`. Bypasses the delivery queue.
    pub async fn ping(&self) -> ClientResult<()> {
        let log_name = self.full_log_name("ping");
        let mut entry = Entry::new(Severity::Default, "ping");
        entry.timestamp = Some(chrono::Utc::now());
        let record = LogRecord {
            log_name: log_name.clone(),
            entry,
        };
        let delivered = match self.transport.write(&record).await {
            Ok(()) => self.transport.flush().await,
            Err(e) => Err(e),
        };
        delivered.map_err(|source| ClientError::Transport { log_name, source })
    }

    /// Install the function called when delivery fails. Can be set once,
    /// including through [`ClientOptions::on_error`].
    pub fn set_on_error<F>(&self, handler: F) -> ClientResult<()>
    where
        F: Fn(ClientError) + Send + Sync + 'static,
    {
        self.shared
            .reporter
            .handler
            .set(Arc::new(handler))
            .map_err(|_| ClientError::OnErrorAlreadySet)
    }

    /// Wait until every entry queued so far has been handed to the transport,
    /// then flush it.
    pub async fn flush(&self) -> ClientResult<()> {
        let (ack, done) = oneshot::channel();
        self.shared
            .queue
            .send(Command::Flush(ack))
            .await
            .map_err(|_| ClientError::Closed(self.shared.parent.clone()))?;
        done.await
            .map_err(|_| ClientError::Closed(self.shared.parent.clone()))
    }

    /// Stop accepting entries, deliver everything already queued and flush.
    /// Later submissions are reported as [`ClientError::Closed`].
    pub async fn close(&self) -> ClientResult<()> {
        if self.shared.closed.swap(true, Ordering::AcqRel) {
            return Ok(());
        }
        let (ack, done) = oneshot::channel();
        if self.shared.queue.send(Command::Shutdown(ack)).await.is_ok() {
            let _ = done.await;
        }
        tracing::info!(parent = %self.shared.parent, "Logging client closed");
        Ok(())
    }
}

async fn flush_transport(transport: &Arc<dyn Transport>, reporter: &ErrorReporter) {
    if let Err(source) = transport.flush().await {
        reporter.report(ClientError::Transport {
            log_name: "*".to_string(),
            source,
        });
    }
}

async fn deliver(transport: &Arc<dyn Transport>, reporter: &ErrorReporter, record: LogRecord) {
    let result: Result<(), TransportError> = transport.write(&record).await;
    if let Err(source) = result {
        reporter.report(ClientError::Transport {
            log_name: record.log_name,
            source,
        });
    }
}

/// Delivery worker. Runs until shutdown or until every sender is gone.
async fn run_delivery(
    transport: Arc<dyn Transport>,
    mut queue: mpsc::Receiver<Command>,
    reporter: Arc<ErrorReporter>,
) {
    while let Some(command) = queue.recv().await {
        match command {
            Command::Deliver(record) => deliver(&transport, &reporter, record).await,
            Command::Flush(ack) => {
                flush_transport(&transport, &reporter).await;
                let _ = ack.send(());
            }
            Command::Shutdown(ack) => {
                queue.close();
                while let Ok(late) = queue.try_recv() {
                    match late {
                        Command::Deliver(record) => {
                            reporter.report(ClientError::Closed(record.log_name));
                        }
                        Command::Flush(other) | Command::Shutdown(other) => {
                            let _ = other.send(());
                        }
                    }
                }
                flush_transport(&transport, &reporter).await;
                let _ = ack.send(());
                tracing::debug!("Delivery worker stopped");
                return;
            }
        }
    }
    flush_transport(&transport, &reporter).await;
}
