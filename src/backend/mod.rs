//! Logging backend subsystem.
//!
//! # Data Flow
//! ```text
//! GroupLogger
//!     → sink.rs (StreamLogger: labels, timestamp, non-blocking enqueue)
//!     → client.rs (bounded queue → delivery worker)
//!     → transport.rs (JSON lines to stdout/file, or in-memory)
//!
//! Failures at any step:
//!     → ClientError → error handler (set once) or a tracing warning
//! ```
//!
//! # Design Decisions
//! - Callers of logging methods never see delivery errors
//! - One logical log maps to two streams: `<name>-request` and `<name>-app`
//! - Transports are pluggable behind an async trait

pub mod client;
pub mod sink;
pub mod transport;
pub mod types;

pub use client::{inner_log_name, outer_log_name, Client, ClientOptions, INNER_SUFFIX, OUTER_SUFFIX};
pub use sink::{LogSink, LoggerOptions, StreamLogger};
pub use transport::{LogRecord, MemoryTransport, Transport, WriterTransport};
pub use types::{ClientError, ClientResult, ErrorHandler, TransportError};
