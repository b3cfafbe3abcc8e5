//! Grouped request logging.
//!
//! Every entry written while handling one unit of work (typically an HTTP
//! request) goes to an inner stream stamped with a shared group ID. Closing
//! the group writes one outer entry to a companion stream carrying the same
//! ID, the highest inner severity, and the request statistics, so a log
//! viewer can nest the inner entries under it.
//!
//! ```text
//!   request ──▶ group::id ──▶ GroupLogger ──▶ StreamLogger ──▶ worker ──▶ Transport
//!                  │             │   ▲       (<name>-app)       │
//!   X-Cloud-Trace-Context        │   └── Entry, Severity        │
//!   or a new UUID                └── close ──▶ StreamLogger ────┘
//!                                              (<name>-request)
//! ```

// Core
pub mod backend;
pub mod entry;
pub mod group;

// Integration
pub mod http;
pub mod platform;

// Cross-cutting concerns
pub mod config;
pub mod observability;

pub use backend::{Client, ClientError, ClientOptions, LoggerOptions};
pub use config::schema::GroupLogConfig;
pub use entry::{Entry, HttpRequest, RequestContext, Severity};
pub use group::GroupLogger;
pub use http::{HttpServer, RequestLogger};
