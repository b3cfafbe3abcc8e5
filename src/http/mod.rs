//! HTTP integration subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, trace + timeout layers)
//!     → middleware/group_logging.rs (open group from request, attach RequestLogger)
//!     → handler (logs inner entries through Extension<RequestLogger>)
//!     → middleware closes the group with status, sizes and latency
//! ```

pub mod middleware;
pub mod server;

pub use middleware::{group_logging_middleware, GroupLoggingState, RequestLogger};
pub use server::HttpServer;
