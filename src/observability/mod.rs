//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! group / backend subsystems produce:
//!     → logging.rs (diagnostic log events via tracing)
//!     → metrics.rs (counters)
//!
//! Consumers:
//!     → stderr/stdout (fmt layer)
//!     → Metrics endpoint (Prometheus scrape)
//! ```

pub mod logging;
pub mod metrics;
