//! Entry grouping.
//!
//! # Data Flow
//! ```text
//! incoming request (optional)
//!     → id.rs (trace header or generated UUID)
//!     → logger.rs (GroupLogger: inner entries stamped + accumulated)
//!     → close / close_with (one outer entry at max inner severity)
//! ```
//!
//! # Design Decisions
//! - The ID generator is a parameter so tests can pin it
//! - Both streams share one stamp-and-submit primitive
//! - Severity is aggregated at close time, not tracked by the caller

pub mod id;
pub mod logger;

pub use id::{new_group_id, resolve_group_id, TRACE_HEADER};
pub use logger::{GroupLogger, Stream};
