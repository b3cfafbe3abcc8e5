//! Log entry model.
//!
//! # Data Flow
//! ```text
//! caller payload (impl Serialize)
//!     → record.rs (Entry: severity + JSON payload + trace)
//!     → http_request.rs (completion statistics on outer entries)
//!     → serialized by the transport in the backend's LogEntry shape
//! ```
//!
//! # Design Decisions
//! - Severity is an ordered enum; max-selection never compares names
//! - Payloads are opaque JSON values
//! - Zero-valued fields are omitted on the wire

pub mod http_request;
pub mod record;
pub mod severity;

pub use http_request::{HttpRequest, RequestContext};
pub use record::Entry;
pub use severity::Severity;
