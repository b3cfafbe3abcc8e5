//! Platform detection for host labeling.
//!
//! # Responsibilities
//! - Detect whether the process runs on the managed platform
//! - Resolve the instance name (managed) or OS hostname (elsewhere)
//! - Cache the result for the lifetime of the process
//!
//! # Design Decisions
//! - Labeling is best-effort: lookup failures leave an empty label
//! - The metadata source is a trait so tests can count lookups

pub mod hostname;
pub mod metadata;

pub use self::hostname::{
    with_hostname, with_hostname_from, with_hostname_via, HostnameCache, HOSTNAME_LABEL,
};
pub use self::metadata::{GceMetadata, MetadataError, PlatformInfo, PlatformMetadata};
