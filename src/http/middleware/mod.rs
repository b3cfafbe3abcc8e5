//! Request middleware.

pub mod group_logging;

pub use group_logging::{group_logging_middleware, GroupLoggingState, RequestLogger};
