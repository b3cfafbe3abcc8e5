//! Group identifier resolution.

use crate::entry::RequestContext;

/// Header set by the platform's frontend carrying the request's trace.
pub const TRACE_HEADER: &str = "X-Cloud-Trace-Context";

/// Select the identifier by which a group is correlated in the backend.
///
/// A non-empty trace header on the request is used verbatim, including
/// non-ASCII bytes. Otherwise (no request, missing or empty header)
/// `generate` supplies the ID.
pub fn resolve_group_id<F>(request: Option<&RequestContext>, generate: F) -> String
where
    F: FnOnce() -> String,
{
    match request.and_then(|r| r.headers().get(TRACE_HEADER)) {
        Some(trace) if !trace.is_empty() => {
            String::from_utf8_lossy(trace.as_bytes()).into_owned()
        }
        _ => generate(),
    }
}

/// Random UUID v4 group identifier.
pub fn new_group_id() -> String {
    uuid::Uuid::new_v4().to_string()
}
