//! Per-request group logging.
//! Opens a group for every request and closes it once the response is ready.

use axum::{
    body::{Body, HttpBody},
    extract::{ConnectInfo, Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};
use serde::Serialize;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Instant;

use crate::backend::{Client, LoggerOptions};
use crate::entry::{Entry, HttpRequest, RequestContext, Severity};
use crate::group::GroupLogger;

/// State for [`group_logging_middleware`].
#[derive(Clone)]
pub struct GroupLoggingState {
    pub client: Arc<Client>,
    pub log_name: Arc<str>,
    pub options: Arc<LoggerOptions>,
}

impl GroupLoggingState {
    pub fn new(client: Arc<Client>, log_name: &str, options: LoggerOptions) -> Self {
        Self {
            client,
            log_name: Arc::from(log_name),
            options: Arc::new(options),
        }
    }
}

/// Handle to the current request's group, available to handlers as
/// `Extension<RequestLogger>`.
///
/// Clones share one [`GroupLogger`]; access is serialized by a mutex.
#[derive(Clone, Debug)]
pub struct RequestLogger(Arc<Mutex<GroupLogger>>);

impl RequestLogger {
    pub fn new(logger: GroupLogger) -> Self {
        Self(Arc::new(Mutex::new(logger)))
    }

    fn lock(&self) -> MutexGuard<'_, GroupLogger> {
        // A panic mid-log leaves the entry list intact; keep using it.
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn group_id(&self) -> String {
        self.lock().group_id().to_string()
    }

    pub fn max_severity(&self) -> Severity {
        self.lock().max_severity()
    }

    /// Log an inner entry.
    pub fn log(&self, entry: Entry) {
        self.lock().log(entry);
    }

    pub fn log_at<P: Serialize>(&self, severity: Severity, payload: P) {
        self.log(Entry::new(severity, payload));
    }

    pub fn default<P: Serialize>(&self, payload: P) {
        self.log_at(Severity::Default, payload);
    }

    pub fn debug<P: Serialize>(&self, payload: P) {
        self.log_at(Severity::Debug, payload);
    }

    pub fn info<P: Serialize>(&self, payload: P) {
        self.log_at(Severity::Info, payload);
    }

    pub fn notice<P: Serialize>(&self, payload: P) {
        self.log_at(Severity::Notice, payload);
    }

    pub fn warning<P: Serialize>(&self, payload: P) {
        self.log_at(Severity::Warning, payload);
    }

    pub fn error<P: Serialize>(&self, payload: P) {
        self.log_at(Severity::Error, payload);
    }

    pub fn critical<P: Serialize>(&self, payload: P) {
        self.log_at(Severity::Critical, payload);
    }

    pub fn alert<P: Serialize>(&self, payload: P) {
        self.log_at(Severity::Alert, payload);
    }

    pub fn emergency<P: Serialize>(&self, payload: P) {
        self.log_at(Severity::Emergency, payload);
    }

    pub fn close_with(&self, stats: HttpRequest) {
        self.lock().close_with(stats);
    }
}

fn content_length(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(header::CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse().ok())
}

fn body_size(headers: &HeaderMap, body: &Body) -> u64 {
    content_length(headers)
        .or_else(|| body.size_hint().exact())
        .unwrap_or(0)
}

/// Closes the group if the handler never returns a response, e.g. when it
/// panics or the request future is dropped. Status stays 0 (unknown).
struct CloseOnDrop {
    logger: RequestLogger,
    started: Instant,
    request_size: u64,
    remote_ip: Option<String>,
    armed: bool,
}

impl CloseOnDrop {
    fn stats(&mut self, status: u16, response_size: u64) -> HttpRequest {
        HttpRequest {
            status,
            request_size: self.request_size,
            response_size,
            latency: self.started.elapsed(),
            remote_ip: self.remote_ip.take(),
            ..Default::default()
        }
    }

    fn close(mut self, status: u16, response_size: u64) {
        self.armed = false;
        let stats = self.stats(status, response_size);
        tracing::debug!(
            group_id = %self.logger.group_id(),
            status = stats.status,
            latency = ?stats.latency,
            "Request group closed"
        );
        self.logger.close_with(stats);
    }
}

impl Drop for CloseOnDrop {
    fn drop(&mut self) {
        if self.armed {
            let stats = self.stats(0, 0);
            tracing::warn!(
                group_id = %self.logger.group_id(),
                latency = ?stats.latency,
                "Request ended without a response"
            );
            self.logger.close_with(stats);
        }
    }
}

/// Group every entry a handler logs under the request's trace ID and write
/// one outer entry with the response statistics when the handler returns.
pub async fn group_logging_middleware(
    State(state): State<GroupLoggingState>,
    mut request: Request,
    next: Next,
) -> Response {
    let started = Instant::now();
    let context = Arc::new(RequestContext::from_request(&request));
    let request_size = body_size(request.headers(), request.body());
    let remote_ip = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string());

    let logger = RequestLogger::new(
        state
            .client
            .logger(Some(context), &state.log_name, &state.options),
    );
    request.extensions_mut().insert(logger.clone());
    let guard = CloseOnDrop {
        logger,
        started,
        request_size,
        remote_ip,
        armed: true,
    };

    let response = next.run(request).await;

    guard.close(
        response.status().as_u16(),
        body_size(response.headers(), response.body()),
    );
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{ClientOptions, MemoryTransport};
    use crate::group::TRACE_HEADER;
    use axum::{
        http::StatusCode, middleware::from_fn_with_state, routing::get, Extension, Router,
    };
    use tower::ServiceExt;

    fn memory_app(route: Router) -> (Router, Arc<Client>, Arc<MemoryTransport>) {
        let transport = Arc::new(MemoryTransport::new());
        let client = Client::new("my-project", transport.clone(), ClientOptions::default());
        let client = Arc::new(client.unwrap());
        let state = GroupLoggingState::new(client.clone(), "web", LoggerOptions::new());
        let app = route.layer(from_fn_with_state(state, group_logging_middleware));
        (app, client, transport)
    }

    async fn handler(Extension(logger): Extension<RequestLogger>) -> &'static str {
        logger.warning("careful");
        logger.info("done");
        "hello"
    }

    #[tokio::test]
    async fn test_one_outer_entry_per_request() {
        let (app, client, transport) = memory_app(Router::new().route("/hello", get(handler)));

        let response = app
            .oneshot(
                axum::http::Request::builder()
                    .uri("/hello")
                    .header(TRACE_HEADER, "abc/1;o=1")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        client.flush().await.unwrap();

        let outer = transport.entries("projects/my-project/logs/web-request");
        assert_eq!(outer.len(), 1);
        assert_eq!(outer[0].trace, "abc/1;o=1");
        assert_eq!(outer[0].severity, Severity::Warning);
        let stats = outer[0].http_request.as_ref().unwrap();
        assert_eq!(stats.status, 200);
        assert_eq!(stats.response_size, 5);
        assert_eq!(stats.request.as_ref().unwrap().uri().path(), "/hello");

        let inner = transport.entries("projects/my-project/logs/web-app");
        assert_eq!(inner.len(), 2);
        assert!(inner.iter().all(|e| e.trace == "abc/1;o=1"));
    }

    async fn failing_handler(Extension(logger): Extension<RequestLogger>) -> &'static str {
        logger.critical("about to fail");
        panic!("handler failed");
    }

    #[tokio::test]
    async fn test_panicking_handler_still_closes_group() {
        let (app, client, transport) =
            memory_app(Router::new().route("/fail", get(failing_handler)));

        let request = axum::http::Request::builder()
            .uri("/fail")
            .header(TRACE_HEADER, "panic-trace")
            .body(Body::empty())
            .unwrap();
        let joined = tokio::spawn(app.oneshot(request)).await;
        assert!(joined.unwrap_err().is_panic());
        client.flush().await.unwrap();

        let outer = transport.entries("projects/my-project/logs/web-request");
        assert_eq!(outer.len(), 1);
        assert_eq!(outer[0].trace, "panic-trace");
        assert_eq!(outer[0].severity, Severity::Critical);
        assert_eq!(outer[0].http_request.as_ref().unwrap().status, 0);
    }

    #[test]
    fn test_body_size_prefers_content_length() {
        let mut headers = HeaderMap::new();
        headers.insert(header::CONTENT_LENGTH, "42".parse().unwrap());
        assert_eq!(body_size(&headers, &Body::from("abc")), 42);
        assert_eq!(body_size(&HeaderMap::new(), &Body::from("abc")), 3);
        assert_eq!(body_size(&HeaderMap::new(), &Body::empty()), 0);
    }
}
