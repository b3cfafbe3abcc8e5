//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the demo handlers
//! - Wire up middleware (tracing, timeout, group logging)
//! - Bind server to listener
//! - Graceful shutdown on Ctrl+C

use axum::{
    extract::Extension,
    http::{Method, Uri},
    middleware::from_fn_with_state,
    routing::{any, get},
    Json, Router,
};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::backend::{Client, LoggerOptions};
use crate::config::GroupLogConfig;
use crate::http::middleware::{group_logging_middleware, GroupLoggingState, RequestLogger};

/// Demo HTTP server: every request outside `/health` is logged as a group.
pub struct HttpServer {
    router: Router,
    config: GroupLogConfig,
}

impl HttpServer {
    /// Create a new HTTP server writing groups through `client`.
    pub fn new(config: GroupLogConfig, client: Arc<Client>, options: LoggerOptions) -> Self {
        let state = GroupLoggingState::new(client, &config.server.log_name, options);
        let router = Self::build_router(&config, state);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &GroupLogConfig, state: GroupLoggingState) -> Router {
        let echo = Router::new()
            .route("/{*path}", any(echo_handler))
            .route("/", any(echo_handler));
        Self::with_group_logging(echo, config, state)
            .route("/health", get(health_handler))
            .layer(TraceLayer::new_for_http())
    }

    /// Wrap `routes` so each request is logged as a group.
    ///
    /// The request timeout sits inside the group layer, so a timed-out
    /// request still gets its outer entry, with status 408.
    #[allow(deprecated)]
    pub fn with_group_logging(
        routes: Router,
        config: &GroupLogConfig,
        state: GroupLoggingState,
    ) -> Router {
        routes
            .layer(TimeoutLayer::new(Duration::from_secs(
                config.server.request_timeout_secs,
            )))
            .layer(from_fn_with_state(state, group_logging_middleware))
    }

    /// The configured router, for serving or for driving in tests.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server, accepting connections on the given listener.
    pub async fn run(self, listener: TcpListener) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            log_name = %self.config.server.log_name,
            "HTTP server starting"
        );

        let app = self
            .router
            .into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &GroupLogConfig {
        &self.config
    }
}

async fn health_handler() -> &'static str {
    "OK"
}

/// Logs one inner entry and echoes the request's group.
async fn echo_handler(
    Extension(logger): Extension<RequestLogger>,
    method: Method,
    uri: Uri,
) -> Json<Value> {
    logger.info(json!({
        "message": "handled request",
        "method": method.as_str(),
        "path": uri.path(),
    }));
    Json(json!({
        "group_id": logger.group_id(),
        "path": uri.path(),
    }))
}

/// Wait for shutdown signal (Ctrl+C).
async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Shutdown signal received"),
        Err(e) => {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    }
}
