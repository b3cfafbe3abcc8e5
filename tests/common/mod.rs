//! Shared utilities for integration tests.

#![allow(dead_code)]

use axum::body::Body;
use axum::http::{Method, Request};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;

use group_logger::backend::{Client, ClientOptions, LoggerOptions, MemoryTransport};
use group_logger::config::GroupLogConfig;
use group_logger::group::TRACE_HEADER;
use group_logger::HttpServer;

pub const PARENT: &str = "projects/test-project";

/// Client backed by an in-memory transport. Must be called inside a runtime.
pub fn memory_client() -> (Arc<Client>, Arc<MemoryTransport>) {
    memory_client_with(ClientOptions::default())
}

pub fn memory_client_with(options: ClientOptions) -> (Arc<Client>, Arc<MemoryTransport>) {
    let transport = Arc::new(MemoryTransport::new());
    let client = Client::new(PARENT, transport.clone(), options).unwrap();
    (Arc::new(client), transport)
}

/// Full log name under [`PARENT`].
pub fn log_name(name: &str) -> String {
    format!("{}/logs/{}", PARENT, name)
}

/// Build a request, optionally carrying the trace header.
pub fn traced_request(method: Method, uri: &str, trace: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(trace) = trace {
        builder = builder.header(TRACE_HEADER, trace);
    }
    builder.body(Body::empty()).unwrap()
}

/// Config for the demo server using `log_name`, bound to an ephemeral port.
pub fn server_config(log_name: &str) -> GroupLogConfig {
    let mut config = GroupLogConfig::default();
    config.server.bind_address = "127.0.0.1:0".into();
    config.server.log_name = log_name.into();
    config.metadata.hostname_label = false;
    config
}

/// Start the demo server on an ephemeral port and return its address.
pub async fn start_server(config: GroupLogConfig, client: Arc<Client>) -> SocketAddr {
    let listener = TcpListener::bind(&config.server.bind_address).await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = HttpServer::new(config, client, LoggerOptions::new());
    tokio::spawn(async move {
        let _ = server.run(listener).await;
    });
    addr
}
