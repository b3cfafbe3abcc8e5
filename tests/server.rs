//! Demo server: one group per request.

use axum::body::to_bytes;
use axum::extract::Extension;
use axum::http::{Method, StatusCode};
use axum::routing::get;
use axum::Router;
use serde_json::Value;
use std::time::Duration;
use tower::ServiceExt;

use group_logger::backend::LoggerOptions;
use group_logger::http::GroupLoggingState;
use group_logger::{HttpServer, RequestLogger, Severity};

mod common;

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_echo_route_groups_request() {
    let (client, transport) = common::memory_client();
    let config = common::server_config("shop");
    let server = HttpServer::new(config, client.clone(), LoggerOptions::new());

    let response = server
        .router()
        .oneshot(common::traced_request(Method::GET, "/orders/7", Some("abc/1;o=1")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["group_id"], "abc/1;o=1");
    assert_eq!(body["path"], "/orders/7");
    client.flush().await.unwrap();

    let outer = transport.entries(&common::log_name("shop-request"));
    assert_eq!(outer.len(), 1);
    assert_eq!(outer[0].trace, "abc/1;o=1");
    assert_eq!(outer[0].severity, Severity::Info);
    let stats = outer[0].http_request.as_ref().unwrap();
    assert_eq!(stats.status, 200);
    assert!(stats.response_size > 0);
    assert!(stats.remote_ip.is_none());
    assert_eq!(stats.request.as_ref().unwrap().method(), &Method::GET);

    let inner = transport.entries(&common::log_name("shop-app"));
    assert_eq!(inner.len(), 1);
    assert_eq!(inner[0].payload["path"], "/orders/7");
    assert_eq!(inner[0].trace, "abc/1;o=1");
}

#[tokio::test]
async fn test_generated_group_id_without_header() {
    let (client, transport) = common::memory_client();
    let config = common::server_config("shop");
    let server = HttpServer::new(config, client.clone(), LoggerOptions::new());

    let response = server
        .router()
        .oneshot(common::traced_request(Method::DELETE, "/", None))
        .await
        .unwrap();
    let body = json_body(response).await;
    let group_id = body["group_id"].as_str().unwrap().to_string();
    assert!(uuid::Uuid::parse_str(&group_id).is_ok());
    client.flush().await.unwrap();

    let outer = transport.entries(&common::log_name("shop-request"));
    assert_eq!(outer[0].trace, group_id);
}

#[tokio::test]
async fn test_health_is_not_grouped() {
    let (client, transport) = common::memory_client();
    let config = common::server_config("shop");
    let server = HttpServer::new(config, client.clone(), LoggerOptions::new());

    let response = server
        .router()
        .oneshot(common::traced_request(Method::GET, "/health", None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    client.flush().await.unwrap();

    assert!(transport.is_empty());
}

#[tokio::test]
async fn test_live_server_records_connection_stats() {
    let (client, transport) = common::memory_client();
    let addr = common::start_server(common::server_config("live"), client.clone()).await;

    let http = reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap();
    let res = http
        .post(format!("http://{}/upload", addr))
        .header("X-Cloud-Trace-Context", "live-trace")
        .body("payload")
        .send()
        .await
        .expect("Server unreachable");
    assert_eq!(res.status(), 200);
    client.flush().await.unwrap();

    let outer = transport.entries(&common::log_name("live-request"));
    assert_eq!(outer.len(), 1);
    let stats = outer[0].http_request.as_ref().unwrap();
    assert_eq!(stats.remote_ip.as_deref(), Some("127.0.0.1"));
    assert_eq!(stats.request_size, 7);
    assert_eq!(stats.request.as_ref().unwrap().method(), &Method::POST);
    assert_eq!(outer[0].trace, "live-trace");
}

async fn slow_handler(Extension(logger): Extension<RequestLogger>) -> &'static str {
    logger.error("still working");
    tokio::time::sleep(Duration::from_secs(5)).await;
    "too late"
}

#[tokio::test]
async fn test_timed_out_request_still_closes_group() {
    let (client, transport) = common::memory_client();
    let mut config = common::server_config("slow");
    config.server.request_timeout_secs = 1;
    let state = GroupLoggingState::new(client.clone(), "slow", LoggerOptions::new());
    let routes = Router::new().route("/work", get(slow_handler));
    let app = HttpServer::with_group_logging(routes, &config, state);

    let response = app
        .oneshot(common::traced_request(Method::GET, "/work", Some("slow-trace")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::REQUEST_TIMEOUT);
    client.flush().await.unwrap();

    let inner = transport.entries(&common::log_name("slow-app"));
    assert_eq!(inner.len(), 1);

    let outer = transport.entries(&common::log_name("slow-request"));
    assert_eq!(outer.len(), 1);
    assert_eq!(outer[0].trace, "slow-trace");
    assert_eq!(outer[0].severity, Severity::Error);
    let stats = outer[0].http_request.as_ref().unwrap();
    assert_eq!(stats.status, 408);
    assert!(stats.latency >= Duration::from_secs(1));
}
