//! Request context and completion statistics attached to outer entries.

use axum::http::header::{self, AsHeaderName, HeaderName};
use axum::http::{request::Parts, HeaderMap, HeaderValue, Method, Request, Uri, Version};
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

/// Snapshot of the request a group was opened for.
///
/// Only the head of the request is kept: method, URI, version and headers.
#[derive(Debug, Clone)]
pub struct RequestContext {
    method: Method,
    uri: Uri,
    version: Version,
    headers: HeaderMap,
}

impl RequestContext {
    /// Create a context with no headers.
    pub fn new(method: Method, uri: Uri) -> Self {
        Self {
            method,
            uri,
            version: Version::HTTP_11,
            headers: HeaderMap::new(),
        }
    }

    /// Snapshot the head of a request that has been split into parts.
    pub fn from_parts(parts: &Parts) -> Self {
        Self {
            method: parts.method.clone(),
            uri: parts.uri.clone(),
            version: parts.version,
            headers: parts.headers.clone(),
        }
    }

    /// Snapshot the head of a full request.
    pub fn from_request<B>(request: &Request<B>) -> Self {
        Self {
            method: request.method().clone(),
            uri: request.uri().clone(),
            version: request.version(),
            headers: request.headers().clone(),
        }
    }

    /// Builder-style header insertion, replacing any previous value.
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    pub fn version(&self) -> Version {
        self.version
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// First value of the header, if present and valid visible ASCII.
    pub fn header<K: AsHeaderName>(&self, name: K) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn user_agent(&self) -> Option<&str> {
        self.header(header::USER_AGENT)
    }

    pub fn referer(&self) -> Option<&str> {
        self.header(header::REFERER)
    }
}

/// Completion statistics for a unit of work.
///
/// `HttpRequest::default()` is the zero value: no request, no status, no
/// sizes, no latency. Zero fields are left out when serialized.
#[derive(Debug, Clone, Default)]
pub struct HttpRequest {
    /// The request the statistics describe.
    pub request: Option<Arc<RequestContext>>,
    /// Size of the request in bytes, including headers and body.
    pub request_size: u64,
    /// Response status code; 0 when unknown.
    pub status: u16,
    /// Size of the response body in bytes.
    pub response_size: u64,
    /// Time between receiving the request and finishing the response.
    pub latency: Duration,
    /// IP address of the server that handled the request.
    pub local_ip: Option<String>,
    /// IP address of the client.
    pub remote_ip: Option<String>,
    pub cache_hit: bool,
    pub cache_validated_with_origin_server: bool,
}

/// Duration in the backend's `"<seconds>.<nanos>s"` notation.
fn format_latency(latency: Duration) -> String {
    format!("{}.{:09}s", latency.as_secs(), latency.subsec_nanos())
}

impl Serialize for HttpRequest {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(None)?;
        if let Some(request) = &self.request {
            map.serialize_entry("requestMethod", request.method().as_str())?;
            map.serialize_entry("requestUrl", &request.uri().to_string())?;
            if let Some(agent) = request.user_agent() {
                map.serialize_entry("userAgent", agent)?;
            }
            if let Some(referer) = request.referer() {
                map.serialize_entry("referer", referer)?;
            }
            map.serialize_entry("protocol", &format!("{:?}", request.version()))?;
        }
        if self.request_size > 0 {
            map.serialize_entry("requestSize", &self.request_size.to_string())?;
        }
        if self.status != 0 {
            map.serialize_entry("status", &self.status)?;
        }
        if self.response_size > 0 {
            map.serialize_entry("responseSize", &self.response_size.to_string())?;
        }
        if !self.latency.is_zero() {
            map.serialize_entry("latency", &format_latency(self.latency))?;
        }
        if let Some(ip) = &self.local_ip {
            map.serialize_entry("serverIp", ip)?;
        }
        if let Some(ip) = &self.remote_ip {
            map.serialize_entry("remoteIp", ip)?;
        }
        if self.cache_hit {
            map.serialize_entry("cacheHit", &true)?;
        }
        if self.cache_validated_with_origin_server {
            map.serialize_entry("cacheValidatedWithOriginServer", &true)?;
        }
        map.end()
    }
}
