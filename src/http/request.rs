//! Request envelope.
//!
//! # Responsibilities
//! - Normalize an inbound HTTP request into the shape handlers see
//! - Generate a unique request ID for log correlation
//! - Keep the raw path (query string included) untouched
//!
//! # Design Decisions
//! - Read-only after construction; fields are exposed through getters
//! - Body is fully buffered (no streaming bodies)
//! - Owned by the task serving the connection, dropped after the handler returns

use std::net::{IpAddr, SocketAddr};
use std::str::Utf8Error;

use axum::body::Bytes;
use axum::http::{HeaderMap, HeaderName, HeaderValue};
use uuid::Uuid;

/// Normalized inbound request handed to route handlers.
#[derive(Debug, Clone)]
pub struct Request {
    id: Uuid,
    method: String,
    raw_path: String,
    remote: SocketAddr,
    headers: HeaderMap,
    body: Bytes,
}

impl Request {
    /// Create a request with no headers and an empty body.
    pub fn new(method: impl Into<String>, raw_path: impl Into<String>, remote: SocketAddr) -> Self {
        Self {
            id: Uuid::new_v4(),
            method: method.into(),
            raw_path: raw_path.into(),
            remote,
            headers: HeaderMap::new(),
            body: Bytes::new(),
        }
    }

    /// Replace the header map.
    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    /// Append one header.
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.headers.append(name, value);
        self
    }

    /// Replace the body.
    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    /// Unique ID assigned when the request was received.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// HTTP verb exactly as received.
    pub fn method(&self) -> &str {
        &self.method
    }

    /// Path including any query string.
    pub fn raw_path(&self) -> &str {
        &self.raw_path
    }

    /// Path with the query string removed.
    pub fn path(&self) -> &str {
        strip_query(&self.raw_path)
    }

    /// Query string without the leading `?`, if present.
    pub fn query(&self) -> Option<&str> {
        self.raw_path.split_once('?').map(|(_, query)| query)
    }

    pub fn remote_addr(&self) -> IpAddr {
        self.remote.ip()
    }

    pub fn remote_port(&self) -> u16 {
        self.remote.port()
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// First value of a header, if it is valid visible ASCII.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn body(&self) -> &Bytes {
        &self.body
    }

    /// Body interpreted as UTF-8.
    pub fn body_str(&self) -> Result<&str, Utf8Error> {
        std::str::from_utf8(&self.body)
    }
}

/// Drop everything from the first `?` onwards.
pub(crate) fn strip_query(raw_path: &str) -> &str {
    raw_path
        .split_once('?')
        .map_or(raw_path, |(path, _)| path)
}
