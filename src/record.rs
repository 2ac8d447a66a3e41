//! The per-request bundle handed to a log formatter.

use std::time::Duration;

use chrono::{DateTime, Local};
use http::Method;

/// Everything known about one request once its response is ready.
///
/// Built by [`RequestLogger`](crate::RequestLogger) after the downstream
/// pipeline returns, passed by reference to the formatter, then dropped.
#[derive(Clone, Debug)]
pub struct LogRecord {
    /// When the response came back through the logger.
    pub timestamp: DateTime<Local>,
    /// Resolved client address; empty when the peer is unknown.
    pub client_ip: String,
    pub method: Method,
    /// Request path, with `?query` appended when the query is non-empty.
    pub path: String,
    /// `HTTP/1.1`, `HTTP/2.0`, …
    pub protocol: String,
    pub user_agent: String,
    /// Request body as submitted by the client; empty if it could not be read.
    pub body: String,
    pub status: u16,
    /// Response body length in bytes.
    pub body_size: usize,
    pub latency: Duration,
    /// Private errors recorded on the response, or empty.
    pub error_message: String,
}
