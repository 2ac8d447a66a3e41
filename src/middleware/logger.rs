//! Per-request access logging.
//!
//! # What happens to one request
//!
//! ```text
//! enter ── start timer
//!   │
//!   ├── read body once ──▶ Bytes ─┬─▶ back onto the request → downstream
//!   │                              └─▶ kept for the log line
//!   │
//!   ├── next.run(req).await        (everything inside is timed)
//!   │
//!   ├── path in skip set? ──yes──▶ return response, log nothing
//!   │
//!   ├── build LogRecord, format it
//!   ├── sink.log(severity(status), line)
//!   └── recorded errors? ──yes──▶ sink.log(Error, "err: …")
//! ```
//!
//! The logger never changes the response and never fails the request: body
//! read errors, formatter panics and sink trouble all stay inside it.

use std::collections::HashSet;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::{Duration, Instant};

use bytes::Bytes;
use chrono::Local;
use http::header::USER_AGENT;

use crate::body;
use crate::client_ip::{self, TrustedProxies};
use crate::config::LoggerConfig;
use crate::formatter::{self, Formatter};
use crate::handler::BoxFuture;
use crate::handler_error;
use crate::middleware::{Middleware, Next};
use crate::record::LogRecord;
use crate::request::Request;
use crate::response::Response;
use crate::severity::Severity;
use crate::sink::{Sink, TracingSink};

/// Access-log middleware.
///
/// Writes one line per request at a severity picked from the response
/// status, plus an `err: …` line when handlers recorded errors. Install it
/// first so it times everything else:
///
/// ```rust
/// use reqlog::{LoggerConfig, Recovery, RequestLogger, Router};
///
/// let app = Router::new()
///     .wrap(RequestLogger::with_config(
///         LoggerConfig::new().skip_paths(["/healthz"]),
///     ))
///     .wrap(Recovery);
/// ```
///
/// Cloning is cheap; clones share one configuration.
#[derive(Clone)]
pub struct RequestLogger {
    inner: Arc<Inner>,
}

struct Inner {
    formatter: Option<Formatter>,
    sink: Arc<dyn Sink>,
    skip: HashSet<String>,
    trusted_proxies: TrustedProxies,
}

/// What the logger learned about the request before handing it downstream.
struct Captured {
    start: Instant,
    path: String,
    query: Option<String>,
    body: Option<Bytes>,
    client_ip: String,
    method: http::Method,
    protocol: String,
    user_agent: String,
}

impl RequestLogger {
    /// Logger with the default format, writing to [`TracingSink`].
    pub fn new() -> Self {
        Self::with_config(LoggerConfig::default())
    }

    pub fn with_config(config: LoggerConfig) -> Self {
        let LoggerConfig { formatter, sink, skip_paths, trusted_proxies } = config;
        let inner = Inner {
            formatter,
            sink: sink.unwrap_or_else(|| Arc::new(TracingSink)),
            skip: skip_paths.into_iter().collect(),
            trusted_proxies,
        };
        Self { inner: Arc::new(inner) }
    }
}

impl Default for RequestLogger {
    fn default() -> Self { Self::new() }
}

impl Middleware for RequestLogger {
    fn call(&self, req: Request, next: Next) -> BoxFuture {
        let inner = Arc::clone(&self.inner);
        Box::pin(async move { inner.handle(req, next).await })
    }
}

impl Inner {
    async fn handle(&self, mut req: Request, next: Next) -> Response {
        let start = Instant::now();

        let body = match body::read_to_bytes(req.take_body()).await {
            Ok(bytes) => {
                req.set_body(bytes.clone().into());
                Some(bytes)
            }
            Err(failure) => {
                tracing::debug!(error = %failure.error(), "request body unreadable, logging it empty");
                req.set_body(failure.replay());
                None
            }
        };

        let captured = Captured {
            start,
            path: req.uri().path().to_owned(),
            query: req.uri().query().map(str::to_owned),
            body,
            client_ip: client_ip::resolve(&req, &self.trusted_proxies)
                .map(|ip| ip.to_string())
                .unwrap_or_default(),
            method: req.method().clone(),
            protocol: format!("{:?}", req.version()),
            user_agent: req.header(USER_AGENT.as_str()).unwrap_or_default().to_owned(),
        };

        let response = next.run(req).await;
        let latency = captured.start.elapsed();

        if self.skip.contains(&captured.path) {
            return response;
        }

        let record = captured.into_record(&response, latency);
        let line = self.render(&record);
        self.sink.log(Severity::from_status(record.status), &line);

        if !response.errors().is_empty() {
            let all = handler_error::render(response.errors());
            self.sink.log(Severity::Error, &format!("err: {all}"));
        }

        response
    }

    /// Custom formatter if configured, the default one otherwise or if the
    /// custom one panics.
    fn render(&self, record: &LogRecord) -> String {
        let Some(custom) = &self.formatter else {
            return formatter::default_format(record);
        };
        match panic::catch_unwind(AssertUnwindSafe(|| custom(record))) {
            Ok(line) => line,
            Err(_) => {
                tracing::warn!("custom log formatter panicked, using the default format");
                formatter::default_format(record)
            }
        }
    }
}

impl Captured {
    fn into_record(self, response: &Response, latency: Duration) -> LogRecord {
        let path = match self.query.as_deref() {
            Some(q) if !q.is_empty() => format!("{}?{q}", self.path),
            _ => self.path,
        };
        LogRecord {
            timestamp: Local::now(),
            client_ip: self.client_ip,
            method: self.method,
            path,
            protocol: self.protocol,
            user_agent: self.user_agent,
            body: self.body.map(|b| String::from_utf8_lossy(&b).into_owned()).unwrap_or_default(),
            status: response.status_code().as_u16(),
            body_size: response.size(),
            latency,
            error_message: handler_error::render_private(response.errors()),
        }
    }
}
