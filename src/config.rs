//! Request-logger configuration.

use std::fmt;
use std::sync::Arc;

use serde::Deserialize;

use crate::client_ip::TrustedProxies;
use crate::formatter::Formatter;
use crate::record::LogRecord;
use crate::sink::Sink;

/// Options for [`RequestLogger::with_config`](crate::RequestLogger::with_config).
///
/// Every option is optional. The plain-data fields deserialise, so the
/// logger section can live in whatever config file the host already loads:
///
/// ```rust
/// use reqlog::LoggerConfig;
///
/// let config: LoggerConfig = serde_json::from_str(r#"{
///     "skip_paths": ["/healthz", "/readyz"],
///     "trusted_proxies": "all"
/// }"#).unwrap();
/// ```
///
/// Formatter and sink are code, set with the builder methods.
#[derive(Default, Deserialize)]
#[serde(default)]
pub struct LoggerConfig {
    #[serde(skip)]
    pub formatter: Option<Formatter>,

    /// Defaults to [`TracingSink`](crate::TracingSink).
    #[serde(skip)]
    pub sink: Option<Arc<dyn Sink>>,

    /// Exact request paths (no query string) that are never logged.
    pub skip_paths: Vec<String>,

    pub trusted_proxies: TrustedProxies,
}

impl LoggerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn formatter<F>(mut self, f: F) -> Self
    where
        F: Fn(&LogRecord) -> String + Send + Sync + 'static,
    {
        self.formatter = Some(Arc::new(f));
        self
    }

    pub fn sink(mut self, sink: impl Sink) -> Self {
        self.sink = Some(Arc::new(sink));
        self
    }

    pub fn skip_paths<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.skip_paths.extend(paths.into_iter().map(Into::into));
        self
    }

    pub fn trusted_proxies(mut self, trusted: TrustedProxies) -> Self {
        self.trusted_proxies = trusted;
        self
    }
}

impl fmt::Debug for LoggerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoggerConfig")
            .field("formatter", &self.formatter.as_ref().map(|_| "<fn>"))
            .field("sink", &self.sink.as_ref().map(|_| "<sink>"))
            .field("skip_paths", &self.skip_paths)
            .field("trusted_proxies", &self.trusted_proxies)
            .finish()
    }
}
