//! Cloud Logging JSON output for `tracing`.
//!
//! Google Cloud's logging agents parse one JSON object per line on stdout and
//! lift a few well-known keys out of it:
//!
//! ```json
//! {"severity":"WARNING","message":"…","time":"2026-10-19T14:03:07.125Z",
//!  "logging.googleapis.com/sourceLocation":{"file":"src/sink.rs","line":"31"},
//!  "target":"reqlog"}
//! ```
//!
//! [`CloudFormat`] renders every `tracing` event that way. Any structured
//! fields on the event are carried along as extra keys.

use std::fmt;

use chrono::{SecondsFormat, Utc};
use serde_json::{Map, Value, json};
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::registry::LookupSpan;

use crate::error::Error;

/// Event formatter producing Cloud Logging structured JSON lines.
#[derive(Clone, Copy, Debug, Default)]
pub struct CloudFormat;

/// Maps a `tracing` level onto a Cloud Logging `LogSeverity`.
pub fn severity(level: &Level) -> &'static str {
    match *level {
        Level::ERROR => "ERROR",
        Level::WARN  => "WARNING",
        Level::INFO  => "INFO",
        _            => "DEBUG",
    }
}

impl<S, N> FormatEvent<S, N> for CloudFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        _ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let meta = event.metadata();

        let mut entry = Map::new();
        event.record(&mut JsonFields(&mut entry));

        entry.insert("severity".into(), severity(meta.level()).into());
        entry.insert("time".into(), Utc::now().to_rfc3339_opts(SecondsFormat::Nanos, true).into());
        entry.insert("target".into(), meta.target().into());
        if let (Some(file), Some(line)) = (meta.file(), meta.line()) {
            // Cloud Logging expects the line number as a string.
            entry.insert(
                "logging.googleapis.com/sourceLocation".into(),
                json!({ "file": file, "line": line.to_string() }),
            );
        }

        let line = serde_json::to_string(&entry).map_err(|_| fmt::Error)?;
        writeln!(writer, "{line}")
    }
}

/// Collects event fields into a JSON object.
struct JsonFields<'a>(&'a mut Map<String, Value>);

impl Visit for JsonFields<'_> {
    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        self.0.insert(field.name().to_owned(), format!("{value:?}").into());
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        self.0.insert(field.name().to_owned(), value.into());
    }

    fn record_i64(&mut self, field: &Field, value: i64) {
        self.0.insert(field.name().to_owned(), value.into());
    }

    fn record_u64(&mut self, field: &Field, value: u64) {
        self.0.insert(field.name().to_owned(), value.into());
    }

    fn record_f64(&mut self, field: &Field, value: f64) {
        self.0.insert(field.name().to_owned(), value.into());
    }

    fn record_bool(&mut self, field: &Field, value: bool) {
        self.0.insert(field.name().to_owned(), value.into());
    }
}

/// Installs a global subscriber writing Cloud Logging JSON to stdout.
///
/// The filter comes from `RUST_LOG`, falling back to `info`.
pub fn try_init() -> Result<(), Error> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .event_format(CloudFormat)
        .try_init()
        .map_err(Error::Logging)
}

/// Like [`try_init`], but a second call (or a subscriber installed elsewhere)
/// is not an error: the existing subscriber is left in place.
pub fn init() {
    if let Err(e) = try_init() {
        tracing::debug!("cloud log format not installed: {e}");
    }
}
