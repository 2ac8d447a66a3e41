//! Turning a [`LogRecord`] into a log line.

use std::borrow::Cow;
use std::sync::Arc;

use crate::record::LogRecord;

/// A custom log-line renderer.
///
/// Receives the record by shared reference and returns the line. It should
/// be a pure function of the record; the logger calls it once per logged
/// request, on the request's own task.
pub type Formatter = Arc<dyn Fn(&LogRecord) -> String + Send + Sync + 'static>;

const TIME_FORMAT: &str = "%Y/%m/%d %H:%M:%S%.3f";

/// The built-in format:
///
/// ```text
/// 2026/10/19 14:03:07.125 - 10.0.0.7 curl/8.4.0, req: "HTTP/1.1    POST /req?x=1 {"value":1}", res: "200", latency: 182.4µs
/// ```
///
/// Carriage returns and newlines in the body are escaped so the entry is
/// always a single line.
pub fn default_format(record: &LogRecord) -> String {
    format!(
        "{} - {} {}, req: \"{} {:>7} {} {}\", res: \"{:3}\", latency: {:?}",
        record.timestamp.format(TIME_FORMAT),
        record.client_ip,
        record.user_agent,
        record.protocol,
        record.method.as_str(),
        record.path,
        single_line(&record.body),
        record.status,
        record.latency,
    )
}

fn single_line(s: &str) -> Cow<'_, str> {
    if !s.contains(['\r', '\n']) {
        return Cow::Borrowed(s);
    }
    Cow::Owned(s.replace('\r', "\\r").replace('\n', "\\n"))
}
