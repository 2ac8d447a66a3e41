//! Where access-log lines go.

use std::sync::{Arc, Mutex, PoisonError};

use crate::severity::Severity;

/// A leveled log destination.
///
/// Implementations must do their own synchronisation: one sink is shared by
/// every in-flight request. Delivery is fire-and-forget; a sink that cannot
/// write should drop the line rather than block or panic.
pub trait Sink: Send + Sync + 'static {
    fn log(&self, severity: Severity, message: &str);

    fn info(&self, message: &str) { self.log(Severity::Info, message) }
    fn warn(&self, message: &str) { self.log(Severity::Warning, message) }
    fn error(&self, message: &str) { self.log(Severity::Error, message) }
}

/// Default sink: forwards each line to `tracing` with target `reqlog`.
///
/// Pair it with [`cloud::init`](crate::cloud::init) to get Cloud Logging JSON,
/// or with any other subscriber.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingSink;

impl Sink for TracingSink {
    fn log(&self, severity: Severity, message: &str) {
        match severity {
            Severity::Info    => tracing::info!(target: "reqlog", "{message}"),
            Severity::Warning => tracing::warn!(target: "reqlog", "{message}"),
            Severity::Error   => tracing::error!(target: "reqlog", "{message}"),
        }
    }
}

/// Keeps every line in memory. Meant for tests.
///
/// Clones share the same buffer, so keep one clone and hand the other to
/// the logger.
#[derive(Clone, Debug, Default)]
pub struct MemorySink {
    lines: Arc<Mutex<Vec<(Severity, String)>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lines logged so far, oldest first.
    pub fn lines(&self) -> Vec<(Severity, String)> {
        self.lines.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

impl Sink for MemorySink {
    fn log(&self, severity: Severity, message: &str) {
        self.lines
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((severity, message.to_owned()));
    }
}
