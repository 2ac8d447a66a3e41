//! Unified error type.

use crate::body::BoxError;

/// The error type returned by reqlog's fallible operations.
///
/// Application-level errors (404, 422, etc.) are expressed as HTTP
/// [`Response`](crate::Response) values, not as `Error`s. This type surfaces
/// infrastructure failures: binding a port, reading a request body, or
/// installing the global log subscriber.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("io: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid socket address: {0}")]
    Addr(#[from] std::net::AddrParseError),

    #[error("body: {0}")]
    Body(#[source] BoxError),

    #[error("logging: {0}")]
    Logging(#[source] BoxError),
}
