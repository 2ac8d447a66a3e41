//! Errors recorded by handlers and middleware while serving a request.
//!
//! These are not Rust errors that abort anything. A handler that has already
//! decided on a response (say, `400 Bad Request`) can attach the reason it
//! failed to the [`Response`](crate::Response); the request logger picks the
//! annotations up on the way out and writes them to the log.
//!
//! ```rust
//! use reqlog::{HandlerError, Response};
//! use http::StatusCode;
//!
//! let res = Response::builder()
//!     .status(StatusCode::BAD_REQUEST)
//!     .error(HandlerError::private("missing field `value`"))
//!     .text("no value");
//! assert_eq!(res.errors().len(), 1);
//! ```

use std::fmt;

/// Who an error message is meant for.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ErrorKind {
    /// Internal detail: goes to the log, never to the client.
    Private,
    /// Safe to show to the client.
    Public,
}

/// One recorded error.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct HandlerError {
    kind: ErrorKind,
    message: String,
}

impl HandlerError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self { kind, message: message.into() }
    }

    pub fn private(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Private, message)
    }

    pub fn public(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Public, message)
    }

    pub fn kind(&self) -> ErrorKind { self.kind }
    pub fn message(&self) -> &str { &self.message }
}

impl fmt::Display for HandlerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Renders errors as `Error #01: first; Error #02: second`.
///
/// Numbering follows the position in `errors`, so filtered subsets keep
/// consecutive numbers.
pub(crate) fn render<'a>(errors: impl IntoIterator<Item = &'a HandlerError>) -> String {
    errors
        .into_iter()
        .enumerate()
        .map(|(i, e)| format!("Error #{:02}: {}", i + 1, e.message))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Renders only the [`ErrorKind::Private`] entries.
pub(crate) fn render_private(errors: &[HandlerError]) -> String {
    render(errors.iter().filter(|e| e.kind == ErrorKind::Private))
}
