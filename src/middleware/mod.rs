//! Middleware layer.
//!
//! Middleware wraps the rest of the pipeline: it receives the request and a
//! [`Next`] continuation, and decides what happens before and after the
//! continuation runs. Install with [`Router::wrap`](crate::Router::wrap); the
//! first middleware installed is the outermost.
//!
//! ```text
//! RequestLogger ─▶ Recovery ─▶ … ─▶ handler
//!      ▲                               │
//!      └────────── Response ◀──────────┘
//! ```
//!
//! Built-in middleware:
//! - [`RequestLogger`] — one access-log line per request, severity from status
//! - [`Recovery`] — turns a handler panic into `500 Internal Server Error`

use std::future::Future;
use std::sync::Arc;

use crate::handler::{BoxFuture, BoxedHandler};
use crate::request::Request;
use crate::response::Response;

mod logger;
mod recovery;

pub use logger::RequestLogger;
pub use recovery::Recovery;

/// A unit of work wrapped around the downstream pipeline.
pub trait Middleware: Send + Sync + 'static {
    fn call(&self, req: Request, next: Next) -> BoxFuture;
}

pub(crate) type BoxedMiddleware = Arc<dyn Middleware>;

/// The remainder of the pipeline: the middleware not yet run, then the handler.
///
/// [`run`](Next::run) takes `self`, so a middleware can invoke the
/// continuation at most once.
pub struct Next {
    stack: Arc<[BoxedMiddleware]>,
    index: usize,
    endpoint: BoxedHandler,
}

impl Next {
    pub(crate) fn new(stack: Arc<[BoxedMiddleware]>, endpoint: BoxedHandler) -> Self {
        Self { stack, index: 0, endpoint }
    }

    /// Runs the rest of the pipeline.
    pub fn run(mut self, req: Request) -> BoxFuture {
        match self.stack.get(self.index).cloned() {
            Some(middleware) => {
                self.index += 1;
                middleware.call(req, self)
            }
            None => self.endpoint.call(req),
        }
    }
}

/// Turns an `async fn(Request, Next) -> Response` into a [`Middleware`].
///
/// ```rust
/// use reqlog::{Request, Response, Router, middleware::{self, Next}};
///
/// async fn tag(req: Request, next: Next) -> Response {
///     let mut res = next.run(req).await;
///     res.record_error(reqlog::HandlerError::public("tagged"));
///     res
/// }
///
/// let app = Router::new().wrap(middleware::from_fn(tag));
/// ```
pub fn from_fn<F, Fut>(f: F) -> FromFn<F>
where
    F: Fn(Request, Next) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Response> + Send + 'static,
{
    FromFn(f)
}

/// Middleware built by [`from_fn`].
pub struct FromFn<F>(F);

impl<F, Fut> Middleware for FromFn<F>
where
    F: Fn(Request, Next) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Response> + Send + 'static,
{
    fn call(&self, req: Request, next: Next) -> BoxFuture {
        Box::pin((self.0)(req, next))
    }
}
