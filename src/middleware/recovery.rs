//! Panic recovery.

use std::any::Any;
use std::panic::AssertUnwindSafe;

use futures_util::FutureExt;
use http::StatusCode;
use tracing::error;

use crate::handler::BoxFuture;
use crate::handler_error::HandlerError;
use crate::middleware::{Middleware, Next};
use crate::request::Request;
use crate::response::Response;

/// Converts a panic anywhere downstream into `500 Internal Server Error`.
///
/// The panic message is recorded as a private [`HandlerError`], so a
/// [`RequestLogger`](crate::RequestLogger) installed *outside* `Recovery`
/// logs the 500 and the message. Installed the other way round, the panic
/// unwinds through the logger and the request is never logged.
#[derive(Clone, Copy, Debug, Default)]
pub struct Recovery;

impl Middleware for Recovery {
    fn call(&self, req: Request, next: Next) -> BoxFuture {
        Box::pin(async move {
            match AssertUnwindSafe(next.run(req)).catch_unwind().await {
                Ok(response) => response,
                Err(payload) => {
                    let message = panic_message(&*payload);
                    error!(panic = %message, "handler panicked");
                    Response::status(StatusCode::INTERNAL_SERVER_ERROR)
                        .with_error(HandlerError::private(format!("panic recovered: {message}")))
                }
            }
        })
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s
    } else {
        "non-string panic payload"
    }
}
