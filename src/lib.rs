//! # reqlog
//!
//! Request-logging middleware for Rust services behind a reverse proxy, with
//! the minimal hyper stack it needs to run.
//!
//! ## The contract
//!
//! One request in, one access-log line out (plus an `err:` line when handlers
//! recorded errors):
//!
//! - **Timing** brackets everything downstream: inner middleware, handler,
//!   response building.
//! - **The body** is read once and handed on untouched; the handler sees
//!   exactly the bytes the client sent, the log sees the same bytes, and
//!   neither can change what the other sees.
//! - **Skip paths** (`/healthz`, `/readyz`, …) are served normally and never
//!   logged. Matching is exact, on the path without its query string.
//! - **Severity** comes from the status: `5xx` → error, `4xx` → warning,
//!   everything else → info.
//! - **Recorded errors** ([`HandlerError`]) add one `err: …` line at error
//!   severity.
//!
//! Output defaults to `tracing`; [`cloud::init`] turns that into one Cloud
//! Logging JSON object per line.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use http::{Method, StatusCode};
//! use reqlog::{HandlerError, LoggerConfig, Recovery, Request, RequestLogger, Response, Router, Server};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), reqlog::Error> {
//!     reqlog::cloud::init();
//!
//!     let app = Router::new()
//!         .wrap(RequestLogger::with_config(LoggerConfig::new().skip_paths(["/healthz"])))
//!         .wrap(Recovery)
//!         .on(Method::GET,  "/healthz", |_req: Request| async { "ok" })
//!         .on(Method::POST, "/echo",    echo);
//!
//!     Server::bind("0.0.0.0:3000")?.serve(app).await
//! }
//!
//! async fn echo(mut req: Request) -> Response {
//!     match req.bytes().await {
//!         Ok(body) => Response::builder().text(String::from_utf8_lossy(&body)),
//!         Err(e) => Response::builder()
//!             .status(StatusCode::BAD_REQUEST)
//!             .error(HandlerError::private(e.to_string()))
//!             .no_body(),
//!     }
//! }
//! ```

mod body;
mod config;
mod error;
mod formatter;
mod handler;
mod handler_error;
mod record;
mod request;
mod response;
mod router;
mod server;
mod severity;
mod sink;

pub mod client_ip;
pub mod cloud;
pub mod middleware;

pub use body::{Body, BoxError};
pub use client_ip::TrustedProxies;
pub use config::LoggerConfig;
pub use error::Error;
pub use formatter::{Formatter, default_format};
pub use handler::{BoxFuture, Handler};
pub use handler_error::{ErrorKind, HandlerError};
pub use middleware::{Middleware, Next, Recovery, RequestLogger};
pub use record::LogRecord;
pub use request::Request;
pub use response::{IntoResponse, Response, ResponseBuilder};
pub use router::Router;
pub use server::Server;
pub use severity::Severity;
pub use sink::{MemorySink, Sink, TracingSink};
