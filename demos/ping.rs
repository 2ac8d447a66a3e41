//! Two endpoints behind the request logger, logging Cloud Logging JSON.
//!
//! Run with:
//!   cargo run --example ping
//!   cargo run --example ping -- custom     # one-line custom format instead
//!
//! Try:
//!   curl -X POST http://localhost:8080/ping
//!   curl -X POST http://localhost:8080/req -d '{"value":7}'
//!   curl -X POST http://localhost:8080/req -d 'nope'        # 400 → WARNING + err line
//!   curl http://localhost:8080/healthz                       # not logged

use http::{Method, StatusCode};
use reqlog::{
    HandlerError, LogRecord, LoggerConfig, Recovery, Request, RequestLogger, Response, Router,
    Server,
};
use serde::Deserialize;

#[derive(Deserialize)]
struct Req {
    value: i64,
}

#[tokio::main]
async fn main() -> Result<(), reqlog::Error> {
    reqlog::cloud::try_init()?;

    let mut config = LoggerConfig::new().skip_paths(["/healthz"]);
    if std::env::args().nth(1).as_deref() == Some("custom") {
        config = config.formatter(custom_log);
    }

    let app = Router::new()
        .wrap(RequestLogger::with_config(config))
        .wrap(Recovery)
        .on(Method::POST, "/ping", |_req: Request| async { "pong" })
        .on(Method::POST, "/req", value)
        .on(Method::GET, "/healthz", |_req: Request| async { "ok" });

    Server::bind("0.0.0.0:8080")?.serve(app).await
}

fn custom_log(r: &LogRecord) -> String {
    format!(
        "[My log] {} - [{}] \"{} {} {} {} {:?} \"{}\" {}\"",
        r.client_ip,
        r.timestamp.to_rfc2822(),
        r.method,
        r.path,
        r.protocol,
        r.status,
        r.latency,
        r.user_agent,
        r.error_message,
    )
}

async fn value(mut req: Request) -> Response {
    let parsed = match req.bytes().await {
        Ok(body) => serde_json::from_slice::<Req>(&body).map_err(|e| e.to_string()),
        Err(e) => Err(e.to_string()),
    };
    match parsed {
        Ok(r) => Response::text(format!("Got value {}", r.value)),
        Err(reason) => Response::builder()
            .status(StatusCode::BAD_REQUEST)
            .error(HandlerError::private(reason))
            .text("no value"),
    }
}
