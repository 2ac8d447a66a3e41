//! End-to-end behaviour of the request logger inside a router.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use bytes::Bytes;
use futures_util::stream;
use http::{Method, StatusCode};
use http_body::Frame;
use http_body_util::StreamBody;
use reqlog::{
    Body, HandlerError, LogRecord, LoggerConfig, MemorySink, Recovery, Request, RequestLogger,
    Response, Router, Severity,
};

fn request(method: Method, uri: &str, body: impl Into<Body>) -> Request {
    Request::from(
        http::Request::builder()
            .method(method)
            .uri(uri)
            .body(body.into())
            .unwrap(),
    )
}

fn broken_body(prefix: &'static str) -> Body {
    let frames: Vec<Result<Frame<Bytes>, std::io::Error>> = vec![
        Ok(Frame::data(Bytes::from_static(prefix.as_bytes()))),
        Err(std::io::Error::new(std::io::ErrorKind::ConnectionReset, "connection reset")),
    ];
    Body::new(StreamBody::new(stream::iter(frames)))
}

/// Echoes the request body back, or 400 with a private error if it can't be read.
async fn echo(mut req: Request) -> Response {
    match req.bytes().await {
        Ok(body) => Response::builder().text(String::from_utf8_lossy(&body)),
        Err(e) => Response::builder()
            .status(StatusCode::BAD_REQUEST)
            .error(HandlerError::private(e.to_string()))
            .no_body(),
    }
}

#[tokio::test]
async fn custom_formatter_line_reaches_sink_at_warning() {
    let sink = MemorySink::new();
    let app = Router::new()
        .wrap(RequestLogger::with_config(
            LoggerConfig::new()
                .sink(sink.clone())
                .formatter(|r: &LogRecord| format!("{} {} {}", r.method, r.path, r.status)),
        ))
        .on(Method::POST, "/req", |_req: Request| async {
            (StatusCode::BAD_REQUEST, "no value")
        });

    app.handle(request(Method::POST, "/req?x=1", "")).await;

    assert_eq!(sink.lines(), vec![(Severity::Warning, "POST /req?x=1 400".to_owned())]);
}

#[tokio::test]
async fn skipped_path_runs_handler_once_and_logs_nothing() {
    let sink = MemorySink::new();
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);

    let app = Router::new()
        .wrap(RequestLogger::with_config(
            LoggerConfig::new().sink(sink.clone()).skip_paths(["/healthz"]),
        ))
        .on(Method::POST, "/healthz", move |req: Request| {
            let counter = Arc::clone(&counter);
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                echo(req)
                    .await
                    .with_error(HandlerError::private("would be logged if not skipped"))
            }
        });

    let payload = "{\"check\":\"deep\",\"n\":7}";
    let res = app.handle(request(Method::POST, "/healthz?verbose=1", payload)).await;

    assert_eq!(res.status_code(), StatusCode::OK);
    assert_eq!(&res.body()[..], payload.as_bytes());
    assert_eq!(calls.load(Ordering::SeqCst), 1);
    assert!(sink.lines().is_empty());
}

#[tokio::test]
async fn skip_match_is_exact() {
    let sink = MemorySink::new();
    let app = Router::new()
        .wrap(RequestLogger::with_config(
            LoggerConfig::new().sink(sink.clone()).skip_paths(["/healthz"]),
        ))
        .on(Method::GET, "/healthz/deep", |_req: Request| async { "ok" });

    app.handle(request(Method::GET, "/healthz/deep", "")).await;

    assert_eq!(sink.lines().len(), 1);
}

#[tokio::test]
async fn handler_receives_body_unchanged() {
    let sink = MemorySink::new();
    let app = Router::new()
        .wrap(RequestLogger::with_config(
            LoggerConfig::new().sink(sink.clone()).formatter(|r: &LogRecord| r.body.clone()),
        ))
        .on(Method::POST, "/echo", echo);

    let payload = "{\"value\":42,\"note\":\"ünïcode\"}";
    let res = app.handle(request(Method::POST, "/echo", payload)).await;

    assert_eq!(&res.body()[..], payload.as_bytes());
    assert_eq!(sink.lines(), vec![(Severity::Info, payload.to_owned())]);
}

#[tokio::test]
async fn broken_body_logs_empty_body_and_request_proceeds() {
    let sink = MemorySink::new();
    let app = Router::new()
        .wrap(RequestLogger::with_config(
            LoggerConfig::new()
                .sink(sink.clone())
                .formatter(|r: &LogRecord| format!("body=[{}] status={}", r.body, r.status)),
        ))
        .on(Method::POST, "/upload", |mut req: Request| async move {
            // The handler observes the same failure it would without the logger.
            match req.bytes().await {
                Ok(_) => StatusCode::OK,
                Err(_) => StatusCode::UNPROCESSABLE_ENTITY,
            }
        });

    let res = app.handle(request(Method::POST, "/upload", broken_body("partial"))).await;

    assert_eq!(res.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(
        sink.lines(),
        vec![(Severity::Warning, "body=[] status=422".to_owned())],
    );
}

#[tokio::test]
async fn severity_follows_status() {
    for (status, severity) in [
        (StatusCode::OK, Severity::Info),
        (StatusCode::MOVED_PERMANENTLY, Severity::Info),
        (StatusCode::NOT_FOUND, Severity::Warning),
        (StatusCode::SERVICE_UNAVAILABLE, Severity::Error),
    ] {
        let sink = MemorySink::new();
        let app = Router::new()
            .wrap(RequestLogger::with_config(LoggerConfig::new().sink(sink.clone())))
            .on(Method::GET, "/", move |_req: Request| async move { status });

        app.handle(request(Method::GET, "/", "")).await;

        let lines = sink.lines();
        assert_eq!(lines.len(), 1, "{status}");
        assert_eq!(lines[0].0, severity, "{status}");
    }
}

#[tokio::test]
async fn recorded_errors_add_one_error_line() {
    let sink = MemorySink::new();
    let app = Router::new()
        .wrap(RequestLogger::with_config(LoggerConfig::new().sink(sink.clone())))
        .on(Method::POST, "/echo", echo);

    // Succeeds: no recorded errors, one line.
    app.handle(request(Method::POST, "/echo", "hi")).await;
    assert_eq!(sink.lines().len(), 1);

    // Fails: the primary warning line plus exactly one error line.
    app.handle(request(Method::POST, "/echo", broken_body(""))).await;
    let lines = sink.lines();
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[1].0, Severity::Warning);
    assert_eq!(lines[2], (Severity::Error, "err: Error #01: body: connection reset".to_owned()));
}

#[tokio::test]
async fn recovered_panic_is_logged_as_error() {
    let sink = MemorySink::new();
    let app = Router::new()
        .wrap(RequestLogger::with_config(
            LoggerConfig::new()
                .sink(sink.clone())
                .formatter(|r: &LogRecord| format!("{} {}", r.status, r.error_message)),
        ))
        .wrap(Recovery)
        .on(Method::GET, "/boom", |_req: Request| async {
            if true {
                panic!("database handle poisoned");
            }
            "unreachable"
        });

    let res = app.handle(request(Method::GET, "/boom", "")).await;

    assert_eq!(res.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    let recorded = "Error #01: panic recovered: database handle poisoned";
    assert_eq!(
        sink.lines(),
        vec![
            (Severity::Error, format!("500 {recorded}")),
            (Severity::Error, format!("err: {recorded}")),
        ],
    );
}

#[tokio::test]
async fn unmatched_route_is_logged_as_warning() {
    let sink = MemorySink::new();
    let app = Router::new()
        .wrap(RequestLogger::with_config(
            LoggerConfig::new()
                .sink(sink.clone())
                .formatter(|r: &LogRecord| format!("{} {}", r.path, r.status)),
        ));

    app.handle(request(Method::GET, "/missing?id=3", "")).await;

    assert_eq!(sink.lines(), vec![(Severity::Warning, "/missing?id=3 404".to_owned())]);
}

#[tokio::test]
async fn default_format_is_single_line() {
    let sink = MemorySink::new();
    let app = Router::new()
        .wrap(RequestLogger::with_config(LoggerConfig::new().sink(sink.clone())))
        .on(Method::POST, "/echo", echo);

    app.handle(
        Request::from(
            http::Request::post("/echo?pretty=1")
                .header("user-agent", "reqlog-test/1.0")
                .body(Body::from("{\n  \"value\": 1\n}"))
                .unwrap(),
        )
        .with_remote_addr("198.51.100.23:51234".parse().unwrap()),
    )
    .await;

    let lines = sink.lines();
    let line = &lines[0].1;
    assert!(!line.contains('\n'), "{line}");
    let request_part = " - 198.51.100.23 reqlog-test/1.0, req: \"HTTP/1.1    POST /echo?pretty=1 ";
    assert!(line.contains(request_part), "{line}");
    assert!(line.contains("res: \"200\", latency: "), "{line}");
}
