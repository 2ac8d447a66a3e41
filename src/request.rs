//! Incoming HTTP request type.

use std::collections::HashMap;
use std::net::SocketAddr;

use bytes::Bytes;
use http::{HeaderMap, Method, Uri, Version};

use crate::body::{self, Body, BoxError};
use crate::error::Error;

/// An incoming HTTP request.
///
/// The body is streamed, not buffered: call [`bytes`](Request::bytes) to read
/// it. Reading puts the buffer back, so a second call (or a handler further
/// down the chain) sees the same bytes.
pub struct Request {
    pub(crate) method: Method,
    pub(crate) uri: Uri,
    pub(crate) version: Version,
    pub(crate) headers: HeaderMap,
    pub(crate) body: Body,
    pub(crate) remote_addr: Option<SocketAddr>,
    pub(crate) params: HashMap<String, String>,
}

impl Request {
    pub fn method(&self) -> &Method { &self.method }
    pub fn uri(&self) -> &Uri { &self.uri }
    pub fn version(&self) -> Version { self.version }
    pub fn headers(&self) -> &HeaderMap { &self.headers }
    pub fn remote_addr(&self) -> Option<SocketAddr> { self.remote_addr }

    /// Sets the address of the connected peer.
    pub fn with_remote_addr(mut self, addr: SocketAddr) -> Self {
        self.remote_addr = Some(addr);
        self
    }

    /// Case-insensitive header lookup. Values that are not visible ASCII are
    /// treated as absent.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Returns a named path parameter.
    ///
    /// For a route `/users/{id}`, `req.param("id")` on `/users/42` returns `Some("42")`.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    /// Reads the whole body.
    ///
    /// On success the body is replaced by the buffered bytes, so it can be
    /// read again. On failure it is replaced by a replay of the bytes received
    /// and the same error, so every later read fails the same way.
    pub async fn bytes(&mut self) -> Result<Bytes, Error> {
        match body::read_to_bytes(self.take_body()).await {
            Ok(bytes) => {
                self.body = Body::from(bytes.clone());
                Ok(bytes)
            }
            Err(failure) => {
                let (replay, error) = failure.replay_with_error();
                self.body = replay;
                Err(Error::Body(error))
            }
        }
    }

    pub fn body_mut(&mut self) -> &mut Body { &mut self.body }

    pub fn into_body(self) -> Body { self.body }

    pub(crate) fn take_body(&mut self) -> Body {
        std::mem::take(&mut self.body)
    }

    pub(crate) fn set_body(&mut self, body: Body) {
        self.body = body;
    }
}

impl<B> From<http::Request<B>> for Request
where
    B: http_body::Body<Data = Bytes> + Send + 'static,
    B::Error: Into<BoxError>,
{
    fn from(req: http::Request<B>) -> Self {
        let (parts, body) = req.into_parts();
        Self {
            method: parts.method,
            uri: parts.uri,
            version: parts.version,
            headers: parts.headers,
            body: Body::new(body),
            remote_addr: None,
            params: HashMap::new(),
        }
    }
}
