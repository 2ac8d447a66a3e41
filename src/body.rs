//! Request body that can be handed out more than once.
//!
//! A hyper body is a one-shot stream: whoever polls it to the end owns the
//! bytes. The logger needs the bytes *and* the handler needs the bytes, so
//! the body is read once into a single [`Bytes`] buffer and two cursors are
//! cut from it:
//!
//! ```text
//! Incoming ──collect──▶ Bytes ──clone──▶ Body::from(bytes)   → handler
//!                          └────────────▶ retained snapshot  → LogRecord
//! ```
//!
//! `Bytes::clone` is a reference-count increment, so the two cursors share one
//! allocation and neither can observe writes through the other (there are
//! none: `Bytes` is immutable).

use std::fmt;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use bytes::{Bytes, BytesMut};
use http_body::{Body as HttpBody, Frame, SizeHint};
use http_body_util::BodyExt;
use http_body_util::combinators::UnsyncBoxBody;

/// Boxed error carried by body streams.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// The body of a [`Request`](crate::Request).
pub struct Body(Kind);

enum Kind {
    Full(Option<Bytes>),
    Stream(UnsyncBoxBody<Bytes, BoxError>),
    /// Replays a read that failed part-way: the bytes received, then the error.
    Failed {
        received: Option<Bytes>,
        error: Option<BoxError>,
    },
}

impl Body {
    /// Wraps any `http_body::Body` producing `Bytes` frames.
    pub fn new<B>(body: B) -> Self
    where
        B: HttpBody<Data = Bytes> + Send + 'static,
        B::Error: Into<BoxError>,
    {
        Self(Kind::Stream(body.map_err(Into::into).boxed_unsync()))
    }

    pub fn empty() -> Self {
        Self(Kind::Full(None))
    }
}

impl Default for Body {
    fn default() -> Self {
        Self::empty()
    }
}

impl From<Bytes> for Body {
    fn from(bytes: Bytes) -> Self {
        if bytes.is_empty() {
            Self::empty()
        } else {
            Self(Kind::Full(Some(bytes)))
        }
    }
}

impl From<Vec<u8>> for Body {
    fn from(v: Vec<u8>) -> Self {
        Bytes::from(v).into()
    }
}

impl From<String> for Body {
    fn from(s: String) -> Self {
        Bytes::from(s).into()
    }
}

impl From<&'static str> for Body {
    fn from(s: &'static str) -> Self {
        Bytes::from_static(s.as_bytes()).into()
    }
}

impl HttpBody for Body {
    type Data = Bytes;
    type Error = BoxError;

    fn poll_frame(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Frame<Bytes>, BoxError>>> {
        match &mut self.get_mut().0 {
            Kind::Full(chunk) => Poll::Ready(chunk.take().map(|b| Ok(Frame::data(b)))),
            Kind::Stream(inner) => Pin::new(inner).poll_frame(cx),
            Kind::Failed { received, error } => {
                if let Some(bytes) = received.take() {
                    return Poll::Ready(Some(Ok(Frame::data(bytes))));
                }
                Poll::Ready(error.take().map(Err))
            }
        }
    }

    fn is_end_stream(&self) -> bool {
        match &self.0 {
            Kind::Full(chunk) => chunk.is_none(),
            Kind::Stream(inner) => inner.is_end_stream(),
            Kind::Failed { received, error } => received.is_none() && error.is_none(),
        }
    }

    fn size_hint(&self) -> SizeHint {
        match &self.0 {
            Kind::Full(chunk) => {
                SizeHint::with_exact(chunk.as_ref().map_or(0, |b| b.len() as u64))
            }
            Kind::Stream(inner) => inner.size_hint(),
            Kind::Failed { .. } => SizeHint::default(),
        }
    }
}

// ── Duplicate-on-read ─────────────────────────────────────────────────────────

/// A body read that stopped on an error.
pub(crate) struct ReadFailure {
    received: Bytes,
    error: BoxError,
}

impl ReadFailure {
    pub(crate) fn error(&self) -> &BoxError {
        &self.error
    }

    /// A body that yields exactly what the failed read saw: the bytes received
    /// before the failure, then the same error.
    pub(crate) fn replay(self) -> Body {
        let received = (!self.received.is_empty()).then_some(self.received);
        Body(Kind::Failed { received, error: Some(self.error) })
    }

    /// Like [`replay`](Self::replay), but also hands the error to the caller.
    /// Both sides share the one underlying error.
    pub(crate) fn replay_with_error(self) -> (Body, BoxError) {
        let shared = SharedError(Arc::new(self.error));
        let replay = ReadFailure { received: self.received, error: Box::new(shared.clone()) };
        (replay.replay(), Box::new(shared))
    }
}

#[derive(Clone, Debug)]
struct SharedError(Arc<BoxError>);

impl fmt::Display for SharedError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&**self.0, f)
    }
}

impl std::error::Error for SharedError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        (**self.0).source()
    }
}

/// Reads `body` to the end into one contiguous buffer.
///
/// Trailers are dropped.
pub(crate) async fn read_to_bytes(mut body: Body) -> Result<Bytes, ReadFailure> {
    // A buffered body is already one chunk; hand it back without copying.
    if let Kind::Full(chunk) = &mut body.0 {
        return Ok(chunk.take().unwrap_or_default());
    }

    let mut buf = BytesMut::new();
    while let Some(frame) = body.frame().await {
        match frame {
            Ok(frame) => {
                if let Ok(data) = frame.into_data() {
                    buf.extend_from_slice(&data);
                }
            }
            Err(error) => return Err(ReadFailure { received: buf.freeze(), error }),
        }
    }
    Ok(buf.freeze())
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    use futures_util::stream;
    use http_body_util::StreamBody;

    /// A body that yields `prefix` and then fails with `broken pipe`.
    pub(crate) fn broken(prefix: &'static str) -> Body {
        let frames: Vec<Result<Frame<Bytes>, std::io::Error>> = vec![
            Ok(Frame::data(Bytes::from_static(prefix.as_bytes()))),
            Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "broken pipe")),
        ];
        Body::new(StreamBody::new(stream::iter(frames)))
    }

    #[tokio::test]
    async fn reads_streamed_chunks_in_order() {
        let frames: Vec<Result<Frame<Bytes>, std::io::Error>> = vec![
            Ok(Frame::data(Bytes::from_static(b"hello "))),
            Ok(Frame::data(Bytes::from_static(b"world"))),
        ];
        let body = Body::new(StreamBody::new(stream::iter(frames)));

        let bytes = read_to_bytes(body).await.ok().unwrap();
        assert_eq!(&bytes[..], b"hello world");
    }

    #[tokio::test]
    async fn cloned_cursors_read_independently() {
        let original = read_to_bytes(Body::from("payload")).await.ok().unwrap();
        let downstream = Body::from(original.clone());

        let seen = read_to_bytes(downstream).await.ok().unwrap();
        assert_eq!(seen, original);
        assert_eq!(&original[..], b"payload");
    }

    #[tokio::test]
    async fn failed_read_replays_prefix_then_error() {
        let failure = match read_to_bytes(broken("par")).await {
            Ok(_) => panic!("read should fail"),
            Err(f) => f,
        };
        assert_eq!(failure.error().to_string(), "broken pipe");

        let mut replay = failure.replay();
        let first = replay.frame().await.unwrap().unwrap().into_data().unwrap();
        assert_eq!(&first[..], b"par");
        let second = replay.frame().await.unwrap();
        assert_eq!(second.unwrap_err().to_string(), "broken pipe");
        assert!(replay.frame().await.is_none());
    }

    #[tokio::test]
    async fn replay_with_error_keeps_both_sides() {
        let failure = match read_to_bytes(broken("par")).await {
            Ok(_) => panic!("read should fail"),
            Err(f) => f,
        };

        let (replay, error) = failure.replay_with_error();
        assert_eq!(error.to_string(), "broken pipe");

        let again = match read_to_bytes(replay).await {
            Ok(_) => panic!("replay should fail again"),
            Err(f) => f,
        };
        assert_eq!(&again.received[..], b"par");
        assert_eq!(again.error().to_string(), "broken pipe");
    }

    #[tokio::test]
    async fn empty_body_reads_as_empty() {
        assert!(Body::empty().is_end_stream());
        let bytes = read_to_bytes(Body::from("")).await.ok().unwrap();
        assert!(bytes.is_empty());
    }
}
