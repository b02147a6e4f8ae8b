//! Response sinks and the buffering response.
//!
//! # Responsibilities
//! - Define the minimal write/read-back capability set render code writes into
//! - Buffer a downstream response so the middleware can inspect and rewrite it
//!
//! # Design Decisions
//! - Render code depends only on `ResponseSink`; `&mut S` passes through to the
//!   underlying sink, so nested wrapping never buffers twice
//! - A captured response keeps its own status, headers, and extensions; only
//!   the body is collected
//! - `Content-Length` is recomputed from the final body on commit

use axum::{
    body::{Body, Bytes},
    http::{header, response::Parts, Extensions, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use bytes::BytesMut;

/// Capability set shared by every response sink.
pub trait ResponseSink {
    fn status(&self) -> StatusCode;

    fn set_status(&mut self, status: StatusCode);

    fn headers(&self) -> &HeaderMap;

    fn headers_mut(&mut self) -> &mut HeaderMap;

    fn body(&self) -> &[u8];

    /// Append bytes to the body.
    fn write(&mut self, bytes: &[u8]);

    fn clear_body(&mut self);

    /// True if no body bytes have been written.
    fn is_empty(&self) -> bool {
        self.body().is_empty()
    }
}

impl<S: ResponseSink + ?Sized> ResponseSink for &mut S {
    fn status(&self) -> StatusCode {
        (**self).status()
    }

    fn set_status(&mut self, status: StatusCode) {
        (**self).set_status(status)
    }

    fn headers(&self) -> &HeaderMap {
        (**self).headers()
    }

    fn headers_mut(&mut self) -> &mut HeaderMap {
        (**self).headers_mut()
    }

    fn body(&self) -> &[u8] {
        (**self).body()
    }

    fn write(&mut self, bytes: &[u8]) {
        (**self).write(bytes)
    }

    fn clear_body(&mut self) {
        (**self).clear_body()
    }
}

/// In-memory response: status, headers, and body are stored, not transmitted.
#[derive(Debug, Default)]
pub struct ResponseBuffer {
    status: StatusCode,
    headers: HeaderMap,
    body: BytesMut,
    extensions: Extensions,
}

impl ResponseBuffer {
    /// Empty `200 OK` buffer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap an already-produced response whose body has been collected.
    pub fn from_parts(parts: Parts, body: Bytes) -> Self {
        Self {
            status: parts.status,
            headers: parts.headers,
            body: BytesMut::from(&body[..]),
            extensions: parts.extensions,
        }
    }

    /// Collect a downstream response into a buffer.
    ///
    /// On failure the response head is handed back so the caller can still commit it.
    pub async fn capture(response: Response) -> Result<Self, (Parts, axum::Error)> {
        let (parts, body) = response.into_parts();
        match axum::body::to_bytes(body, usize::MAX).await {
            Ok(bytes) => Ok(Self::from_parts(parts, bytes)),
            Err(e) => Err((parts, e)),
        }
    }

    /// Throw away the body and the headers describing it.
    pub fn discard(&mut self) {
        self.body.clear();
        self.headers.remove(header::CONTENT_TYPE);
        self.headers.remove(header::CONTENT_LENGTH);
    }
}

impl ResponseSink for ResponseBuffer {
    fn status(&self) -> StatusCode {
        self.status
    }

    fn set_status(&mut self, status: StatusCode) {
        self.status = status;
    }

    fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    fn body(&self) -> &[u8] {
        &self.body
    }

    fn write(&mut self, bytes: &[u8]) {
        self.body.extend_from_slice(bytes);
    }

    fn clear_body(&mut self) {
        self.body.clear();
    }
}

impl IntoResponse for ResponseBuffer {
    fn into_response(self) -> Response {
        let Self {
            status,
            mut headers,
            body,
            extensions,
        } = self;
        headers.remove(header::CONTENT_LENGTH);

        // headers, then status, then body
        let mut response = Response::new(Body::from(body.freeze()));
        *response.headers_mut() = headers;
        *response.status_mut() = status;
        *response.extensions_mut() = extensions;
        response
    }
}
