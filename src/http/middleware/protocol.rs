//! Protocol middleware.
//!
//! # Responsibilities
//! - Mark every response as varying on `X-Inertia`
//! - Buffer responses to protocol-aware requests and rewrite them:
//!   stale asset version, empty success body, `302` after a mutating method
//!
//! # Design Decisions
//! - Plain requests are never buffered
//! - Only the first matching rule applies
//! - The buffered head survives every rule; rules only replace status and body
//! - A body that fails to collect is logged; the head is committed as-is with an empty body

use std::{
    future::Future,
    pin::Pin,
    task::{Context, Poll},
};

use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    response::{IntoResponse, Response},
};
use tower::{Layer, Service};

use crate::http::buffer::{ResponseBuffer, ResponseSink};
use crate::http::headers::{add_vary, is_inertia_request};
use crate::http::request::RequestContext;
use crate::render::pipeline::{set_inertia_location, Inertia};

/// Layer installing [`InertiaService`] around a router or handler.
#[derive(Debug, Clone)]
pub struct InertiaLayer {
    inertia: Inertia,
}

impl InertiaLayer {
    pub fn new(inertia: Inertia) -> Self {
        Self { inertia }
    }
}

impl<S> Layer<S> for InertiaLayer {
    type Service = InertiaService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        InertiaService {
            inner,
            inertia: self.inertia.clone(),
        }
    }
}

/// Middleware service applying the protocol rules to downstream responses.
#[derive(Debug, Clone)]
pub struct InertiaService<S> {
    inner: S,
    inertia: Inertia,
}

impl<S> Service<Request<Body>> for InertiaService<S>
where
    S: Service<Request<Body>, Response = Response> + Clone + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        // The readied service handles this request; the clone waits for the next one.
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);
        let inertia = self.inertia.clone();

        Box::pin(async move {
            if !is_inertia_request(req.headers()) {
                let mut response = inner.call(req).await?;
                add_vary(response.headers_mut());
                return Ok(response);
            }

            let ctx = RequestContext::from_request(&req);
            let response = inner.call(req).await?;

            let mut buffer = match ResponseBuffer::capture(response).await {
                Ok(mut buffer) => {
                    finalize(&inertia, &ctx, &mut buffer);
                    buffer
                }
                Err((parts, e)) => {
                    tracing::error!(
                        method = %ctx.method(),
                        uri = %ctx.uri(),
                        error = %e,
                        "Failed to collect response body"
                    );
                    // Rules only apply to a body that was fully read.
                    ResponseBuffer::from_parts(parts, Default::default())
                }
            };

            add_vary(buffer.headers_mut());
            Ok(buffer.into_response())
        })
    }
}

/// Apply the first matching protocol rule to a buffered response.
pub(crate) fn finalize(inertia: &Inertia, ctx: &RequestContext, buffer: &mut ResponseBuffer) {
    if *ctx.method() == Method::GET && ctx.client_version() != inertia.version() {
        tracing::debug!(
            client_version = %ctx.client_version(),
            version = %inertia.version(),
            uri = %ctx.uri(),
            "Asset version changed, forcing full reload"
        );
        buffer.discard();
        if let Err(e) = inertia.location(&mut *buffer, ctx, ctx.url()) {
            tracing::error!(uri = %ctx.uri(), error = %e, "Failed to set reload location");
        }
        return;
    }

    if buffer.status() == StatusCode::OK && buffer.is_empty() {
        let target = ctx.referer();
        if !target.is_empty() {
            buffer.discard();
            if let Err(e) = set_inertia_location(&mut *buffer, target) {
                tracing::error!(referer = %target, error = %e, "Failed to set back location");
            }
            return;
        }
    }

    if buffer.status() == StatusCode::FOUND
        && matches!(*ctx.method(), Method::PUT | Method::PATCH | Method::DELETE)
    {
        buffer.set_status(StatusCode::SEE_OTHER);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::headers::{X_INERTIA_LOCATION, X_INERTIA_VERSION};
    use axum::http::header::LOCATION;

    fn inertia() -> Inertia {
        Inertia::builder("unused.html")
            .root_template_source("{{ .inertia }}")
            .version("xyz")
            .build()
            .unwrap()
    }

    fn ctx(method: Method, headers: &[(&'static str, &'static str)]) -> RequestContext {
        let mut builder = Request::builder()
            .method(method)
            .uri("/users?page=2")
            .header("X-Inertia", "true");
        for &(k, v) in headers {
            builder = builder.header(k, v);
        }
        RequestContext::from_request(&builder.body(Body::empty()).unwrap())
    }

    fn buffered(status: StatusCode, body: &[u8]) -> ResponseBuffer {
        let mut buffer = ResponseBuffer::new();
        buffer.set_status(status);
        buffer.write(body);
        buffer
    }

    #[test]
    fn test_version_mismatch_reloads_request_uri() {
        let ctx = ctx(Method::GET, &[("X-Inertia-Version", "abc")]);
        let mut buffer = buffered(StatusCode::OK, b"{\"component\":\"Users\"}");

        finalize(&inertia(), &ctx, &mut buffer);

        assert_eq!(buffer.status(), StatusCode::CONFLICT);
        assert_eq!(buffer.headers()[X_INERTIA_LOCATION], "/users?page=2");
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_version_mismatch_ignored_for_post() {
        let ctx = ctx(Method::POST, &[("X-Inertia-Version", "abc")]);
        let mut buffer = buffered(StatusCode::OK, b"ok");

        finalize(&inertia(), &ctx, &mut buffer);

        assert_eq!(buffer.status(), StatusCode::OK);
        assert_eq!(buffer.body(), b"ok");
    }

    #[test]
    fn test_empty_body_goes_back() {
        let ctx = ctx(
            Method::POST,
            &[("Referer", "http://localhost/form"), ("X-Inertia-Version", "xyz")],
        );
        let mut buffer = buffered(StatusCode::OK, b"");

        finalize(&inertia(), &ctx, &mut buffer);

        assert_eq!(buffer.status(), StatusCode::CONFLICT);
        assert_eq!(buffer.headers()[X_INERTIA_LOCATION], "http://localhost/form");
    }

    #[test]
    fn test_empty_body_without_referer_is_unchanged() {
        let ctx = ctx(Method::GET, &[("X-Inertia-Version", "xyz")]);
        let mut buffer = buffered(StatusCode::OK, b"");

        finalize(&inertia(), &ctx, &mut buffer);

        assert_eq!(buffer.status(), StatusCode::OK);
        assert!(buffer.headers().get(X_INERTIA_LOCATION).is_none());
    }

    #[test]
    fn test_found_after_mutation_becomes_see_other() {
        for method in [Method::PUT, Method::PATCH, Method::DELETE] {
            let ctx = ctx(method.clone(), &[]);
            let mut buffer = buffered(StatusCode::FOUND, b"");
            buffer
                .headers_mut()
                .insert(LOCATION, "/users".parse().unwrap());

            finalize(&inertia(), &ctx, &mut buffer);

            assert_eq!(buffer.status(), StatusCode::SEE_OTHER, "{method}");
            assert_eq!(buffer.headers()[LOCATION], "/users");
        }
    }

    #[test]
    fn test_found_after_post_is_unchanged() {
        let ctx = ctx(Method::POST, &[]);
        let mut buffer = buffered(StatusCode::FOUND, b"");

        finalize(&inertia(), &ctx, &mut buffer);

        assert_eq!(buffer.status(), StatusCode::FOUND);
    }

    #[test]
    fn test_matching_version_commits_verbatim() {
        let ctx = ctx(Method::GET, &[("X-Inertia-Version", "xyz")]);
        let mut buffer = buffered(StatusCode::CREATED, b"created");
        buffer
            .headers_mut()
            .insert(X_INERTIA_VERSION, "xyz".parse().unwrap());

        finalize(&inertia(), &ctx, &mut buffer);

        assert_eq!(buffer.status(), StatusCode::CREATED);
        assert_eq!(buffer.body(), b"created");
        assert_eq!(buffer.headers()[X_INERTIA_VERSION], "xyz");
    }
}
