//! Render pipeline: page assembly, data-only vs. document output, redirects.
//!
//! # Responsibilities
//! - Build the page from merged props and the partial-reload directive
//! - Write JSON for client-side visits, an HTML document for full loads
//! - Delegate to the pre-render service when configured, with silent fallback
//! - Express redirects in the form the client can follow
//!
//! # Design Decisions
//! - Nothing is written to the sink until the page and document are fully built
//! - Pre-render failures are logged, never returned
//! - Protocol-aware redirects use `409` + `X-Inertia-Location` so the client
//!   performs a full visit instead of following the redirect in the background

use std::sync::Arc;

use axum::{
    http::{
        header::{CONTENT_TYPE, LOCATION},
        HeaderValue, StatusCode,
    },
    response::{IntoResponse, Response},
};
use bytes::Bytes;

use crate::error::InertiaError;
use crate::http::buffer::{ResponseBuffer, ResponseSink};
use crate::http::headers::{INERTIA_TRUE, X_INERTIA, X_INERTIA_LOCATION};
use crate::http::middleware::InertiaLayer;
use crate::http::request::RequestContext;
use crate::props::{merge, resolve, Prop, Props};
use crate::render::page::Page;
use crate::render::ssr::SsrResponse;
use crate::render::template::{escape_html, TemplateValue, BODY_KEY, HEAD_KEY};
use crate::state::{InertiaBuilder, SharedState};

const JSON_CONTENT_TYPE: HeaderValue = HeaderValue::from_static("application/json");
const HTML_CONTENT_TYPE: HeaderValue = HeaderValue::from_static("text/html; charset=utf-8");

/// Cheaply clonable handle to the adapter's shared state.
#[derive(Debug, Clone)]
pub struct Inertia {
    state: Arc<SharedState>,
}

impl Inertia {
    /// Start building an adapter whose root template is read from `root_template_path`.
    pub fn builder(root_template_path: impl Into<std::path::PathBuf>) -> InertiaBuilder {
        InertiaBuilder::new(root_template_path)
    }

    pub(crate) fn from_state(state: SharedState) -> Self {
        Self {
            state: Arc::new(state),
        }
    }

    /// Middleware layer bound to this adapter's asset version.
    pub fn layer(&self) -> InertiaLayer {
        InertiaLayer::new(self.clone())
    }

    pub fn version(&self) -> &str {
        &self.state.version
    }

    pub fn container_id(&self) -> &str {
        &self.state.container_id
    }

    pub fn shared_props(&self) -> &Props {
        &self.state.shared_props
    }

    pub fn shared_prop(&self, name: &str) -> Option<&Prop> {
        self.state.shared_props.get(name)
    }

    /// Build the page for `component` without writing anything.
    pub fn page(
        &self,
        ctx: &RequestContext,
        component: &str,
        props: &Props,
    ) -> Result<Page, InertiaError> {
        let merged = merge([&self.state.shared_props, ctx.props(), props]);
        let partial = ctx.partial_reload().filter(|p| p.targets(component));
        let props = resolve(&merged, partial.as_ref(), ctx.validation_errors())?;

        Ok(Page {
            component: component.to_string(),
            props,
            url: ctx.url().to_string(),
            version: self.state.version.clone(),
        })
    }

    /// Render `component` into `sink`.
    pub async fn render<W: ResponseSink>(
        &self,
        mut sink: W,
        ctx: &RequestContext,
        component: &str,
        props: Props,
    ) -> Result<(), InertiaError> {
        let page = self.page(ctx, component, &props)?;
        let encoded = Bytes::from((self.state.encoder)(&page).map_err(InertiaError::Encoding)?);

        if ctx.is_inertia() {
            sink.headers_mut().insert(X_INERTIA, INERTIA_TRUE);
            sink.headers_mut().insert(CONTENT_TYPE, JSON_CONTENT_TYPE);
            sink.set_status(StatusCode::OK);
            sink.write(&encoded);
            return Ok(());
        }

        let document = self.render_document(ctx, &page, encoded).await?;
        sink.headers_mut().insert(CONTENT_TYPE, HTML_CONTENT_TYPE);
        sink.set_status(StatusCode::OK);
        sink.write(document.as_bytes());
        Ok(())
    }

    /// Render `component` into a fresh response.
    pub async fn render_response(
        &self,
        ctx: &RequestContext,
        component: &str,
        props: Props,
    ) -> Result<Response, InertiaError> {
        let mut buffer = ResponseBuffer::new();
        self.render(&mut buffer, ctx, component, props).await?;
        Ok(buffer.into_response())
    }

    async fn render_document(
        &self,
        ctx: &RequestContext,
        page: &Page,
        encoded: Bytes,
    ) -> Result<String, InertiaError> {
        let (head, body) = match self.prerender(page, encoded.clone()).await {
            Some(rendered) => (rendered.head.join("\n"), rendered.body),
            None => (String::new(), self.container(&encoded)),
        };

        let mut data = self.state.template_data.clone();
        data.extend(ctx.template_data().clone());
        data.insert(HEAD_KEY.to_string(), TemplateValue::Html(head));
        data.insert(BODY_KEY.to_string(), TemplateValue::Html(body));

        Ok(self.state.template.render(&data, &self.state.template_funcs)?)
    }

    async fn prerender(&self, page: &Page, encoded: Bytes) -> Option<SsrResponse> {
        let ssr = self.state.ssr.as_ref()?;

        match ssr.render(encoded).await {
            Ok(rendered) => {
                tracing::debug!(component = %page.component, "Page pre-rendered");
                Some(rendered)
            }
            Err(e) => {
                tracing::warn!(
                    component = %page.component,
                    endpoint = %ssr.endpoint(),
                    error = %e,
                    "Pre-render failed, falling back to client-side rendering"
                );
                None
            }
        }
    }

    fn container(&self, encoded: &[u8]) -> String {
        format!(
            "<div id=\"{}\" data-page=\"{}\"></div>",
            escape_html(&self.state.container_id),
            escape_html(&String::from_utf8_lossy(encoded)),
        )
    }

    /// Redirect to `url` with `302 Found`.
    pub fn location<W: ResponseSink>(
        &self,
        sink: W,
        ctx: &RequestContext,
        url: &str,
    ) -> Result<(), InertiaError> {
        self.location_with_status(sink, ctx, url, StatusCode::FOUND)
    }

    /// Redirect to `url`; `status` applies only to conventional redirects.
    pub fn location_with_status<W: ResponseSink>(
        &self,
        mut sink: W,
        ctx: &RequestContext,
        url: &str,
        status: StatusCode,
    ) -> Result<(), InertiaError> {
        if ctx.is_inertia() {
            sink.headers_mut().remove(LOCATION);
            return set_inertia_location(sink, url);
        }

        sink.headers_mut().insert(LOCATION, HeaderValue::from_str(url)?);
        sink.set_status(status);
        Ok(())
    }

    /// Redirect back to the `Referer` with `302 Found`.
    pub fn back<W: ResponseSink>(&self, sink: W, ctx: &RequestContext) -> Result<(), InertiaError> {
        self.back_with_status(sink, ctx, StatusCode::FOUND)
    }

    pub fn back_with_status<W: ResponseSink>(
        &self,
        sink: W,
        ctx: &RequestContext,
        status: StatusCode,
    ) -> Result<(), InertiaError> {
        self.location_with_status(sink, ctx, ctx.referer(), status)
    }

    /// [`Inertia::location`] into a fresh response.
    pub fn location_response(&self, ctx: &RequestContext, url: &str) -> Result<Response, InertiaError> {
        let mut buffer = ResponseBuffer::new();
        self.location(&mut buffer, ctx, url)?;
        Ok(buffer.into_response())
    }

    /// [`Inertia::back`] into a fresh response.
    pub fn back_response(&self, ctx: &RequestContext) -> Result<Response, InertiaError> {
        let mut buffer = ResponseBuffer::new();
        self.back(&mut buffer, ctx)?;
        Ok(buffer.into_response())
    }
}

/// Ask the client to perform a full visit to `url`.
pub(crate) fn set_inertia_location<W: ResponseSink>(mut sink: W, url: &str) -> Result<(), InertiaError> {
    sink.headers_mut()
        .insert(X_INERTIA_LOCATION, HeaderValue::from_str(url)?);
    sink.set_status(StatusCode::CONFLICT);
    Ok(())
}
