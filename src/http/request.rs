//! Request-scoped metadata and the `RequestContext` extractor.
//!
//! # Responsibilities
//! - Attach per-request props, validation errors, and template data to a request
//!   (typically from an upstream middleware) via request extensions
//! - Snapshot everything rendering needs from the request into `RequestContext`
//!
//! # Design Decisions
//! - Metadata lives in request extensions, never in process-wide state
//! - Repeated attachment merges: later calls overwrite same-named entries

use std::convert::Infallible;

use axum::{
    extract::FromRequestParts,
    http::{request::Parts, HeaderMap, Method, Request, Uri},
};

use crate::http::headers;
use crate::props::{PartialReload, Props, ValidationErrors};
use crate::render::template::TemplateData;

/// Props attached to a single request.
#[derive(Debug, Clone, Default)]
pub struct ContextProps(pub Props);

/// Validation errors attached to a single request.
#[derive(Debug, Clone, Default)]
pub struct ContextErrors(pub ValidationErrors);

/// Root template data attached to a single request.
#[derive(Debug, Clone, Default)]
pub struct ContextTemplateData(pub TemplateData);

/// Merge `props` into the request's context props.
pub fn with_props<B>(req: &mut Request<B>, props: Props) {
    let extensions = req.extensions_mut();
    match extensions.get_mut::<ContextProps>() {
        Some(existing) => existing.0.extend(&props),
        None => {
            extensions.insert(ContextProps(props));
        }
    }
}

/// Merge `errors` into the request's validation errors.
pub fn with_validation_errors<B>(req: &mut Request<B>, errors: ValidationErrors) {
    let extensions = req.extensions_mut();
    match extensions.get_mut::<ContextErrors>() {
        Some(existing) => existing.0.extend(&errors),
        None => {
            extensions.insert(ContextErrors(errors));
        }
    }
}

/// Merge `data` into the request's root template data.
pub fn with_template_data<B>(req: &mut Request<B>, data: TemplateData) {
    let extensions = req.extensions_mut();
    match extensions.get_mut::<ContextTemplateData>() {
        Some(existing) => existing.0.extend(data),
        None => {
            extensions.insert(ContextTemplateData(data));
        }
    }
}

/// Snapshot of the request as seen by the render pipeline.
#[derive(Debug, Clone)]
pub struct RequestContext {
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    props: Props,
    errors: ValidationErrors,
    template_data: TemplateData,
}

impl RequestContext {
    pub fn from_parts(parts: &Parts) -> Self {
        Self::build(&parts.method, &parts.uri, &parts.headers, &parts.extensions)
    }

    pub fn from_request<B>(req: &Request<B>) -> Self {
        Self::build(req.method(), req.uri(), req.headers(), req.extensions())
    }

    fn build(
        method: &Method,
        uri: &Uri,
        headers: &HeaderMap,
        extensions: &axum::http::Extensions,
    ) -> Self {
        Self {
            method: method.clone(),
            uri: uri.clone(),
            headers: headers.clone(),
            props: extensions
                .get::<ContextProps>()
                .map(|p| p.0.clone())
                .unwrap_or_default(),
            errors: extensions
                .get::<ContextErrors>()
                .map(|e| e.0.clone())
                .unwrap_or_default(),
            template_data: extensions
                .get::<ContextTemplateData>()
                .map(|d| d.0.clone())
                .unwrap_or_default(),
        }
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Request target as sent by the client (path and query).
    pub fn url(&self) -> &str {
        self.uri
            .path_and_query()
            .map(|pq| pq.as_str())
            .unwrap_or("/")
    }

    pub fn is_inertia(&self) -> bool {
        headers::is_inertia_request(&self.headers)
    }

    pub fn referer(&self) -> &str {
        headers::referer(&self.headers)
    }

    pub fn client_version(&self) -> &str {
        headers::client_version(&self.headers)
    }

    pub fn partial_reload(&self) -> Option<PartialReload> {
        headers::partial_reload(&self.headers)
    }

    pub fn props(&self) -> &Props {
        &self.props
    }

    pub fn validation_errors(&self) -> &ValidationErrors {
        &self.errors
    }

    pub fn template_data(&self) -> &TemplateData {
        &self.template_data
    }
}

impl<S> FromRequestParts<S> for RequestContext
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::from_parts(parts))
    }
}
