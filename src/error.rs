//! Error types shared across the adapter.
//!
//! # Design Decisions
//! - Resolver, template, and encoding failures are returned to the handler that
//!   called `render`; the adapter never writes an error page on its own
//! - Pre-render failures are not part of this enum (see `render::ssr::SsrError`):
//!   they are logged and degrade to client-side bootstrap

use std::path::PathBuf;

use axum::{
    http::{header::InvalidHeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::render::template::TemplateError;

/// Boxed error produced by user-supplied callbacks (prop producers, encoders, template functions).
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors returned by the adapter's public operations.
#[derive(Debug, Error)]
pub enum InertiaError {
    /// A prop producer reported failure; no partial page is emitted.
    #[error("failed to resolve prop `{prop}`: {source}")]
    Producer {
        prop: String,
        #[source]
        source: BoxError,
    },

    /// The root document template could not be loaded or rendered.
    #[error("root template error: {0}")]
    Template(#[from] TemplateError),

    /// The page could not be encoded by the configured JSON encoder.
    #[error("failed to encode page: {0}")]
    Encoding(#[source] BoxError),

    /// A redirect target could not be expressed as a header value.
    #[error("invalid header value: {0}")]
    InvalidHeader(#[from] InvalidHeaderValue),

    /// The asset version file could not be read.
    #[error("failed to read version file {path}: {source}")]
    VersionFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl IntoResponse for InertiaError {
    fn into_response(self) -> Response {
        tracing::error!(error = %self, "Inertia handler failed");
        (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
    }
}
