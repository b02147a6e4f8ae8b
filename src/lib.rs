//! Server-side adapter for the Inertia.js protocol on axum.
//!
//! Full page loads receive an HTML document with the page embedded in a
//! container element; client-side visits (`X-Inertia: true`) receive the page
//! as JSON.
//!
//! # Architecture Overview
//!
//! ```text
//!   Request ──▶ InertiaLayer ──▶ handler ──▶ Inertia::render
//!                   │                            │
//!                   │                            ├─▶ props (merge, select, materialize)
//!                   │                            ├─▶ Page
//!                   │                            └─▶ JSON | ssr ─▶ root template
//!                   ▼
//!   Response ◀── protocol rules (version, empty body, 302 → 303) ◀── ResponseBuffer
//! ```
//!
//! # Example
//!
//! ```no_run
//! use axum::{response::Response, routing::get, Router};
//! use inertia_bridge::{Inertia, InertiaError, Props, RequestContext};
//!
//! async fn home(
//!     axum::extract::State(inertia): axum::extract::State<Inertia>,
//!     ctx: RequestContext,
//! ) -> Result<Response, InertiaError> {
//!     inertia
//!         .render_response(&ctx, "Home", Props::new().with("greeting", "hello"))
//!         .await
//! }
//!
//! # fn main() -> Result<(), InertiaError> {
//! let inertia = Inertia::builder("resources/app.html").version("1").build()?;
//! let app: Router = Router::new()
//!     .route("/", get(home))
//!     .layer(inertia.layer())
//!     .with_state(inertia);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;
pub mod http;
pub mod observability;
pub mod props;
pub mod render;
pub mod state;

pub use config::InertiaConfig;
pub use error::{BoxError, InertiaError};
pub use http::{
    with_props, with_template_data, with_validation_errors, InertiaLayer, RequestContext,
    ResponseBuffer, ResponseSink,
};
pub use props::{PartialReload, Prop, Props, ValidationErrors};
pub use render::{Inertia, Page, RootTemplate, TemplateValue};
pub use state::InertiaBuilder;
