//! Rendering subsystem.
//!
//! # Data Flow
//! ```text
//! handler → Inertia::render (pipeline.rs)
//!     → props::resolve → Page (page.rs)
//!     → X-Inertia request:  JSON body
//!     → full page load:     ssr.rs (optional pre-render)
//!                           → template.rs (root document) → HTML body
//! ```

pub mod page;
pub mod pipeline;
pub mod ssr;
pub mod template;

pub use page::Page;
pub use pipeline::Inertia;
pub use ssr::{SsrClient, SsrError, SsrResponse};
pub use template::{
    HtmlTemplate, RootTemplate, TemplateData, TemplateError, TemplateFunc, TemplateFuncs,
    TemplateValue,
};
