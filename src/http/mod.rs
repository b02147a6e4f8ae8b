//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! Request
//!     → middleware/ (InertiaLayer: Vary, capture, protocol rules)
//!     → request.rs (RequestContext: headers + per-request props/errors)
//!     → handler → Inertia::render into a ResponseSink
//!     → buffer.rs (ResponseBuffer → Response)
//!     → Send to client
//! ```

pub mod buffer;
pub mod headers;
pub mod middleware;
pub mod request;

pub use buffer::{ResponseBuffer, ResponseSink};
pub use headers::{
    is_inertia_request, X_INERTIA, X_INERTIA_LOCATION, X_INERTIA_PARTIAL_COMPONENT,
    X_INERTIA_PARTIAL_DATA, X_INERTIA_PARTIAL_EXCEPT, X_INERTIA_VERSION,
};
pub use middleware::{InertiaLayer, InertiaService};
pub use request::{with_props, with_template_data, with_validation_errors, RequestContext};
