//! Page props subsystem.
//!
//! # Data Flow
//! ```text
//! shared props (SharedState)
//!     + request-context props (request extensions)
//!     + render-call props
//!     → resolver.rs merge (later layers win)
//!     → resolver.rs select (full load / partial reload)
//!     → materialize producers
//!     → ordered JSON object with `errors`
//! ```

pub mod resolver;
pub mod value;

pub use resolver::{merge, resolve, PartialReload, ERRORS_KEY};
pub use value::{Producer, Prop, PropKind, Props, ValidationErrors};
