//! Tower middleware.
//!
//! # Data Flow
//! ```text
//! Request
//!     → protocol.rs (Vary, marker-header check)
//!     → downstream handler (writes a Response)
//!     → protocol.rs (capture into ResponseBuffer, apply protocol rules)
//!     → commit
//! ```

pub mod protocol;

pub use protocol::{InertiaLayer, InertiaService};
