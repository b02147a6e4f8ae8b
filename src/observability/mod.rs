//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → tracing events with structured fields
//!
//! Consumers:
//!     → logging.rs (fmt subscriber: pretty or JSON on stdout)
//! ```

pub mod logging;

pub use logging::init_logging;
