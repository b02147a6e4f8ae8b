//! Structured logging.
//!
//! # Responsibilities
//! - Initialize the global tracing subscriber from configuration
//!
//! # Design Decisions
//! - `RUST_LOG` overrides the configured level when set
//! - JSON format for production, pretty format for development

use tracing_subscriber::{
    layer::SubscriberExt, util::SubscriberInitExt, util::TryInitError, EnvFilter,
};

use crate::config::ObservabilityConfig;

/// Install the global subscriber.
///
/// Fails if a subscriber has already been installed.
pub fn init_logging(config: &ObservabilityConfig) -> Result<(), TryInitError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let json = config.log_format == "json";

    tracing_subscriber::registry()
        .with(filter)
        .with(json.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!json).then(|| tracing_subscriber::fmt::layer()))
        .try_init()
}
