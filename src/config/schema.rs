//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the adapter.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct InertiaConfig {
    /// Path of the root HTML template.
    pub root_template: String,

    /// Current asset version.
    pub version: String,

    /// File whose SHA-256 becomes the asset version (overrides `version`).
    pub version_file: Option<String>,

    /// `id` of the element the client application mounts on.
    pub container_id: String,

    /// Pre-render service settings.
    pub ssr: SsrConfig,

    /// Listener settings for the bundled server.
    pub server: ServerConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl Default for InertiaConfig {
    fn default() -> Self {
        Self {
            root_template: "resources/app.html".to_string(),
            version: String::new(),
            version_file: None,
            container_id: "app".to_string(),
            ssr: SsrConfig::default(),
            server: ServerConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

/// Pre-render service configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SsrConfig {
    /// Enable server-side pre-rendering.
    pub enabled: bool,

    /// Base URL of the pre-render service; requests go to `<url>/render`.
    pub url: String,

    /// Upper bound for a single pre-render call in milliseconds.
    pub timeout_ms: u64,
}

impl Default for SsrConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            url: "http://127.0.0.1:13714".to_string(),
            timeout_ms: 2000,
        }
    }
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:3000".to_string(),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error) or a full filter directive.
    pub log_level: String,

    /// Output format: "pretty" or "json".
    pub log_format: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: "pretty".to_string(),
        }
    }
}
