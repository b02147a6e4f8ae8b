//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges and URL shapes
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: InertiaConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use thiserror::Error;

use crate::config::schema::InertiaConfig;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("root_template must not be empty")]
    EmptyRootTemplate,

    #[error("container_id must not be empty")]
    EmptyContainerId,

    #[error("ssr.url `{0}` is not a valid http(s) URL")]
    InvalidSsrUrl(String),

    #[error("ssr.timeout_ms must be greater than zero")]
    ZeroSsrTimeout,

    #[error("observability.log_format must be \"pretty\" or \"json\", got `{0}`")]
    UnknownLogFormat(String),
}

/// Validate a parsed configuration.
pub fn validate_config(config: &InertiaConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.root_template.trim().is_empty() {
        errors.push(ValidationError::EmptyRootTemplate);
    }
    if config.container_id.trim().is_empty() {
        errors.push(ValidationError::EmptyContainerId);
    }

    if config.ssr.enabled {
        let valid = url::Url::parse(&config.ssr.url)
            .map(|u| matches!(u.scheme(), "http" | "https"))
            .unwrap_or(false);
        if !valid {
            errors.push(ValidationError::InvalidSsrUrl(config.ssr.url.clone()));
        }
        if config.ssr.timeout_ms == 0 {
            errors.push(ValidationError::ZeroSsrTimeout);
        }
    }

    if !matches!(config.observability.log_format.as_str(), "pretty" | "json") {
        errors.push(ValidationError::UnknownLogFormat(
            config.observability.log_format.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert_eq!(validate_config(&InertiaConfig::default()), Ok(()));
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = InertiaConfig::default();
        config.container_id = String::new();
        config.ssr.enabled = true;
        config.ssr.url = "not a url".into();
        config.ssr.timeout_ms = 0;

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![
                ValidationError::EmptyContainerId,
                ValidationError::InvalidSsrUrl("not a url".into()),
                ValidationError::ZeroSsrTimeout,
            ]
        );
    }

    #[test]
    fn test_ssr_url_ignored_when_disabled() {
        let mut config = InertiaConfig::default();
        config.ssr.url = "ftp://nope".into();
        assert!(validate_config(&config).is_ok());
    }
}
