//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::InertiaConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join(.0))]
    Validation(Vec<ValidationError>),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<InertiaConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parse and validate configuration from TOML source.
pub fn parse_config(content: &str) -> Result<InertiaConfig, ConfigError> {
    let config: InertiaConfig = toml::from_str(content)?;

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_config_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "version = \"f8v01xv4h4\"\ncontainer_id = \"root\"").unwrap();

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.version, "f8v01xv4h4");
        assert_eq!(config.container_id, "root");
    }

    #[test]
    fn test_missing_file() {
        let err = load_config(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn test_validation_errors_are_joined() {
        let err = parse_config("container_id = \"\"\nroot_template = \"\"").unwrap_err();
        assert_eq!(
            err.to_string(),
            "Validation failed: root_template must not be empty, container_id must not be empty"
        );
    }

    #[test]
    fn test_parse_error() {
        let err = parse_config("version = ").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
