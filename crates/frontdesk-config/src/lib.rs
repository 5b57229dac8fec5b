//! Configuration parsing and validation for frontdeskd
//!
//! Supports TOML configuration with:
//! - Versioned schema
//! - Service settings (socket, overdue scan interval)
//! - The staff roster used to seed the reception board
//! - Validation with clear error messages

mod schema;
mod settings;
mod validation;

pub use schema::*;
pub use settings::*;
pub use validation::*;

use std::path::Path;
use thiserror::Error;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Validation failed: {errors:?}")]
    ValidationFailed { errors: Vec<ValidationError> },

    #[error("Unsupported config version: {0}")]
    UnsupportedVersion(u32),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// Current supported config version
pub const CURRENT_CONFIG_VERSION: u32 = 1;

/// Load and validate configuration from a TOML file
pub fn load_config(path: impl AsRef<Path>) -> ConfigResult<DeskConfig> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)?;
    let config = parse_config(&content)?;

    tracing::debug!(
        path = %path.display(),
        staff_count = config.roster.len(),
        "Config parsed"
    );

    Ok(config)
}

/// Parse and validate configuration from a TOML string
pub fn parse_config(content: &str) -> ConfigResult<DeskConfig> {
    let raw: RawConfig = toml::from_str(content)?;

    if raw.config_version != CURRENT_CONFIG_VERSION {
        return Err(ConfigError::UnsupportedVersion(raw.config_version));
    }

    let errors = validate_config(&raw);
    if !errors.is_empty() {
        return Err(ConfigError::ValidationFailed { errors });
    }

    Ok(DeskConfig::from_raw(raw))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use std::time::Duration;

    #[test]
    fn parse_minimal_config() {
        let config = r#"
            config_version = 1

            [[staff]]
            first_name = "Ann"
            last_name = "Lee"
            email = "ann@example.org"
        "#;

        let config = parse_config(config).unwrap();
        assert_eq!(config.roster.len(), 1);
        assert_eq!(config.roster[0].first_name, "Ann");
        assert_eq!(config.roster[0].photo_ref, "");
        assert_eq!(config.service.tick_interval, Duration::from_secs(10));
    }

    #[test]
    fn reject_wrong_version() {
        let result = parse_config("config_version = 99");
        assert!(matches!(result, Err(ConfigError::UnsupportedVersion(99))));
    }

    #[test]
    fn reject_invalid_roster() {
        let config = r#"
            config_version = 1

            [[staff]]
            first_name = ""
            last_name = "Lee"
            email = "ann@example.org"
        "#;

        match parse_config(config) {
            Err(ConfigError::ValidationFailed { errors }) => assert_eq!(errors.len(), 1),
            other => panic!("expected validation failure, got {:?}", other),
        }
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
            config_version = 1

            [service]
            tick_interval_seconds = 5
            "#
        )
        .unwrap();

        let config = load_config(file.path()).unwrap();
        assert!(config.roster.is_empty());
        assert_eq!(config.service.tick_interval, Duration::from_secs(5));
    }

    #[test]
    fn missing_file_is_read_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = load_config(dir.path().join("absent.toml"));
        assert!(matches!(result, Err(ConfigError::ReadError(_))));
    }
}
