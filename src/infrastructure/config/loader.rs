use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use thiserror::Error;

use crate::adapters::backends::SUPPORTED_BACKENDS;
use crate::adapters::secure_file::{expand_path, SECURE_FILE_MODE};
use crate::domain::models::config::Config;

/// Default configuration file, relative to the home directory.
pub const DEFAULT_CONFIG_PATH: &str = "~/.config/tokn/config.yaml";

/// Prefix for environment overrides (`TOKN_LOGGING__LEVEL=debug`).
pub const ENV_PREFIX: &str = "TOKN_";

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Unknown backend type: {0}. Supported backends: local, doppler")]
    UnknownBackend(String),

    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("Invalid log format: {0}. Must be one of: json, pretty")]
    InvalidLogFormat(String),

    #[error("Invalid log rotation: {0}. Must be one of: daily, hourly, never")]
    InvalidLogRotation(String),

    #[error("Local data directory cannot be empty")]
    EmptyDataDir,

    #[error("Invalid HTTP timeout: {0}. Must be at least 1 second")]
    InvalidTimeout(u64),

    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),
}

/// Configuration loader with hierarchical merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Location of the user configuration file.
    pub fn default_path() -> PathBuf {
        expand_path(DEFAULT_CONFIG_PATH)
    }

    /// Load configuration with hierarchical merging
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults (Serialized)
    /// 2. ~/.config/tokn/config.yaml (optional)
    /// 3. Environment variables (TOKN_* prefix, `__` separates nested keys)
    pub fn load() -> Result<Config> {
        Self::load_with_path(Self::default_path())
    }

    /// Same as [`load`](Self::load) with an explicit config file.
    pub fn load_with_path(path: impl AsRef<Path>) -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(path.as_ref()))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
            .extract()
            .context("Failed to extract configuration from figment")?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific file, ignoring the environment
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(path.as_ref()))
            .extract()
            .context(format!(
                "Failed to load config from {}",
                path.as_ref().display()
            ))?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Write `config` as YAML with owner-only permissions.
    pub fn save(config: &Config, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        Self::validate(config)?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let yaml = serde_yaml::to_string(config).context("Failed to serialize configuration")?;
        std::fs::write(path, yaml).with_context(|| format!("Failed to write {}", path.display()))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(path, std::fs::Permissions::from_mode(SECURE_FILE_MODE))
                .with_context(|| format!("Failed to restrict permissions on {}", path.display()))?;
        }

        Ok(())
    }

    /// Validate configuration after loading
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        if !SUPPORTED_BACKENDS.contains(&config.backend.as_str()) {
            return Err(ConfigError::UnknownBackend(config.backend.clone()));
        }

        if config.local.data_dir.trim().is_empty() {
            return Err(ConfigError::EmptyDataDir);
        }

        if config.doppler.project.trim().is_empty() || config.doppler.config.trim().is_empty() {
            return Err(ConfigError::ValidationFailed(
                "doppler project and config cannot be empty".to_string(),
            ));
        }

        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&config.logging.level.to_lowercase().as_str()) {
            return Err(ConfigError::InvalidLogLevel(config.logging.level.clone()));
        }

        let valid_log_formats = ["json", "pretty"];
        if !valid_log_formats.contains(&config.logging.format.as_str()) {
            return Err(ConfigError::InvalidLogFormat(config.logging.format.clone()));
        }

        let valid_rotations = ["daily", "hourly", "never"];
        if !valid_rotations.contains(&config.logging.rotation.as_str()) {
            return Err(ConfigError::InvalidLogRotation(config.logging.rotation.clone()));
        }

        if config.http.timeout_secs == 0 {
            return Err(ConfigError::InvalidTimeout(config.http.timeout_secs));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::{NamedTempFile, TempDir};

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.backend, "local");
        assert_eq!(config.local.data_dir, "~/.config/tokn");
        assert_eq!(config.doppler.project, "tokn");
        assert_eq!(config.doppler.config, "dev");
        assert_eq!(config.http.timeout_secs, 30);
        ConfigLoader::validate(&config).expect("Default config should be valid");
    }

    #[test]
    fn test_yaml_parsing() {
        let yaml = r"
backend: doppler
doppler:
  project: infra
  config: prd
logging:
  level: debug
  format: json
";

        let config: Config = serde_yaml::from_str(yaml).expect("YAML should parse");

        assert_eq!(config.backend, "doppler");
        assert_eq!(config.doppler.project, "infra");
        assert_eq!(config.doppler.config, "prd");
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.format, "json");
        assert_eq!(config.local.data_dir, "~/.config/tokn", "Unset sections keep defaults");

        ConfigLoader::validate(&config).expect("Parsed config should be valid");
    }

    #[test]
    fn test_validate_unknown_backend() {
        let config = Config {
            backend: "vault".to_string(),
            ..Default::default()
        };

        let result = ConfigLoader::validate(&config);
        assert!(matches!(result, Err(ConfigError::UnknownBackend(b)) if b == "vault"));
    }

    #[test]
    fn test_validate_invalid_log_level() {
        let mut config = Config::default();
        config.logging.level = "invalid".to_string();

        match ConfigLoader::validate(&config).unwrap_err() {
            ConfigError::InvalidLogLevel(level) => assert_eq!(level, "invalid"),
            _ => panic!("Expected InvalidLogLevel error"),
        }
    }

    #[test]
    fn test_validate_invalid_log_format() {
        let mut config = Config::default();
        config.logging.format = "xml".to_string();

        match ConfigLoader::validate(&config).unwrap_err() {
            ConfigError::InvalidLogFormat(format) => assert_eq!(format, "xml"),
            _ => panic!("Expected InvalidLogFormat error"),
        }
    }

    #[test]
    fn test_validate_invalid_rotation() {
        let mut config = Config::default();
        config.logging.rotation = "weekly".to_string();
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidLogRotation(_))
        ));
    }

    #[test]
    fn test_validate_empty_data_dir() {
        let mut config = Config::default();
        config.local.data_dir = "  ".to_string();
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::EmptyDataDir)
        ));
    }

    #[test]
    fn test_validate_zero_timeout() {
        let mut config = Config::default();
        config.http.timeout_secs = 0;
        assert!(matches!(
            ConfigLoader::validate(&config),
            Err(ConfigError::InvalidTimeout(0))
        ));
    }

    #[test]
    fn test_env_override() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "backend: local\nlogging:\n  level: info").unwrap();
        file.flush().unwrap();

        temp_env::with_vars(
            [
                ("TOKN_BACKEND", Some("doppler")),
                ("TOKN_LOGGING__LEVEL", Some("debug")),
                ("TOKN_DOPPLER__PROJECT", Some("shared")),
            ],
            || {
                let config = ConfigLoader::load_with_path(file.path()).unwrap();
                assert_eq!(config.backend, "doppler", "Env should beat the file");
                assert_eq!(config.logging.level, "debug");
                assert_eq!(config.doppler.project, "shared");
                assert_eq!(config.doppler.config, "dev");
            },
        );
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let config = ConfigLoader::load_from_file(dir.path().join("absent.yaml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_invalid_file_is_rejected() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "backend: s3").unwrap();
        file.flush().unwrap();

        assert!(ConfigLoader::load_from_file(file.path()).is_err());
    }

    #[test]
    fn test_save_round_trip() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tokn/config.yaml");

        let mut config = Config::default();
        config.backend = "doppler".to_string();
        config.doppler.project = "infra".to_string();
        ConfigLoader::save(&config, &path).unwrap();

        let loaded = ConfigLoader::load_from_file(&path).unwrap();
        assert_eq!(loaded, config);

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = std::fs::metadata(&path).unwrap().permissions().mode();
            assert_eq!(mode & 0o777, 0o600);
        }
    }
}
