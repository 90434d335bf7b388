//! Configuration management module.

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::wms::{LIGHTING_AISLES, ProtocolMode};

/// Configuration load result.
#[derive(Debug)]
pub enum ConfigLoadResult {
    /// Config loaded successfully.
    Loaded(AppConfig),
    /// Config file missing (first run).
    Missing,
    /// Config file exists but invalid.
    Invalid(ConfigError),
}

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Read(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Validation failed: {0}")]
    Validation(String),
}

/// Main application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub plc: PlcConfig,
    #[serde(default)]
    pub control: ControlConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// PLC connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlcConfig {
    pub host: String,
    /// TCP port of the WMS interface (default: 2000).
    pub port: u16,
    /// Connect/read timeout in seconds (default: 5).
    pub timeout_secs: u64,
    /// Command wire format.
    pub protocol: ProtocolMode,
}

fn default_port() -> u16 {
    2000
}

fn default_timeout_secs() -> u64 {
    5
}

/// Aisle control and monitoring settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlConfig {
    /// Highest aisle number accepted for open commands.
    pub max_aisle: u8,
    /// Number of status snapshots kept by the monitor.
    pub history_size: usize,
    /// Seconds between polls in watch mode.
    pub poll_interval_secs: u64,
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive, overridden by `RUST_LOG`.
    pub level: String,
    /// Directory for daily rolling log files. Console only when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub directory: Option<PathBuf>,
}

impl AppConfig {
    /// Get config file path (platform config dir, else next to the executable).
    pub fn default_path() -> PathBuf {
        if let Some(dirs) = ProjectDirs::from("com", "Stow", "mobile-racking") {
            return dirs.config_dir().join("config.toml");
        }

        std::env::current_exe()
            .ok()
            .and_then(|p| p.parent().map(|p| p.to_path_buf()))
            .unwrap_or_else(|| PathBuf::from("."))
            .join("config.toml")
    }

    /// Attempt to load config with detailed result.
    pub fn try_load(path: &Path) -> ConfigLoadResult {
        if !path.exists() {
            return ConfigLoadResult::Missing;
        }

        match std::fs::read_to_string(path) {
            Ok(content) => match Self::from_toml(&content) {
                Ok(config) => ConfigLoadResult::Loaded(config),
                Err(e) => ConfigLoadResult::Invalid(e),
            },
            Err(e) => ConfigLoadResult::Invalid(ConfigError::Read(e)),
        }
    }

    /// Parse and validate a TOML document.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: AppConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.plc.host.trim().is_empty() {
            return Err(ConfigError::Validation("PLC host cannot be empty".to_string()));
        }
        if self.plc.port == 0 {
            return Err(ConfigError::Validation("PLC port must be greater than 0".to_string()));
        }
        if self.plc.timeout_secs == 0 {
            return Err(ConfigError::Validation("PLC timeout must be at least 1 second".to_string()));
        }
        if self.plc.timeout_secs > 120 {
            return Err(ConfigError::Validation("PLC timeout cannot exceed 120 seconds".to_string()));
        }
        if self.control.max_aisle < 1 || self.control.max_aisle > LIGHTING_AISLES {
            return Err(ConfigError::Validation(format!(
                "Max aisle must be between 1 and {LIGHTING_AISLES}"
            )));
        }
        if self.control.history_size < 1 {
            return Err(ConfigError::Validation("History size must be at least 1".to_string()));
        }
        if self.control.poll_interval_secs < 1 {
            return Err(ConfigError::Validation(
                "Poll interval must be at least 1 second".to_string(),
            ));
        }
        if self.logging.level.trim().is_empty() {
            return Err(ConfigError::Validation("Log level cannot be empty".to_string()));
        }
        Ok(())
    }

    /// Save configuration to file.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

impl Default for PlcConfig {
    fn default() -> Self {
        Self {
            host: "1.1.1.2".to_string(),
            port: default_port(),
            timeout_secs: default_timeout_secs(),
            protocol: ProtocolMode::Simple,
        }
    }
}

impl Default for ControlConfig {
    fn default() -> Self {
        Self {
            max_aisle: 24,
            history_size: 50,
            poll_interval_secs: 5,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            directory: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_validates() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation_empty_host() {
        let mut config = AppConfig::default();
        config.plc.host = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_invalid_port() {
        let mut config = AppConfig::default();
        config.plc.port = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_max_aisle_bounds() {
        let mut config = AppConfig::default();

        config.control.max_aisle = 0;
        assert!(config.validate().is_err());

        config.control.max_aisle = 33;
        assert!(config.validate().is_err());

        config.control.max_aisle = 19;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = AppConfig::from_toml(
            r#"
            [plc]
            host = "10.0.0.7"
            protocol = "legacy"
            "#,
        )
        .unwrap();

        assert_eq!(config.plc.host, "10.0.0.7");
        assert_eq!(config.plc.port, 2000);
        assert_eq!(config.plc.timeout_secs, 5);
        assert_eq!(config.plc.protocol, ProtocolMode::Legacy);
        assert_eq!(config.control.max_aisle, 24);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_partial_sections_use_field_defaults() {
        let config = AppConfig::from_toml(
            r#"
            [plc]
            port = 2001

            [control]
            max_aisle = 19

            [logging]
            directory = "/var/log/mobile-racking"
            "#,
        )
        .unwrap();

        assert_eq!(config.plc.host, "1.1.1.2");
        assert_eq!(config.plc.port, 2001);
        assert_eq!(config.plc.protocol, ProtocolMode::Simple);
        assert_eq!(config.control.max_aisle, 19);
        assert_eq!(config.control.history_size, 50);
        assert_eq!(config.control.poll_interval_secs, 5);
        assert_eq!(config.logging.level, "info");
        assert_eq!(
            config.logging.directory.as_deref(),
            Some(Path::new("/var/log/mobile-racking"))
        );
    }

    #[test]
    fn test_unknown_protocol_rejected() {
        let result = AppConfig::from_toml(
            r#"
            [plc]
            host = "10.0.0.7"
            protocol = "framed"
            "#,
        );
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = std::env::temp_dir().join(format!("mobile-racking-config-{}", std::process::id()));
        let path = dir.join("config.toml");

        let mut config = AppConfig::default();
        config.plc.host = "192.168.10.20".to_string();
        config.save(&path).unwrap();

        match AppConfig::try_load(&path) {
            ConfigLoadResult::Loaded(loaded) => assert_eq!(loaded.plc.host, "192.168.10.20"),
            other => panic!("unexpected load result: {other:?}"),
        }

        std::fs::remove_dir_all(&dir).unwrap();
    }

    #[test]
    fn test_missing_file() {
        let path = std::env::temp_dir().join("mobile-racking-does-not-exist.toml");
        assert!(matches!(AppConfig::try_load(&path), ConfigLoadResult::Missing));
    }
}
