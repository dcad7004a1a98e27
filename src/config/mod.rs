//! Configuration loading and validation.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::storage::StorageConfig;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Where snapshots come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// JSON files written by the log parser
    #[default]
    File,
    /// A log-parser service over HTTP
    Http,
}

/// Snapshot source configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    #[serde(default)]
    pub kind: SourceKind,

    /// Directory of `<player>.json` snapshots (file source).
    /// Defaults to `<data_dir>/snapshots`.
    #[serde(default)]
    pub snapshot_dir: Option<PathBuf>,

    /// Parser service root (http source)
    #[serde(default)]
    pub base_url: Option<String>,

    /// Request timeout in seconds (http source)
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

fn default_timeout() -> u64 {
    30
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            kind: SourceKind::default(),
            snapshot_dir: None,
            base_url: None,
            timeout_seconds: default_timeout(),
        }
    }
}

/// Server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_cors_origin")]
    pub cors_origin: String,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_cors_origin() -> String {
    "*".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origin: default_cors_origin(),
        }
    }
}

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub source: SourceConfig,

    #[serde(default)]
    pub server: ServerConfig,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            log_level: default_log_level(),
            source: SourceConfig::default(),
            server: ServerConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from `path` if it exists, defaults otherwise.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        if path.exists() {
            Self::from_file(path)
        } else {
            tracing::debug!("No config at {:?}, using defaults", path);
            Ok(Self::default())
        }
    }

    /// Storage layout rooted at `data_dir`.
    pub fn storage(&self) -> StorageConfig {
        StorageConfig::new(self.data_dir.clone())
    }

    /// Directory the file source reads from.
    pub fn snapshot_dir(&self) -> PathBuf {
        self.source
            .snapshot_dir
            .clone()
            .unwrap_or_else(|| self.storage().snapshots_dir())
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.source.kind == SourceKind::Http {
            match self.source.base_url.as_deref() {
                None | Some("") => {
                    return Err(ConfigError::ValidationError(
                        "source.base_url is required when source.kind = \"http\"".to_string(),
                    ));
                }
                Some(url) if url::Url::parse(url).is_err() => {
                    return Err(ConfigError::ValidationError(format!(
                        "source.base_url is not a valid URL: {}",
                        url
                    )));
                }
                Some(_) => {}
            }

            if self.source.timeout_seconds == 0 {
                return Err(ConfigError::ValidationError(
                    "Source timeout must be greater than 0".to_string(),
                ));
            }
        }

        if self.server.port == 0 {
            return Err(ConfigError::ValidationError(
                "Server port must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();

        assert_eq!(config.data_dir, PathBuf::from("./data"));
        assert_eq!(config.log_level, "info");
        assert_eq!(config.source.kind, SourceKind::File);
        assert_eq!(config.snapshot_dir(), PathBuf::from("./data/snapshots"));
        assert_eq!(config.server.port, 8080);
    }

    #[test]
    fn test_snapshot_dir_follows_data_dir() {
        let mut config = AppConfig {
            data_dir: PathBuf::from("/srv/tenhou"),
            ..Default::default()
        };
        assert_eq!(config.snapshot_dir(), PathBuf::from("/srv/tenhou/snapshots"));

        config.source.snapshot_dir = Some(PathBuf::from("/mnt/parser-out"));
        assert_eq!(config.snapshot_dir(), PathBuf::from("/mnt/parser-out"));
    }

    #[test]
    fn test_config_validation_ok() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation_http_needs_url() {
        let mut config = AppConfig::default();
        config.source.kind = SourceKind::Http;
        assert!(config.validate().is_err());

        config.source.base_url = Some("not a url".to_string());
        assert!(config.validate().is_err());

        config.source.base_url = Some("http://localhost:9000".to_string());
        assert!(config.validate().is_ok());

        config.source.timeout_seconds = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_bad_port() {
        let mut config = AppConfig::default();
        config.server.port = 0;

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            log_level = "debug"

            [source]
            kind = "http"
            base_url = "http://parser.local"
            "#,
        )
        .unwrap();

        assert_eq!(config.log_level, "debug");
        assert_eq!(config.source.kind, SourceKind::Http);
        assert_eq!(config.source.timeout_seconds, 30);
        assert_eq!(config.server.host, "127.0.0.1");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load_or_default(&dir.path().join("config.toml")).unwrap();
        assert_eq!(config.server.port, 8080);
    }

    #[test]
    fn test_from_file_rejects_invalid() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[server]\nport = 0\n").unwrap();

        assert!(matches!(
            AppConfig::from_file(&path),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn test_config_serialization() {
        let config = AppConfig::default();
        let toml_str = toml::to_string(&config).unwrap();

        // Should be parseable
        let parsed: AppConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(config.data_dir, parsed.data_dir);
        assert_eq!(config.source.kind, parsed.source.kind);
    }
}
