//! Configuration management for the image sorter
//!
//! Everything is loaded once at startup and shared read-only behind an `Arc`.
//! Sources, lowest precedence first: built-in defaults, `config.toml`,
//! `IMAGE_SORTER__*` environment variables.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use std::collections::BTreeSet;
use std::path::PathBuf;
use std::time::Duration;

/// Environment variable naming an alternate config file (without extension).
pub const CONFIG_PATH_ENV: &str = "IMAGE_SORTER_CONFIG";

/// Complete application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub upload: UploadConfig,
    pub remote: RemoteConfig,
}

/// HTTP listener settings (restart required)
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Environment: IMAGE_SORTER__SERVER__BIND_ADDRESS
    pub bind_address: String,

    /// Environment: IMAGE_SORTER__SERVER__PORT
    pub port: u16,
}

/// Storage layout and the extension allow-lists used by the validator
#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    /// Root containing `unsorted`, `1`..`9` and `archive`
    pub root: PathBuf,

    /// Extensions a persisted media file may carry (lowercase, no dot)
    pub media_extensions: BTreeSet<String>,

    /// Extensions accepted only as transient intake containers
    pub archive_extensions: BTreeSet<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct UploadConfig {
    /// Maximum request body for `/upload`
    pub max_upload_size_mb: u64,
}

/// Remote import (Google Drive v3) endpoint settings
#[derive(Debug, Deserialize, Clone)]
pub struct RemoteConfig {
    pub api_base_url: String,
    pub timeout_secs: u64,
}

impl AppConfig {
    /// Load configuration from `config.toml` (or `$IMAGE_SORTER_CONFIG`) with environment overrides
    pub fn load() -> Result<Self, ConfigError> {
        let config_path = std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| "config".to_string());
        Self::load_from(&config_path)
    }

    /// Load configuration using `config_path` as the optional file source
    pub fn load_from(config_path: &str) -> Result<Self, ConfigError> {
        let settings = Self::with_defaults(Config::builder())?
            .add_source(File::with_name(config_path).required(false))
            .add_source(Environment::with_prefix("IMAGE_SORTER").separator("__"))
            .build()?;

        let config: AppConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Built-in defaults only, rooted at `root`. Used by tests and embedding callers.
    pub fn defaults_with_root(root: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let root: PathBuf = root.into();
        let settings = Self::with_defaults(Config::builder())?
            .set_override("storage.root", root.to_string_lossy().to_string())?
            .build()?;

        let config: AppConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    fn with_defaults(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> Result<config::ConfigBuilder<config::builder::DefaultState>, ConfigError> {
        builder
            .set_default("server.bind_address", "127.0.0.1")?
            .set_default("server.port", 5000)?
            .set_default("storage.root", "uploads")?
            .set_default("storage.media_extensions", vec!["png", "jpg", "jpeg", "gif"])?
            .set_default("storage.archive_extensions", vec!["zip"])?
            .set_default("upload.max_upload_size_mb", 256)?
            .set_default("remote.api_base_url", "https://www.googleapis.com/drive/v3")?
            .set_default("remote.timeout_secs", 60)
    }

    /// Validation for all configuration values
    fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::Message("server.port cannot be 0".into()));
        }

        if self.storage.root.as_os_str().is_empty() {
            return Err(ConfigError::Message("storage.root cannot be empty".into()));
        }

        if self.storage.media_extensions.is_empty() {
            return Err(ConfigError::Message(
                "storage.media_extensions must name at least one extension".into(),
            ));
        }

        if let Some(ext) = self
            .storage
            .media_extensions
            .iter()
            .find(|ext| self.storage.archive_extensions.contains(*ext))
        {
            return Err(ConfigError::Message(format!(
                "extension '{ext}' cannot be both a media and an archive extension"
            )));
        }

        if self.upload.max_upload_size_mb == 0 {
            return Err(ConfigError::Message(
                "upload.max_upload_size_mb must be greater than 0".into(),
            ));
        }

        Ok(())
    }
}

impl ServerConfig {
    /// Bind address and port as a socket address string
    pub fn listen_socket(&self) -> String {
        format!("{}:{}", self.bind_address, self.port)
    }
}

impl UploadConfig {
    /// Get maximum upload size in bytes
    pub fn max_upload_size_bytes(&self) -> usize {
        (self.max_upload_size_mb as usize) * 1024 * 1024
    }
}

impl RemoteConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}
