#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Configuration management for tickline
//!
//! Settings are resolved from, in increasing priority:
//! - Default values (hard-coded)
//! - Configuration file (~/.config/tickline/config.toml)
//! - Environment variables (`TICKLINE_*`)
//! - Builder calls made by the embedding program

mod core;

pub use self::core::{ColorChoice, DisplayConfig, EstimationConfig};

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tickline_errors::{ConfigError, Result};
use tokio::fs;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub display: DisplayConfig,

    #[serde(default)]
    pub estimation: EstimationConfig,
}

impl Config {
    /// Get the default config file path
    ///
    /// # Errors
    ///
    /// Returns an error if the system config directory cannot be determined.
    pub fn default_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir().ok_or_else(|| ConfigError::NotFound {
            path: "config directory".to_string(),
        })?;
        Ok(config_dir.join("tickline").join("config.toml"))
    }

    /// Parse configuration from a TOML document
    ///
    /// # Errors
    ///
    /// Returns an error if the document is not valid TOML or holds values of
    /// the wrong type.
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        toml::from_str(contents)
            .map_err(|e| ConfigError::ParseError {
                message: e.to_string(),
            })
            .map_err(Into::into)
    }

    /// Load configuration from file
    ///
    /// # Errors
    ///
    /// Returns an error if the file does not exist, cannot be read, or
    /// contains invalid TOML.
    pub async fn load_from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ConfigError::NotFound {
                    path: path.display().to_string(),
                }
            } else {
                ConfigError::ReadError {
                    path: path.display().to_string(),
                    error: e.to_string(),
                }
            }
        })?;

        tracing::debug!(path = %path.display(), "loaded tickline config");
        Self::from_toml_str(&contents)
    }

    /// Load configuration from the default location, falling back to defaults
    ///
    /// # Errors
    ///
    /// Returns an error if the default file exists but cannot be read or
    /// parsed.
    pub async fn load() -> Result<Self> {
        let Ok(config_path) = Self::default_path() else {
            return Ok(Self::default());
        };

        if config_path.exists() {
            Self::load_from_file(&config_path).await
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from an optional path or use default
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be read or parsed
    pub async fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(config_path) => Self::load_from_file(config_path).await,
            None => Self::load().await,
        }
    }

    /// Merge with environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if environment variables contain invalid values
    /// that cannot be parsed into the expected types.
    pub fn merge_env(&mut self) -> Result<()> {
        // TICKLINE_COLOR
        if let Ok(color) = std::env::var("TICKLINE_COLOR") {
            self.display.color = match color.as_str() {
                "always" => ColorChoice::Always,
                "auto" => ColorChoice::Auto,
                "never" => ColorChoice::Never,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        field: "TICKLINE_COLOR".to_string(),
                        value: color,
                    }
                    .into())
                }
            };
        }

        // TICKLINE_PREVENT_OVERWRITE
        if let Ok(flag) = std::env::var("TICKLINE_PREVENT_OVERWRITE") {
            self.display.prevent_overwrite = match flag.as_str() {
                "true" | "1" | "yes" => true,
                "false" | "0" | "no" => false,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        field: "TICKLINE_PREVENT_OVERWRITE".to_string(),
                        value: flag,
                    }
                    .into())
                }
            };
        }

        // TICKLINE_THROTTLE_MS
        if let Ok(throttle) = std::env::var("TICKLINE_THROTTLE_MS") {
            self.display.throttle_ms = throttle.parse().map_err(|_| ConfigError::InvalidValue {
                field: "TICKLINE_THROTTLE_MS".to_string(),
                value: throttle,
            })?;
        }

        // TICKLINE_AVERAGE_SAMPLE_SIZE
        if let Ok(size) = std::env::var("TICKLINE_AVERAGE_SAMPLE_SIZE") {
            self.estimation.average_sample_size =
                size.parse().map_err(|_| ConfigError::InvalidValue {
                    field: "TICKLINE_AVERAGE_SAMPLE_SIZE".to_string(),
                    value: size,
                })?;
        }

        // TICKLINE_HEARTBEAT_MS
        if let Ok(heartbeat) = std::env::var("TICKLINE_HEARTBEAT_MS") {
            self.estimation.heartbeat_ms =
                heartbeat.parse().map_err(|_| ConfigError::InvalidValue {
                    field: "TICKLINE_HEARTBEAT_MS".to_string(),
                    value: heartbeat,
                })?;
        }

        Ok(())
    }

    /// Check cross-field constraints that serde cannot express
    ///
    /// # Errors
    ///
    /// Returns an error if the averaging window is empty.
    pub fn validate(&self) -> Result<()> {
        if self.estimation.average_sample_size == 0 {
            return Err(ConfigError::Invalid {
                message: "estimation.average_sample_size must be at least 1".to_string(),
            }
            .into());
        }
        Ok(())
    }

    /// Throttle interval as a duration; zero means disabled
    #[must_use]
    pub fn throttle(&self) -> std::time::Duration {
        std::time::Duration::from_millis(self.display.throttle_ms)
    }

    /// Heartbeat interval, or `None` when disabled
    #[must_use]
    pub fn heartbeat(&self) -> Option<std::time::Duration> {
        (self.estimation.heartbeat_ms > 0)
            .then(|| std::time::Duration::from_millis(self.estimation.heartbeat_ms))
    }
}
