//! Configuration management for pipewatch
//!
//! Handles loading and validation of `pipewatch.toml`. Every field has a
//! default, so an absent file yields a working configuration that points at
//! a gateway on localhost.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Config file name looked up in the platform config directory
pub const CONFIG_FILE_NAME: &str = "pipewatch.toml";

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Config {
    /// General settings
    #[serde(default)]
    pub general: GeneralConfig,

    /// Upstream endpoint locations
    #[serde(default)]
    pub endpoints: EndpointsConfig,

    /// Polling settings
    #[serde(default)]
    pub polling: PollingConfig,
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-friendly output
    #[default]
    Pretty,
    /// JSON lines
    Json,
}

impl std::fmt::Display for LogFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pretty => f.write_str("pretty"),
            Self::Json => f.write_str("json"),
        }
    }
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            _ => Err(format!("unknown log format: {s}. Expected one of: pretty, json")),
        }
    }
}

/// General configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GeneralConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Log output format
    #[serde(default)]
    pub log_format: LogFormat,

    /// Optional log file
    #[serde(default)]
    pub log_file: Option<PathBuf>,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: LogFormat::default(),
            log_file: None,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Endpoint configuration.
///
/// Paths are joined onto `base_url`, so a reverse proxy that fronts every
/// service under one origin needs only `base_url` changed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EndpointsConfig {
    /// Gateway origin all paths are resolved against
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_processing_stats")]
    pub processing_stats: String,

    #[serde(default = "default_analyzer_stats")]
    pub analyzer_stats: String,

    #[serde(default = "default_motion_events")]
    pub motion_events: String,

    #[serde(default = "default_temperature_events")]
    pub temperature_events: String,

    /// POST target that recomputes the consistency check
    #[serde(default = "default_check_update")]
    pub check_update: String,

    /// GET target returning the latest consistency check
    #[serde(default = "default_check_results")]
    pub check_results: String,
}

impl Default for EndpointsConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            processing_stats: default_processing_stats(),
            analyzer_stats: default_analyzer_stats(),
            motion_events: default_motion_events(),
            temperature_events: default_temperature_events(),
            check_update: default_check_update(),
            check_results: default_check_results(),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost".to_string()
}

fn default_processing_stats() -> String {
    "/processing/stats".to_string()
}

fn default_analyzer_stats() -> String {
    "/analyzer/stats".to_string()
}

fn default_motion_events() -> String {
    "/storage/events/motion".to_string()
}

fn default_temperature_events() -> String {
    "/storage/events/temperature".to_string()
}

fn default_check_update() -> String {
    "/consistency_check/update".to_string()
}

fn default_check_results() -> String {
    "/consistency_check/checks".to_string()
}

/// Polling configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PollingConfig {
    /// Period between refresh cycles in milliseconds
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,

    /// Length of the trailing event query window in days
    #[serde(default = "default_event_window_days")]
    pub event_window_days: u32,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_interval_ms(),
            event_window_days: default_event_window_days(),
        }
    }
}

impl PollingConfig {
    #[must_use]
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

fn default_interval_ms() -> u64 {
    3000
}

fn default_event_window_days() -> u32 {
    30
}

const MIN_INTERVAL_MS: u64 = 100;

impl Config {
    /// Default config path (`<config_dir>/pipewatch/pipewatch.toml`)
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("pipewatch").join(CONFIG_FILE_NAME))
    }

    /// Load configuration from the default location.
    ///
    /// A missing default file is not an error; defaults are used instead.
    pub fn load() -> Result<Self, ConfigError> {
        match Self::default_path() {
            Some(path) if path.exists() => Self::load_from(&path),
            _ => {
                let config = Self::default();
                config.validate()?;
                Ok(config)
            }
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let display = path.display().to_string();
        if !path.exists() {
            return Err(ConfigError::FileNotFound(display));
        }
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::ReadFailed(display, e.to_string()))?;
        let config = Self::from_toml_str(&contents)?;
        tracing::debug!(path = %path.display(), "Loaded config file");
        Ok(config)
    }

    /// Parse and validate configuration from TOML text
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: Self =
            toml::from_str(contents).map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize the effective configuration as TOML
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::SerializeFailed(e.to_string()))
    }

    /// Check field values that serde cannot express
    pub fn validate(&self) -> Result<(), ConfigError> {
        let base = url::Url::parse(&self.endpoints.base_url).map_err(|e| {
            ConfigError::ValidationError(format!(
                "endpoints.base_url {:?} is not a valid URL: {e}",
                self.endpoints.base_url
            ))
        })?;
        if !matches!(base.scheme(), "http" | "https") {
            return Err(ConfigError::ValidationError(format!(
                "endpoints.base_url must use http or https, got {}",
                base.scheme()
            )));
        }
        if self.polling.interval_ms < MIN_INTERVAL_MS {
            return Err(ConfigError::ValidationError(format!(
                "polling.interval_ms must be at least {MIN_INTERVAL_MS}, got {}",
                self.polling.interval_ms
            )));
        }
        if self.polling.event_window_days == 0 {
            return Err(ConfigError::ValidationError(
                "polling.event_window_days must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}
