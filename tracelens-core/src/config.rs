//! Configuration loading and management
//!
//! Configuration is loaded from `~/.config/tracelens/config.toml`
//!
//! This module follows the XDG Base Directory Specification:
//! - Config: `$XDG_CONFIG_HOME/tracelens/` (~/.config/tracelens/)
//! - State/Logs/Filters: `$XDG_STATE_HOME/tracelens/` (~/.local/state/tracelens/)

use crate::error::{Error, Result};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Returns a best-effort home directory path.
fn home_dir() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Returns XDG_CONFIG_HOME or ~/.config
fn xdg_config_home() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".config"))
}

/// Returns XDG_STATE_HOME or ~/.local/state
fn xdg_state_home() -> PathBuf {
    std::env::var("XDG_STATE_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".local/state"))
}

/// Main configuration struct
#[derive(Debug, Deserialize, Default)]
pub struct Config {
    /// Backend API configuration
    #[serde(default)]
    pub api: ApiConfig,

    /// Polling and debounce intervals
    #[serde(default)]
    pub polling: PollingConfig,

    /// Local persistence of navigation state
    #[serde(default)]
    pub storage: StorageConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Backend API configuration
#[derive(Debug, Deserialize, Clone)]
pub struct ApiConfig {
    /// Base URL of the dashboard backend (e.g., `https://api.tracelens.dev`)
    #[serde(default)]
    pub base_url: String,

    /// HTTP request timeout in seconds
    #[serde(default = "default_api_timeout")]
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            timeout_secs: default_api_timeout(),
        }
    }
}

impl ApiConfig {
    /// Validate configuration, returning error message if invalid
    pub fn validate(&self) -> Result<()> {
        if self.base_url.is_empty() {
            return Err(Error::Config("api.base_url is required".to_string()));
        }
        if self.timeout_secs == 0 {
            return Err(Error::Config(
                "api.timeout_secs must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

fn default_api_timeout() -> u64 {
    30
}

/// Polling and debounce intervals
#[derive(Debug, Deserialize, Clone)]
pub struct PollingConfig {
    /// Milliseconds between clustering status refreshes
    #[serde(default = "default_clustering_interval")]
    pub clustering_interval_ms: u64,

    /// Quiet period before a text-search keystroke is applied
    #[serde(default = "default_search_debounce")]
    pub search_debounce_ms: u64,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            clustering_interval_ms: default_clustering_interval(),
            search_debounce_ms: default_search_debounce(),
        }
    }
}

impl PollingConfig {
    pub fn clustering_interval(&self) -> Duration {
        Duration::from_millis(self.clustering_interval_ms)
    }

    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms)
    }
}

fn default_clustering_interval() -> u64 {
    3000
}

fn default_search_debounce() -> u64 {
    300
}

/// Local persistence of navigation state
#[derive(Debug, Deserialize, Default, Clone)]
pub struct StorageConfig {
    /// Override path for the persisted filter/navigation state
    pub filters_path: Option<PathBuf>,
}

impl StorageConfig {
    /// Resolved path for the persisted filter/navigation state
    pub fn resolved_filters_path(&self) -> PathBuf {
        self.filters_path
            .clone()
            .unwrap_or_else(Config::filters_path)
    }
}

/// Logging configuration
#[derive(Debug, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Load configuration from the default path
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();

        if !config_path.exists() {
            tracing::info!("No config file found at {:?}, using defaults", config_path);
            return Ok(Config::default());
        }

        Self::load_from(&config_path)
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &PathBuf) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("failed to read config file {:?}: {}", path, e)))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("failed to parse config: {}", e)))?;

        Ok(config)
    }

    /// Returns the default config file path
    ///
    /// `$XDG_CONFIG_HOME/tracelens/config.toml` (~/.config/tracelens/config.toml)
    pub fn config_path() -> PathBuf {
        xdg_config_home().join("tracelens").join("config.toml")
    }

    /// Returns the state directory path (for logs and persisted filters)
    ///
    /// `$XDG_STATE_HOME/tracelens/` (~/.local/state/tracelens/)
    pub fn state_dir() -> PathBuf {
        xdg_state_home().join("tracelens")
    }

    /// Returns the persisted filter/navigation state path
    ///
    /// `$XDG_STATE_HOME/tracelens/filters.json`
    pub fn filters_path() -> PathBuf {
        Self::state_dir().join("filters.json")
    }

    /// Returns the log file path
    ///
    /// `$XDG_STATE_HOME/tracelens/tracelens.log`
    pub fn log_path() -> PathBuf {
        Self::state_dir().join("tracelens.log")
    }
}
