//! Configuration module for modwatch
//!
//! This module provides configuration structures and loading mechanisms.
//! Configuration can be loaded from TOML files and/or environment variables,
//! and is then overridden by whatever the command line supplies.

mod defaults;
mod loading;


use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use defaults::*;

/// Returns the path to the global configuration file
///
/// The global config is stored at `~/.modwatch/config.toml` and contains
/// user preferences that apply to every invocation.
pub fn global_config_path() -> Result<PathBuf> {
    let home_dir = dirs::home_dir()
        .ok_or_else(|| Error::config("Unable to determine home directory".to_string()))?;
    Ok(home_dir.join(".modwatch").join("config.toml"))
}

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// What to watch and how to batch it
    #[serde(default)]
    pub watch: WatchConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Configuration for a watch session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatchConfig {
    /// Paths to monitor; directories are watched recursively
    #[serde(default)]
    pub paths: Vec<PathBuf>,

    /// Glob patterns excluded from reports
    #[serde(default)]
    pub excludes: Vec<String>,

    /// Quiet period in milliseconds that closes a batch
    #[serde(default = "default_quiet_period_ms")]
    pub quiet_period_ms: u64,

    /// Capacity of the raw event channel between notify and the engine
    #[serde(default = "default_event_buffer")]
    pub event_buffer: usize,

    /// Capacity of the channel carrying change sets to the consumer
    #[serde(default = "default_output_buffer")]
    pub output_buffer: usize,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default level: trace, debug, info, warn or error
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl WatchConfig {
    /// Get the quiet period as a duration
    pub fn quiet_period(&self) -> Duration {
        Duration::from_millis(self.quiet_period_ms)
    }
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            paths: Vec::new(),
            excludes: Vec::new(),
            quiet_period_ms: default_quiet_period_ms(),
            event_buffer: default_event_buffer(),
            output_buffer: default_output_buffer(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Config {
    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.watch.paths.is_empty() {
            return Err(Error::config(
                "watch.paths must name at least one path".to_string(),
            ));
        }

        if self.watch.quiet_period_ms == 0 {
            return Err(Error::config(
                "watch.quiet_period_ms must be greater than 0".to_string(),
            ));
        }

        if self.watch.event_buffer == 0 {
            return Err(Error::config(
                "watch.event_buffer must be greater than 0".to_string(),
            ));
        }

        if self.watch.output_buffer == 0 {
            return Err(Error::config(
                "watch.output_buffer must be greater than 0".to_string(),
            ));
        }

        let level = self.logging.level.to_lowercase();
        if !VALID_LOG_LEVELS.contains(&level.as_str()) {
            return Err(Error::config(format!(
                "Invalid log level '{}'. Must be one of: {:?}",
                self.logging.level, VALID_LOG_LEVELS
            )));
        }

        Ok(())
    }
}
