//! Configuration types for a watch session
//!
//! This module provides the immutable configuration a [`WatchSession`] is
//! built from, with a builder and a conversion from the file-level
//! configuration in `modwatch-core`.
//!
//! [`WatchSession`]: crate::WatchSession

use modwatch_core::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Immutable configuration for a watch session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatcherConfig {
    /// Roots to watch; directories are watched recursively
    pub paths: Vec<PathBuf>,
    /// Glob patterns excluded from reports
    pub excludes: Vec<String>,
    /// Quiet period in milliseconds (default: 200ms)
    pub quiet_period_ms: u64,
    /// Raw event channel capacity (default: 1024)
    pub event_buffer: usize,
    /// Change set channel capacity (default: 1)
    pub output_buffer: usize,
}

impl WatcherConfig {
    /// Create configuration from builder
    pub fn builder() -> WatcherConfigBuilder {
        WatcherConfigBuilder::default()
    }

    /// Get the quiet period
    pub fn quiet_period(&self) -> Duration {
        Duration::from_millis(self.quiet_period_ms)
    }

    /// Check the values a session cannot run without
    pub fn validate(&self) -> Result<()> {
        if self.paths.is_empty() {
            return Err(Error::invalid_input("at least one path must be watched"));
        }
        if self.quiet_period_ms == 0 {
            return Err(Error::invalid_input("quiet period must be greater than 0"));
        }
        if self.event_buffer == 0 || self.output_buffer == 0 {
            return Err(Error::invalid_input("channel capacities must be greater than 0"));
        }
        Ok(())
    }
}

impl Default for WatcherConfig {
    fn default() -> Self {
        Self {
            paths: Vec::new(),
            excludes: Vec::new(),
            quiet_period_ms: 200,
            event_buffer: 1024,
            output_buffer: 1,
        }
    }
}

impl From<&modwatch_core::WatchConfig> for WatcherConfig {
    fn from(config: &modwatch_core::WatchConfig) -> Self {
        Self {
            paths: config.paths.clone(),
            excludes: config.excludes.clone(),
            quiet_period_ms: config.quiet_period_ms,
            event_buffer: config.event_buffer,
            output_buffer: config.output_buffer,
        }
    }
}

/// Builder for WatcherConfig
#[derive(Debug, Default)]
pub struct WatcherConfigBuilder {
    config: WatcherConfig,
}

impl WatcherConfigBuilder {
    /// Add a root to watch
    pub fn path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.paths.push(path.into());
        self
    }

    /// Set the roots to watch
    pub fn paths(mut self, paths: Vec<PathBuf>) -> Self {
        self.config.paths = paths;
        self
    }

    /// Add an exclusion pattern
    pub fn exclude(mut self, pattern: impl Into<String>) -> Self {
        self.config.excludes.push(pattern.into());
        self
    }

    /// Set exclusion patterns
    pub fn excludes(mut self, patterns: Vec<String>) -> Self {
        self.config.excludes = patterns;
        self
    }

    /// Set the quiet period in milliseconds
    pub fn quiet_period_ms(mut self, ms: u64) -> Self {
        self.config.quiet_period_ms = ms;
        self
    }

    /// Set the raw event channel capacity
    pub fn event_buffer(mut self, size: usize) -> Self {
        self.config.event_buffer = size;
        self
    }

    /// Set the change set channel capacity
    pub fn output_buffer(mut self, size: usize) -> Self {
        self.config.output_buffer = size;
        self
    }

    /// Build the configuration
    pub fn build(self) -> WatcherConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_watcher_config_builder() {
        let config = WatcherConfig::builder()
            .path("src")
            .path("Cargo.toml")
            .exclude("*.swp")
            .quiet_period_ms(50)
            .event_buffer(16)
            .build();

        assert_eq!(
            config.paths,
            vec![PathBuf::from("src"), PathBuf::from("Cargo.toml")]
        );
        assert_eq!(config.excludes, vec!["*.swp".to_string()]);
        assert_eq!(config.quiet_period(), Duration::from_millis(50));
        assert_eq!(config.event_buffer, 16);
        assert_eq!(config.output_buffer, 1);
    }

    #[test]
    fn test_defaults() {
        let config = WatcherConfig::default();
        assert_eq!(config.quiet_period(), Duration::from_millis(200));
        assert_eq!(config.event_buffer, 1024);
    }

    #[test]
    fn test_validate() {
        assert!(WatcherConfig::default().validate().is_err());
        assert!(WatcherConfig::builder().path(".").build().validate().is_ok());
        assert!(WatcherConfig::builder()
            .path(".")
            .quiet_period_ms(0)
            .build()
            .validate()
            .is_err());
        assert!(WatcherConfig::builder()
            .path(".")
            .event_buffer(0)
            .build()
            .validate()
            .is_err());
    }

    #[test]
    fn test_from_core_config() {
        let core = modwatch_core::WatchConfig {
            paths: vec![PathBuf::from("/repo")],
            excludes: vec!["*.tmp".to_string()],
            quiet_period_ms: 300,
            event_buffer: 8,
            output_buffer: 2,
        };

        let config = WatcherConfig::from(&core);
        assert_eq!(config.paths, core.paths);
        assert_eq!(config.excludes, core.excludes);
        assert_eq!(config.quiet_period_ms, 300);
        assert_eq!(config.event_buffer, 8);
        assert_eq!(config.output_buffer, 2);
    }
}
