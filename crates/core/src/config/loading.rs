//! Configuration loading from files and environment variables

use crate::error::{Error, Result};
use config::{Config as ConfigLib, ConfigBuilder as LibConfigBuilder, Environment, File};
use std::path::Path;

use super::defaults::*;
use super::{global_config_path, Config};

/// Helper to set a config default with consistent error mapping
fn set_config_default<T: Into<config::Value>>(
    builder: LibConfigBuilder<config::builder::DefaultState>,
    key: &str,
    value: T,
) -> Result<LibConfigBuilder<config::builder::DefaultState>> {
    builder
        .set_default(key, value)
        .map_err(|e| Error::config(format!("Failed to set {key} default: {e}")))
}

impl Config {
    /// Loads configuration from a TOML file with environment variable overrides
    ///
    /// Environment variables are prefixed with `MODWATCH_` and use double underscores
    /// for nested values. List values are comma separated. For example:
    /// - `MODWATCH_WATCH__QUIET_PERIOD_MS=500`
    /// - `MODWATCH_WATCH__EXCLUDES=*.swp,*~`
    pub fn from_file(path: &Path) -> Result<Self> {
        let builder = ConfigLib::builder();

        let builder = set_config_default(
            builder,
            "watch.quiet_period_ms",
            default_quiet_period_ms() as i64,
        )?;
        let builder =
            set_config_default(builder, "watch.event_buffer", default_event_buffer() as i64)?;
        let builder = set_config_default(
            builder,
            "watch.output_buffer",
            default_output_buffer() as i64,
        )?;
        let mut builder = set_config_default(builder, "logging.level", default_log_level())?;

        // The file is optional; a missing global config is the common case
        if path.exists() {
            builder = builder.add_source(File::from(path));
        }

        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("watch.paths")
                .with_list_parse_key("watch.excludes")
                .try_parsing(true),
        );

        let config = builder
            .build()
            .map_err(|e| Error::config(format!("Failed to build config: {e}")))?;

        config
            .try_deserialize()
            .map_err(|e| Error::config(format!("Failed to deserialize config: {e}")))
    }

    /// Creates a config from a TOML string (useful for testing)
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::config(format!("Failed to parse TOML: {e}")))
    }

    /// Load configuration
    ///
    /// Precedence (lowest to highest):
    /// 1. Hardcoded defaults
    /// 2. Config file (~/.modwatch/config.toml or custom --config path)
    /// 3. Environment variables (MODWATCH_*)
    ///
    /// Command-line flags are applied on top by the caller.
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        let path = match config_path {
            Some(p) => {
                if !p.exists() {
                    return Err(Error::config(format!(
                        "Config file not found: {}",
                        p.display()
                    )));
                }
                p.to_path_buf()
            }
            None => global_config_path()?,
        };
        tracing::debug!("Loading configuration from {}", path.display());
        Self::from_file(&path)
    }
}
