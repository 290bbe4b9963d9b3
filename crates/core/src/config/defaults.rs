//! Default values and functions for configuration

// Default constants
pub(crate) const DEFAULT_LOG_LEVEL: &str = "info";
pub(crate) const ENV_PREFIX: &str = "MODWATCH";

/// Log levels accepted by `logging.level`
pub(crate) const VALID_LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

pub(crate) fn default_quiet_period_ms() -> u64 {
    200
}

pub(crate) fn default_event_buffer() -> usize {
    1024
}

pub(crate) fn default_output_buffer() -> usize {
    1
}

pub(crate) fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}
