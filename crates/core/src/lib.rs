//! Core types for the modwatch change reporter
//!
//! This crate provides the foundations shared by the watcher engine and the
//! command-line front end:
//!
//! - **Configuration**: layered loading from defaults, TOML and environment
//! - **Error handling**: unified error type and result alias
//!

pub mod config;
pub mod error;

// Re-export main types for convenience
pub use config::{Config, LoggingConfig, WatchConfig};
pub use error::{Error, Result, ResultExt};

/// Version of the core library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::config::Config;
    pub use crate::error::{Result, ResultExt};
}
