//! Library interface for the modwatch CLI
//!
//! This module exposes the output formatting for testing while keeping the
//! main binary logic in main.rs.

pub mod output;

pub use output::{format_mod, OutputFormat};
