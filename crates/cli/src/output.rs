//! Rendering change sets for stdout

use anyhow::{Context, Result};
use modwatch_watcher::Mod;
use std::path::PathBuf;

/// How change sets are written
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// One `Label: [paths]` line per non-empty category
    #[default]
    Text,
    /// One JSON object per change set
    Json,
}

/// Render a change set, newline terminated
///
/// Empty categories produce no text line.
pub fn format_mod(change: &Mod, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => Ok(format_text(change)),
        OutputFormat::Json => {
            let json = serde_json::to_string(change).context("Failed to serialize change set")?;
            Ok(format!("{json}\n"))
        }
    }
}

fn format_text(change: &Mod) -> String {
    let mut out = String::new();
    for (label, paths) in [
        ("Added", &change.added),
        ("Changed", &change.changed),
        ("Removed", &change.deleted),
    ] {
        if !paths.is_empty() {
            out.push_str(&format!("{label}: [{}]\n", join_paths(paths)));
        }
    }
    out
}

fn join_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(" ")
}
