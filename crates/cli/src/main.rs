//! modwatch - debounced file change reporting
//!
//! This binary watches files and directories and prints one reconciled
//! change set per burst of activity.

#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]

use anyhow::{Context, Result};
use clap::Parser;
use modwatch::{format_mod, OutputFormat};
use modwatch_core::config::Config;
use modwatch_watcher::{WatchSession, WatcherConfig};
use std::io::Write;
use std::path::PathBuf;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "modwatch")]
#[command(about = "Watch paths and report added, changed and removed files")]
#[command(version)]
struct Cli {
    /// Files or directories to watch (defaults to the configured paths)
    #[arg(value_name = "PATH")]
    paths: Vec<PathBuf>,

    /// Glob pattern to exclude; may be repeated
    #[arg(short = 'x', long = "exclude", value_name = "GLOB")]
    excludes: Vec<String>,

    /// Quiet period in milliseconds before a burst is reported
    #[arg(short, long, value_name = "MS")]
    quiet_period: Option<u64>,

    /// Configuration file path
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Print each change set as a JSON line
    #[arg(long)]
    json: bool,
}

impl Cli {
    fn output_format(&self) -> OutputFormat {
        if self.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }

    /// Overlay command-line values on the loaded configuration
    fn apply_to(&self, config: &mut Config) {
        if !self.paths.is_empty() {
            config.watch.paths = self.paths.clone();
        }
        config.watch.excludes.extend(self.excludes.iter().cloned());
        if let Some(ms) = self.quiet_period {
            config.watch.quiet_period_ms = ms;
        }
        if self.verbose {
            config.logging.level = "debug".to_string();
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = Config::load(cli.config.as_deref()).context("Failed to load configuration")?;
    cli.apply_to(&mut config);
    config.validate().context("Invalid configuration")?;

    init_logging(&config.logging.level);
    debug!("Effective configuration: {:?}", config);

    watch(&config, cli.output_format()).await
}

/// Initialize logging system
///
/// `RUST_LOG` takes precedence over the configured level. Logs go to stderr
/// so stdout carries only change sets.
fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "{}={level},modwatch_watcher={level},modwatch_core={level}",
            env!("CARGO_PKG_NAME")
        ))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Run a session until Ctrl-C or until it stops on its own
async fn watch(config: &Config, format: OutputFormat) -> Result<()> {
    let logger = tracing::dispatcher::get_default(|dispatch| dispatch.clone());
    let (handle, mut changes) = WatchSession::new(WatcherConfig::from(&config.watch))?
        .with_logger(logger)
        .watch()
        .context("Failed to start watching")?;

    let cancel = handle.cancellation_token();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Interrupted, shutting down");
                cancel.cancel();
            }
            Err(e) => warn!("Failed to listen for Ctrl-C: {}", e),
        }
    });

    while let Some(change) = changes.recv().await {
        let rendered = format_mod(&change, format)?;
        let mut stdout = std::io::stdout().lock();
        stdout
            .write_all(rendered.as_bytes())
            .context("Failed to write to stdout")?;
        stdout.flush().context("Failed to write to stdout")?;
    }

    handle.shutdown().await?;
    Ok(())
}
