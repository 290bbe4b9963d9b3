#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]

//! Debounced, reconciled file change notifications
//!
//! This crate turns the noisy stream of OS file notifications into a
//! sequence of clean change sets:
//! - Bursts are batched until a quiet period passes with no new event
//! - Renames, spurious creates and removes, and temporary files are resolved
//!   against what actually exists on disk
//! - Paths are reported relative to the watched roots, minus exclusions
//!
//! # Example
//!
//! ```no_run
//! use modwatch_watcher::{WatchSession, WatcherConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = WatcherConfig::builder()
//!     .path("/path/to/project")
//!     .exclude("*.swp")
//!     .build();
//! let (handle, mut changes) = WatchSession::new(config)?.watch()?;
//!
//! while let Some(change) = changes.recv().await {
//!     println!("Added: {:?}", change.added);
//! }
//! handle.shutdown().await?;
//! # Ok(())
//! # }
//! ```

mod changes;
mod config;
mod debouncer;
mod events;
mod exists;
mod ignore;
mod normalize;
mod reconcile;
mod watcher;

pub use changes::Mod;
pub use config::{WatcherConfig, WatcherConfigBuilder};
pub use debouncer::{Cycle, CycleEnd, EventDebouncer, PendingChanges};
pub use events::{RawEvent, RawEventKind};
pub use exists::{ExistenceChecker, StatChecker};
pub use ignore::{ExcludeFilter, ExcludeFilterBuilder};
pub use normalize::{is_under, PathNormalizer, ResolvedRoots};
pub use reconcile::Reconciler;
pub use watcher::{WatchHandle, WatchSession};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::changes::Mod;
    pub use crate::config::WatcherConfig;
    pub use crate::watcher::{WatchHandle, WatchSession};
}
