//! Watch session: event source, control loop and shutdown
//!
//! A session owns the OS watcher, runs one task that alternates between
//! collecting a cycle and emitting its resolved change set, and stops on
//! cancellation, when the event source closes, or when the consumer drops
//! its receiver.

use crate::{
    changes::Mod,
    config::WatcherConfig,
    debouncer::{CycleEnd, EventDebouncer},
    events::RawEvent,
    exists::{ExistenceChecker, StatChecker},
    ignore::ExcludeFilter,
    normalize::PathNormalizer,
    reconcile::Reconciler,
};
use modwatch_core::error::{Error, Result};
use notify::{
    Config as NotifyConfig, Event as NotifyEvent, RecommendedWatcher, RecursiveMode,
    Watcher as NotifyWatcher,
};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::instrument::WithSubscriber;
use tracing::{debug, dispatcher, info, trace, warn, Dispatch};

/// A configured, not yet running, watch session
pub struct WatchSession {
    /// Configuration
    config: Arc<WatcherConfig>,
    /// Compiled exclusion patterns
    exclude_filter: ExcludeFilter,
    /// Root-relative path rewriting
    normalizer: PathNormalizer,
    /// Ground truth for resolution
    checker: Arc<dyn ExistenceChecker>,
    /// Where diagnostics go; discards everything unless replaced
    logger: Dispatch,
    /// Cancellation token for stopping the session
    cancellation_token: CancellationToken,
}

impl WatchSession {
    /// Create a session from configuration
    ///
    /// Fails if the configuration is invalid or an exclusion pattern does
    /// not compile.
    pub fn new(config: WatcherConfig) -> Result<Self> {
        config.validate()?;

        let exclude_filter = ExcludeFilter::from_patterns(&config.excludes)
            .map_err(|e| Error::config(format!("Invalid exclude pattern: {e}")))?;
        let normalizer = PathNormalizer::new(config.paths.clone());

        Ok(Self {
            config: Arc::new(config),
            exclude_filter,
            normalizer,
            checker: Arc::new(StatChecker),
            logger: Dispatch::default(),
            cancellation_token: CancellationToken::new(),
        })
    }

    /// Send diagnostics to `logger` instead of discarding them
    pub fn with_logger(mut self, logger: impl Into<Dispatch>) -> Self {
        self.logger = logger.into();
        self
    }

    /// Replace the on-disk existence check used during resolution
    pub fn with_existence_checker(mut self, checker: impl ExistenceChecker + 'static) -> Self {
        self.checker = Arc::new(checker);
        self
    }

    /// Token that stops the session when cancelled
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancellation_token.clone()
    }

    /// Configuration the session was built from
    pub fn config(&self) -> &WatcherConfig {
        &self.config
    }

    /// Register every root with the OS watcher and start the session
    ///
    /// Must be called from within a Tokio runtime. A root that cannot be
    /// read or registered fails the whole call and nothing keeps running.
    pub fn watch(self) -> Result<(WatchHandle, mpsc::Receiver<Mod>)> {
        let (events_tx, events_rx) = mpsc::channel(self.config.event_buffer);
        let logger = self.logger.clone();
        let watcher = dispatcher::with_default(&logger, || self.register_roots(events_tx))?;

        let (mut handle, changes) = self.spawn(events_rx);
        handle.watcher = Some(watcher);
        Ok((handle, changes))
    }

    /// Start the session on an externally supplied event source
    ///
    /// The session ends once every sender of `events` is dropped.
    pub fn spawn(self, events: mpsc::Receiver<RawEvent>) -> (WatchHandle, mpsc::Receiver<Mod>) {
        let (changes_tx, changes_rx) = mpsc::channel(self.config.output_buffer);
        let cancellation_token = self.cancellation_token.clone();
        let logger = self.logger.clone();

        let session_loop = SessionLoop {
            debouncer: EventDebouncer::new(self.config.quiet_period()),
            reconciler: Reconciler::new(self.checker).with_logger(self.logger.clone()),
            normalizer: self.normalizer,
            exclude_filter: self.exclude_filter,
            output: changes_tx,
            cancel: cancellation_token.clone(),
            roots: self.config.paths.len(),
        };
        let task = tokio::spawn(session_loop.run(events).with_subscriber(logger));

        (
            WatchHandle {
                watcher: None,
                task,
                cancellation_token,
            },
            changes_rx,
        )
    }

    fn register_roots(&self, tx: mpsc::Sender<RawEvent>) -> Result<RecommendedWatcher> {
        let mut registrations = Vec::with_capacity(self.config.paths.len());
        for root in &self.config.paths {
            let metadata =
                std::fs::metadata(root).map_err(|e| Error::watch_root(root.clone(), e))?;
            let absolute =
                std::path::absolute(root).map_err(|e| Error::watch_root(root.clone(), e))?;
            let mode = if metadata.is_dir() {
                RecursiveMode::Recursive
            } else {
                RecursiveMode::NonRecursive
            };
            registrations.push((absolute, mode));
        }

        let mut watcher = self.create_notify_watcher(tx)?;
        for (path, mode) in registrations {
            watcher
                .watch(&path, mode)
                .map_err(|e| Error::watcher(format!("Failed to watch path {path:?}: {e}")))?;
            info!(
                "Watching path: {:?} (recursive: {})",
                path,
                matches!(mode, RecursiveMode::Recursive)
            );
        }
        Ok(watcher)
    }

    fn create_notify_watcher(&self, tx: mpsc::Sender<RawEvent>) -> Result<RecommendedWatcher> {
        let logger = self.logger.clone();
        RecommendedWatcher::new(
            move |res: std::result::Result<NotifyEvent, notify::Error>| {
                dispatcher::with_default(&logger, || forward_notify_event(res, &tx))
            },
            NotifyConfig::default(),
        )
        .map_err(|e| Error::watcher(format!("Failed to create watcher: {e}")))
    }
}

/// Push one notify callback result into the session channel without blocking
fn forward_notify_event(
    res: std::result::Result<NotifyEvent, notify::Error>,
    tx: &mpsc::Sender<RawEvent>,
) {
    let event = match res {
        Ok(event) => event,
        Err(e) => {
            warn!("Notify error: {}", e);
            return;
        }
    };

    for raw in RawEvent::from_notify(event) {
        match tx.try_send(raw) {
            Ok(()) => {}
            Err(TrySendError::Full(dropped)) => {
                warn!("Event queue full, dropping {}", dropped);
            }
            // The session has stopped; nothing left to deliver to
            Err(TrySendError::Closed(_)) => return,
        }
    }
}

/// State owned by the session task
struct SessionLoop {
    debouncer: EventDebouncer,
    reconciler: Reconciler,
    normalizer: PathNormalizer,
    exclude_filter: ExcludeFilter,
    output: mpsc::Sender<Mod>,
    cancel: CancellationToken,
    roots: usize,
}

impl SessionLoop {
    async fn run(self, mut events: mpsc::Receiver<RawEvent>) {
        info!(
            "Watch session started ({} roots, quiet period {:?})",
            self.roots,
            self.debouncer.quiet_period()
        );

        let mut cycles: u64 = 0;
        loop {
            let cycle = self.debouncer.next_cycle(&mut events, &self.cancel).await;
            let end = cycle.end;
            if end == CycleEnd::Cancelled {
                debug!("Cancelled, discarding {} pending events", cycle.event_count);
                break;
            }
            cycles += 1;

            let changes = self.post_process(self.reconciler.resolve(cycle.pending));
            if changes.is_empty() {
                trace!("Cycle {} produced no changes", cycles);
            } else {
                debug!(
                    "Cycle {}: {} events resolved to {} changes",
                    cycles,
                    cycle.event_count,
                    changes.len()
                );
                tokio::select! {
                    biased;
                    _ = self.cancel.cancelled() => break,
                    sent = self.output.send(changes) => {
                        if sent.is_err() {
                            debug!("Change receiver dropped");
                            break;
                        }
                    }
                }
            }

            if end == CycleEnd::SourceClosed {
                debug!("Event source closed");
                break;
            }
        }

        info!("Watch session stopped after {} cycles", cycles);
    }

    /// Filter on the part of each path below its root, then normalize
    ///
    /// If the roots cannot be resolved the absolute paths are reported,
    /// filtered against the roots as given.
    fn post_process(&self, resolved: Mod) -> Mod {
        match self.normalizer.resolve() {
            Ok(roots) => {
                let kept = self
                    .exclude_filter
                    .apply_by(&resolved, |p| roots.below_root(p));
                roots.normalize(&kept)
            }
            Err(e) => {
                warn!("Failed to normalize paths, reporting them unchanged: {}", e);
                self.exclude_filter
                    .apply_by(&resolved, |p| self.normalizer.below_root_lexically(p))
            }
        }
    }
}

/// Controls a running session
pub struct WatchHandle {
    /// Active notify watcher; dropping it stops OS notifications
    watcher: Option<RecommendedWatcher>,
    task: JoinHandle<()>,
    cancellation_token: CancellationToken,
}

impl WatchHandle {
    /// Request the session to stop without waiting for it
    pub fn cancel(&self) {
        self.cancellation_token.cancel();
    }

    /// Token shared with the session; cancelling it has the same effect as
    /// [`WatchHandle::cancel`]
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancellation_token.clone()
    }

    /// True once the session task has exited
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Stop the session and wait for its task to exit
    ///
    /// Pending, unresolved events are discarded. The change receiver yields
    /// `None` afterwards.
    pub async fn shutdown(self) -> Result<()> {
        let Self {
            watcher,
            task,
            cancellation_token,
        } = self;

        cancellation_token.cancel();
        drop(watcher);
        task.await
            .map_err(|e| Error::watcher(format!("Watch session task failed: {e}")))
    }
}

impl std::fmt::Debug for WatchHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatchHandle")
            .field("os_watcher", &self.watcher.is_some())
            .field("finished", &self.task.is_finished())
            .finish()
    }
}
