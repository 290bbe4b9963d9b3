//! Resolution of ambiguous raw reports into a disjoint change set
//!
//! Notification sources disagree across platforms: renames arrive without
//! pairing, create and remove are reported spuriously, and short-lived
//! temporary files produce events whose net effect is nothing. Current
//! on-disk existence is treated as ground truth. The rules run in a fixed
//! order and each one sees the mutations of the previous:
//!
//! 1. A renamed path that exists is the destination of a move and counts as
//!    added; one that does not exist is the vacated source and counts as
//!    removed.
//! 2. An added path that exists wins over any change or removal report. An
//!    added path that does not exist is struck from every set.
//! 3. A removed path that exists was not really removed. A removed path that
//!    does not exist wins over any remaining add or change report.

use crate::changes::Mod;
use crate::debouncer::PendingChanges;
use crate::exists::{ExistenceChecker, StatChecker};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, dispatcher, trace, Dispatch};

/// Turns one cycle of pending reports into a [`Mod`]
#[derive(Clone)]
pub struct Reconciler {
    checker: Arc<dyn ExistenceChecker>,
    logger: Dispatch,
}

impl Default for Reconciler {
    fn default() -> Self {
        Self::new(Arc::new(StatChecker))
    }
}

impl Reconciler {
    /// Create a resolver backed by `checker`, logging nowhere
    pub fn new(checker: Arc<dyn ExistenceChecker>) -> Self {
        Self {
            checker,
            logger: Dispatch::default(),
        }
    }

    /// Route this resolver's diagnostics to `logger`
    pub fn with_logger(mut self, logger: Dispatch) -> Self {
        self.logger = logger;
        self
    }

    /// Resolve pending reports against the current state of the disk
    pub fn resolve(&self, pending: PendingChanges) -> Mod {
        dispatcher::with_default(&self.logger, || self.resolve_inner(pending))
    }

    fn resolve_inner(&self, pending: PendingChanges) -> Mod {
        let PendingChanges {
            mut added,
            mut removed,
            mut changed,
            renamed,
        } = pending;
        let mut probe = Probe::new(self.checker.as_ref());

        for path in renamed {
            if probe.exists(&path) {
                added.insert(path);
            } else {
                removed.insert(path);
            }
        }

        added.retain(|path| {
            if probe.exists(path) {
                changed.remove(path);
                removed.remove(path);
                true
            } else {
                debug!("Dropping transient path {}", path.display());
                removed.remove(path);
                changed.remove(path);
                false
            }
        });

        removed.retain(|path| {
            if probe.exists(path) {
                false
            } else {
                added.remove(path);
                changed.remove(path);
                true
            }
        });

        let resolved = Mod::new(added, changed, removed);
        trace!(
            "Resolved {} added, {} changed, {} deleted ({} existence checks)",
            resolved.added.len(),
            resolved.changed.len(),
            resolved.deleted.len(),
            probe.len()
        );
        resolved
    }
}

/// Memoized existence answers for a single resolution
struct Probe<'a> {
    checker: &'a dyn ExistenceChecker,
    seen: HashMap<PathBuf, bool>,
}

impl<'a> Probe<'a> {
    fn new(checker: &'a dyn ExistenceChecker) -> Self {
        Self {
            checker,
            seen: HashMap::new(),
        }
    }

    fn exists(&mut self, path: &Path) -> bool {
        if let Some(&known) = self.seen.get(path) {
            return known;
        }
        let found = self.checker.exists(path);
        self.seen.insert(path.to_path_buf(), found);
        found
    }

    fn len(&self) -> usize {
        self.seen.len()
    }
}
