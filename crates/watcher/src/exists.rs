//! Existence checks used as ground truth during resolution

use std::path::Path;

/// Answers whether a path currently exists
///
/// Implementations have no error channel: any I/O failure is reported as
/// "does not exist".
pub trait ExistenceChecker: Send + Sync {
    /// Check whether `path` exists right now
    fn exists(&self, path: &Path) -> bool;
}

/// Checks existence with a `stat` call, following symlinks
#[derive(Debug, Clone, Copy, Default)]
pub struct StatChecker;

impl ExistenceChecker for StatChecker {
    fn exists(&self, path: &Path) -> bool {
        std::fs::metadata(path).is_ok()
    }
}

impl<F> ExistenceChecker for F
where
    F: Fn(&Path) -> bool + Send + Sync,
{
    fn exists(&self, path: &Path) -> bool {
        self(path)
    }
}
