//! Reconciled change sets
//!
//! A [`Mod`] is the net summary of one debounce cycle. Each category is kept
//! sorted and duplicate-free so output is deterministic.

use serde::Serialize;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// Net filesystem changes observed during one debounce cycle
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Mod {
    /// Paths newly present
    pub added: Vec<PathBuf>,
    /// Paths modified in place
    pub changed: Vec<PathBuf>,
    /// Paths no longer present
    pub deleted: Vec<PathBuf>,
}

impl Mod {
    /// Build a change set from unordered collections
    pub fn new<A, C, D>(added: A, changed: C, deleted: D) -> Self
    where
        A: IntoIterator<Item = PathBuf>,
        C: IntoIterator<Item = PathBuf>,
        D: IntoIterator<Item = PathBuf>,
    {
        Self {
            added: sorted_unique(added),
            changed: sorted_unique(changed),
            deleted: sorted_unique(deleted),
        }
    }

    /// All paths touched in any category, sorted and deduplicated
    pub fn all(&self) -> Vec<PathBuf> {
        sorted_unique(
            self.added
                .iter()
                .chain(&self.changed)
                .chain(&self.deleted)
                .cloned(),
        )
    }

    /// True when nothing was added, changed or deleted
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.changed.is_empty() && self.deleted.is_empty()
    }

    /// Total number of entries across the three categories
    pub fn len(&self) -> usize {
        self.added.len() + self.changed.len() + self.deleted.len()
    }

    /// Rewrite every path, re-sorting afterwards
    pub(crate) fn map_paths<F>(&self, mut f: F) -> Self
    where
        F: FnMut(&Path) -> PathBuf,
    {
        let mut map = |paths: &[PathBuf]| -> Vec<PathBuf> {
            paths.iter().map(|p| f(p.as_path())).collect()
        };
        Self::new(map(&self.added), map(&self.changed), map(&self.deleted))
    }

    /// Keep only the paths accepted by `keep`
    pub(crate) fn retain_paths<F>(&self, mut keep: F) -> Self
    where
        F: FnMut(&PathBuf) -> bool,
    {
        let mut pick = |paths: &[PathBuf]| -> Vec<PathBuf> {
            paths.iter().filter(|&p| keep(p)).cloned().collect()
        };
        Self {
            added: pick(&self.added),
            changed: pick(&self.changed),
            deleted: pick(&self.deleted),
        }
    }
}

fn sorted_unique(paths: impl IntoIterator<Item = PathBuf>) -> Vec<PathBuf> {
    paths
        .into_iter()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
