//! Exclusion filtering of reported paths
//!
//! Patterns use glob syntax and are tested against a path as a whole and
//! against each of its components, so `*.swp` excludes a swap file at any
//! depth and `.git` excludes everything inside a `.git` directory. The
//! session hands in the part of each path below its watch root, so the
//! components of the root itself never match.

use crate::changes::Mod;
use glob::{Pattern, PatternError};
use std::path::Path;
use std::sync::Arc;
use tracing::trace;

/// Drops excluded paths from change sets
///
/// By default, excludes nothing.
#[derive(Debug, Clone, Default)]
pub struct ExcludeFilter {
    /// Glob patterns to exclude
    patterns: Arc<Vec<Pattern>>,
}

impl ExcludeFilter {
    /// Create a filter that excludes nothing
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a filter from glob patterns
    pub fn from_patterns<S: AsRef<str>>(patterns: &[S]) -> Result<Self, PatternError> {
        Self::builder()
            .patterns(patterns.iter().map(|p| p.as_ref().to_string()).collect())
            .build()
    }

    /// Create with builder pattern
    pub fn builder() -> ExcludeFilterBuilder {
        ExcludeFilterBuilder::default()
    }

    /// True when no pattern is configured
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Check if a path should be excluded
    pub fn is_excluded(&self, path: &Path) -> bool {
        let path_str = path.to_string_lossy();
        if self.patterns.iter().any(|p| p.matches(&path_str)) {
            trace!("Excluding {:?} by pattern", path);
            return true;
        }

        for component in path.components() {
            let name = component.as_os_str().to_string_lossy();
            if self.patterns.iter().any(|p| p.matches(&name)) {
                trace!("Excluding {:?} by component {:?}", path, name);
                return true;
            }
        }

        false
    }

    /// Remove excluded paths from every category
    pub fn apply(&self, changes: &Mod) -> Mod {
        self.apply_by(changes, |p| p)
    }

    /// Remove paths whose `key` is excluded
    ///
    /// `key` picks the part of each path the patterns are tested against.
    pub fn apply_by<F>(&self, changes: &Mod, key: F) -> Mod
    where
        F: for<'p> Fn(&'p Path) -> &'p Path,
    {
        if self.is_empty() {
            return changes.clone();
        }
        changes.retain_paths(|p| !self.is_excluded(key(p.as_path())))
    }
}

/// Builder for ExcludeFilter
#[derive(Debug, Default)]
pub struct ExcludeFilterBuilder {
    patterns: Vec<String>,
}

impl ExcludeFilterBuilder {
    /// Add a glob pattern to exclude
    pub fn add_pattern(mut self, pattern: String) -> Self {
        self.patterns.push(pattern);
        self
    }

    /// Add multiple patterns
    pub fn patterns(mut self, patterns: Vec<String>) -> Self {
        self.patterns.extend(patterns);
        self
    }

    /// Build the filter, compiling every pattern
    pub fn build(self) -> Result<ExcludeFilter, PatternError> {
        let compiled_patterns = self
            .patterns
            .iter()
            .map(|p| Pattern::new(p))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(ExcludeFilter {
            patterns: Arc::new(compiled_patterns),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::path::PathBuf;

    fn paths(items: &[&str]) -> Vec<PathBuf> {
        items.iter().map(PathBuf::from).collect()
    }

    #[test]
    fn test_exclude_filter_patterns() {
        let filter = ExcludeFilter::builder()
            .add_pattern("*.log".to_string())
            .add_pattern("**/target/**".to_string())
            .build()
            .expect("test setup failed");

        assert!(filter.is_excluded(Path::new("debug.log")));
        assert!(filter.is_excluded(Path::new("nested/dir/debug.log")));
        assert!(filter.is_excluded(Path::new("path/to/target/debug/app")));
        assert!(!filter.is_excluded(Path::new("main.rs")));
    }

    #[test]
    fn test_component_match_excludes_directory_contents() {
        let filter = ExcludeFilter::from_patterns(&[".git"]).expect("test setup failed");

        assert!(filter.is_excluded(Path::new(".git/index")));
        assert!(filter.is_excluded(Path::new("sub/.git/HEAD")));
        assert!(!filter.is_excluded(Path::new(".gitignore")));
    }

    #[test]
    fn test_invalid_pattern_rejected() {
        let result = ExcludeFilter::from_patterns(&["[unclosed"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_empty_filter_keeps_everything() {
        let filter = ExcludeFilter::new();
        assert!(filter.is_empty());

        let m = Mod::new(paths(&["a", "b"]), paths(&["c"]), paths(&["d"]));
        assert_eq!(filter.apply(&m), m);
    }

    #[test]
    fn test_apply_filters_every_category() {
        let filter = ExcludeFilter::from_patterns(&["*.swp", "*~"]).expect("test setup failed");
        let m = Mod::new(
            paths(&["a.txt", ".a.txt.swp"]),
            paths(&["b.txt", "b.txt~"]),
            paths(&["dir/c.swp", "c.txt"]),
        );

        assert_eq!(
            filter.apply(&m),
            Mod::new(paths(&["a.txt"]), paths(&["b.txt"]), paths(&["c.txt"]))
        );
    }

    #[test]
    fn test_apply_by_tests_only_the_key() {
        let filter = ExcludeFilter::from_patterns(&[".*"]).expect("test setup failed");
        let m = Mod::new(
            Vec::new(),
            paths(&["/home/u/.work/app/main.rs", "/home/u/.work/app/.main.rs.swp"]),
            Vec::new(),
        );

        // Whole paths all contain a hidden component
        assert!(filter.apply(&m).is_empty());

        assert_eq!(
            filter.apply_by(&m, |p| p.strip_prefix("/home/u/.work/app").unwrap_or(p)),
            Mod::new(Vec::new(), paths(&["/home/u/.work/app/main.rs"]), Vec::new())
        );
    }
}
