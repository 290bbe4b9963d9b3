//! Rewriting absolute event paths relative to the watch roots

use crate::changes::Mod;
use modwatch_core::error::{Error, Result};
use std::path::{Component, Path, PathBuf};

/// True if `child` is `parent` or lies below it
///
/// Compares whole path components, so `/repo` is not a parent of
/// `/repository`.
pub fn is_under(parent: &Path, child: &Path) -> bool {
    child.starts_with(parent)
}

/// Maps absolute paths back onto the roots the caller asked to watch
///
/// With a single root, paths are reported relative to it. With several,
/// each path is the root as given joined with the relative remainder so
/// results stay unambiguous. Paths outside every root pass through.
#[derive(Debug, Clone)]
pub struct PathNormalizer {
    roots: Vec<PathBuf>,
}

impl PathNormalizer {
    /// Create a normalizer for the given roots, in priority order
    pub fn new(roots: Vec<PathBuf>) -> Self {
        Self { roots }
    }

    /// Normalize every path in a change set
    pub fn normalize(&self, changes: &Mod) -> Result<Mod> {
        Ok(self.resolve()?.normalize(changes))
    }

    /// Absolute and canonical forms of each root
    ///
    /// Resolved on every call: a relative root depends on the current
    /// directory, which can disappear while the session runs.
    pub fn resolve(&self) -> Result<ResolvedRoots<'_>> {
        let bases = self
            .roots
            .iter()
            .map(|root| {
                let absolute = std::path::absolute(root).map_err(|e| {
                    Error::with_context(format!("Failed to resolve {}", root.display()), e)
                })?;
                let absolute = lexically_clean(&absolute);
                let mut forms = vec![absolute.clone()];
                if let Ok(canonical) = std::fs::canonicalize(root) {
                    if canonical != absolute {
                        forms.push(canonical);
                    }
                }
                Ok((root.as_path(), forms))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(ResolvedRoots { bases })
    }

    /// Part of `path` below the first root it lies under, comparing only
    /// the roots as given
    ///
    /// Used when the roots cannot be resolved; relative roots never match.
    pub fn below_root_lexically<'p>(&self, path: &'p Path) -> &'p Path {
        self.roots
            .iter()
            .filter(|root| root.is_absolute())
            .find_map(|root| below(root, path))
            .unwrap_or(path)
    }
}

/// Roots resolved against the current directory and the disk
#[derive(Debug)]
pub struct ResolvedRoots<'a> {
    bases: Vec<(&'a Path, Vec<PathBuf>)>,
}

impl ResolvedRoots<'_> {
    /// Normalize every path in a change set
    pub fn normalize(&self, changes: &Mod) -> Mod {
        changes.map_paths(|path| self.normalize_path(path))
    }

    /// Normalize a single absolute path
    pub fn normalize_path(&self, path: &Path) -> PathBuf {
        let Some((given, relative)) = self.locate(path) else {
            return path.to_path_buf();
        };
        if relative.as_os_str().is_empty() {
            given.to_path_buf()
        } else if self.bases.len() == 1 {
            relative.to_path_buf()
        } else {
            lexically_clean(&given.join(relative))
        }
    }

    /// Part of `path` below its root, the part exclusion patterns see
    ///
    /// A path equal to its root yields its own file name; a path under no
    /// root is returned whole.
    pub fn below_root<'p>(&self, path: &'p Path) -> &'p Path {
        match self.locate(path) {
            Some((_, relative)) => non_empty_or_name(relative, path),
            None => path,
        }
    }

    /// First root containing `path`, with the remainder below it
    fn locate<'p>(&self, path: &'p Path) -> Option<(&Path, &'p Path)> {
        self.bases.iter().find_map(|(given, forms)| {
            forms
                .iter()
                .filter(|form| is_under(form, path))
                .find_map(|form| path.strip_prefix(form).ok())
                .map(|relative| (*given, relative))
        })
    }
}

/// Remainder of `path` below `root`, or `None` if it lies elsewhere
fn below<'p>(root: &Path, path: &'p Path) -> Option<&'p Path> {
    let root = lexically_clean(root);
    path.strip_prefix(&root)
        .ok()
        .map(|relative| non_empty_or_name(relative, path))
}

fn non_empty_or_name<'p>(relative: &'p Path, path: &'p Path) -> &'p Path {
    if relative.as_os_str().is_empty() {
        path.file_name().map(Path::new).unwrap_or(path)
    } else {
        relative
    }
}

/// Drop `.` components and leading `./` without touching the disk
fn lexically_clean(path: &Path) -> PathBuf {
    let cleaned: PathBuf = path
        .components()
        .filter(|c| !matches!(c, Component::CurDir))
        .collect();
    if cleaned.as_os_str().is_empty() {
        PathBuf::from(".")
    } else {
        cleaned
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn paths(items: &[&str]) -> Vec<PathBuf> {
        items.iter().map(PathBuf::from).collect()
    }

    fn normalize_one(normalizer: &PathNormalizer, path: &Path) -> PathBuf {
        normalizer
            .resolve()
            .expect("roots resolve")
            .normalize_path(path)
    }

    #[test]
    fn test_is_under_respects_component_boundaries() {
        assert!(is_under(Path::new("/repo"), Path::new("/repo")));
        assert!(is_under(Path::new("/repo"), Path::new("/repo/a.txt")));
        assert!(is_under(Path::new("/repo"), Path::new("/repo/src/lib.rs")));
        assert!(!is_under(Path::new("/repo"), Path::new("/repository/a.txt")));
        assert!(!is_under(Path::new("/repo/src"), Path::new("/repo")));
    }

    #[test]
    fn test_single_root_is_root_relative() {
        let normalizer = PathNormalizer::new(paths(&["/repo"]));
        let m = Mod::new(
            paths(&["/repo/a.txt"]),
            paths(&["/repo/src/lib.rs"]),
            paths(&["/repo/old/b.txt"]),
        );

        let normalized = normalizer.normalize(&m).expect("normalization failed");
        assert_eq!(
            normalized,
            Mod::new(
                paths(&["a.txt"]),
                paths(&["src/lib.rs"]),
                paths(&["old/b.txt"])
            )
        );
    }

    #[test]
    fn test_multiple_roots_keep_root_prefix() {
        let normalizer = PathNormalizer::new(paths(&["/repo/src", "/repo/docs"]));
        let m = Mod::new(
            paths(&["/repo/docs/x.md", "/repo/src/x.rs"]),
            Vec::new(),
            Vec::new(),
        );

        let normalized = normalizer.normalize(&m).expect("normalization failed");
        assert_eq!(normalized.added, paths(&["/repo/docs/x.md", "/repo/src/x.rs"]));
    }

    #[test]
    fn test_multiple_relative_roots_stay_relative() {
        let cwd = std::env::current_dir().expect("test setup failed");
        let normalizer = PathNormalizer::new(paths(&["./src", "docs"]));

        assert_eq!(
            normalize_one(&normalizer, &cwd.join("src").join("main.rs")),
            PathBuf::from("src/main.rs")
        );
        assert_eq!(
            normalize_one(&normalizer, &cwd.join("docs").join("guide.md")),
            PathBuf::from("docs/guide.md")
        );
    }

    #[test]
    fn test_first_matching_root_wins() {
        let normalizer = PathNormalizer::new(paths(&["/repo", "/repo/src"]));
        assert_eq!(
            normalize_one(&normalizer, Path::new("/repo/src/lib.rs")),
            PathBuf::from("/repo/src/lib.rs")
        );
    }

    #[test]
    fn test_path_outside_roots_unchanged() {
        let normalizer = PathNormalizer::new(paths(&["/repo"]));
        assert_eq!(
            normalize_one(&normalizer, Path::new("/elsewhere/a.txt")),
            PathBuf::from("/elsewhere/a.txt")
        );
        assert_eq!(
            normalize_one(&normalizer, Path::new("/repository/a.txt")),
            PathBuf::from("/repository/a.txt")
        );
    }

    #[test]
    fn test_file_root_maps_to_itself() {
        let normalizer = PathNormalizer::new(paths(&["/repo/Cargo.toml"]));
        assert_eq!(
            normalize_one(&normalizer, Path::new("/repo/Cargo.toml")),
            PathBuf::from("/repo/Cargo.toml")
        );
    }

    #[test]
    fn test_relative_root_matches_absolute_events() {
        let cwd = std::env::current_dir().expect("test setup failed");
        let normalizer = PathNormalizer::new(paths(&["."]));

        assert_eq!(
            normalize_one(&normalizer, &cwd.join("a.txt")),
            PathBuf::from("a.txt")
        );
    }

    #[cfg(unix)]
    #[test]
    fn test_canonical_root_form_is_accepted() {
        let temp_dir = tempfile::TempDir::new().expect("test setup failed");
        let real = temp_dir.path().join("real");
        std::fs::create_dir(&real).expect("test setup failed");
        let link = temp_dir.path().join("link");
        std::os::unix::fs::symlink(&real, &link).expect("test setup failed");

        let normalizer = PathNormalizer::new(vec![link]);
        let canonical = std::fs::canonicalize(&real).expect("test setup failed");
        assert_eq!(
            normalize_one(&normalizer, &canonical.join("a.txt")),
            PathBuf::from("a.txt")
        );
    }

    #[test]
    fn test_below_root_strips_root_components() {
        let normalizer = PathNormalizer::new(paths(&["/home/u/.work/app", "/home/u/.work/lib"]));
        let roots = normalizer.resolve().expect("roots resolve");

        assert_eq!(
            roots.below_root(Path::new("/home/u/.work/lib/src/mod.rs")),
            Path::new("src/mod.rs")
        );
        assert_eq!(
            roots.below_root(Path::new("/home/u/.work/app")),
            Path::new("app")
        );
        assert_eq!(
            roots.below_root(Path::new("/elsewhere/x")),
            Path::new("/elsewhere/x")
        );
    }

    #[test]
    fn test_below_root_lexically_ignores_relative_roots() {
        let normalizer = PathNormalizer::new(paths(&["src", "/repo/.docs"]));

        assert_eq!(
            normalizer.below_root_lexically(Path::new("/repo/.docs/guide.md")),
            Path::new("guide.md")
        );
        assert_eq!(
            normalizer.below_root_lexically(Path::new("/cwd/src/main.rs")),
            Path::new("/cwd/src/main.rs")
        );
    }
}
