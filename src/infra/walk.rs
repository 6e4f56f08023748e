//! Filepath: src/infra/walk.rs
//! Glob-driven file listing for the filesystem storage backend.
//! - Expands one glob pattern against a base directory
//! - Standard ignore filters are OFF: visibility is decided by the
//!   compiled rule set in `core::ignore_rules`, not by the walker
//! - `.git/` is always pruned
//! - Optional symlink following
//! - Optional directory pruning (the caller's rule set decides)
//! - Deterministic ordering for stable tests/CI
//!
//! Backed by ripgrep's `ignore` crate (traversal) and `globset`.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use globset::{GlobBuilder, GlobMatcher};
use ignore::{DirEntry, WalkBuilder};

use crate::core::error::IndexError;
use crate::infra::utils::PathUtils;

/// Compile a discovery glob. `*` stays within one segment, `**` spans many.
pub fn compile_glob(pattern: &str) -> Result<GlobMatcher, IndexError>
{
    let trimmed = pattern
        .strip_prefix("./")
        .unwrap_or(pattern);

    let glob = GlobBuilder::new(trimmed)
        .literal_separator(true)
        .build()
        .map_err(|e| IndexError::Configuration(format!("invalid glob `{pattern}`: {e}")))?;

    Ok(glob.compile_matcher())
}

/// Predicate over a base-relative `/` directory path; `true` skips the subtree
pub type DirFilter = Arc<dyn Fn(&str) -> bool + Send + Sync>;

/// Walks a directory and keeps files whose base-relative path matches a glob
pub struct GlobWalker
{
    /// Compiled discovery glob
    matcher: GlobMatcher,

    /// Follow symbolic links; default false
    follow_symlinks: bool,

    /// Directories never descended into; default None
    prune: Option<DirFilter>,
}

impl GlobWalker
{
    /// Build a walker for a single glob (e.g., "**/*.md", "TODO.md").
    pub fn new(pattern: &str) -> Result<Self, IndexError>
    {
        Ok(Self { matcher: compile_glob(pattern)?, follow_symlinks: false, prune: None })
    }

    /// (Optional) Follow or skip symbolic links (default false).
    pub fn with_follow_symlinks(
        mut self,
        follow: bool,
    ) -> Self
    {
        self.follow_symlinks = follow;
        self
    }

    /// (Optional) Skip directories for which `prune` returns true.
    pub fn with_prune(
        mut self,
        prune: DirFilter,
    ) -> Self
    {
        self.prune = Some(prune);
        self
    }

    /// Internal: construct a configured WalkBuilder for `base`.
    fn build_walk(
        &self,
        base: &Path,
    ) -> WalkBuilder
    {
        let mut b = WalkBuilder::new(base);

        // Ignore files are handled by the rule set; include dotfiles
        b.standard_filters(false);
        b.hidden(false);

        b.follow_links(self.follow_symlinks);

        // Sorted traversal keeps listings stable across runs
        b.sort_by_file_name(|a, b| a.cmp(b));

        let prune = self.prune.clone();
        let root = base.to_path_buf();
        b.filter_entry(move |ent: &DirEntry| {
            if ent.file_name() == ".git"
            {
                return false;
            }
            let Some(prune) = &prune
            else
            {
                return true;
            };
            if !ent
                .file_type()
                .is_some_and(|ft| ft.is_dir())
            {
                return true;
            }
            let rel = PathUtils::to_slash(
                ent.path()
                    .strip_prefix(&root)
                    .unwrap_or(ent.path()),
            );
            rel.is_empty() || !prune(&rel)
        });

        b
    }

    /// List files under `base` matching the glob.
    /// Traversal errors are surfaced rather than skipped.
    pub fn walk_files(
        &self,
        base: &Path,
    ) -> Result<Vec<PathBuf>, IndexError>
    {
        let mut out = Vec::new();

        for res in self
            .build_walk(base)
            .build()
        {
            let entry = res.map_err(|e| {
                let io = e
                    .into_io_error()
                    .unwrap_or_else(|| std::io::Error::other("directory walk failed"));
                IndexError::from_io(base, io)
            })?;

            if !entry
                .file_type()
                .is_some_and(|ft| ft.is_file())
            {
                continue;
            }

            let rel = entry
                .path()
                .strip_prefix(base)
                .unwrap_or(entry.path());

            if self
                .matcher
                .is_match(PathUtils::to_slash(rel))
            {
                out.push(entry.into_path());
            }
        }

        Ok(out)
    }
}

#[cfg(test)]
mod tests
{
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    /// Create a file with parent dirs as needed
    fn write_file(
        root: &Path,
        rel: &str,
        contents: &str,
    ) -> std::io::Result<()>
    {
        let path = root.join(rel);
        if let Some(parent) = path.parent()
        {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, contents)
    }

    fn rel_names(
        root: &Path,
        files: &[PathBuf],
    ) -> Vec<String>
    {
        files
            .iter()
            .map(|p| PathUtils::to_slash(p.strip_prefix(root).unwrap()))
            .collect()
    }

    #[test]
    fn double_star_matches_root_and_nested() -> anyhow::Result<()>
    {
        let tmp = TempDir::new()?;
        let root = tmp.path();

        write_file(root, "README.md", "# r")?;
        write_file(root, "docs/guide.md", "# g")?;
        write_file(root, "src/lib.rs", "")?;

        let files = GlobWalker::new("**/*.md")?.walk_files(root)?;
        let mut names = rel_names(root, &files);
        names.sort();

        assert_eq!(names, vec!["README.md", "docs/guide.md"]);
        Ok(())
    }

    #[test]
    fn single_star_stays_in_segment() -> anyhow::Result<()>
    {
        let tmp = TempDir::new()?;
        let root = tmp.path();

        write_file(root, "TODO.md", "- [ ] a")?;
        write_file(root, "notes/TODO.md", "- [ ] b")?;

        let files = GlobWalker::new("*.md")?.walk_files(root)?;
        assert_eq!(rel_names(root, &files), vec!["TODO.md"]);
        Ok(())
    }

    #[test]
    fn gitignore_files_are_not_applied_by_walker() -> anyhow::Result<()>
    {
        let tmp = TempDir::new()?;
        let root = tmp.path();

        write_file(root, ".gitignore", "hidden.md\n")?;
        write_file(root, "hidden.md", "x")?;
        write_file(root, ".git/HEAD.md", "x")?;

        let files = GlobWalker::new("**/*.md")?.walk_files(root)?;
        assert_eq!(rel_names(root, &files), vec!["hidden.md"]);
        Ok(())
    }

    #[test]
    fn pruned_directories_are_not_descended() -> anyhow::Result<()>
    {
        let tmp = TempDir::new()?;
        let root = tmp.path();

        write_file(root, "a.md", "a")?;
        write_file(root, "vendor/b.md", "b")?;
        write_file(root, "vendor/deep/c.md", "c")?;
        write_file(root, "docs/vendor.md", "d")?;

        let files = GlobWalker::new("**/*.md")?
            .with_prune(Arc::new(|rel: &str| rel == "vendor"))
            .walk_files(root)?;
        let mut names = rel_names(root, &files);
        names.sort();

        assert_eq!(names, vec!["a.md", "docs/vendor.md"]);
        Ok(())
    }

    #[test]
    fn invalid_glob_is_configuration_error()
    {
        assert!(matches!(GlobWalker::new("docs/[").err(), Some(IndexError::Configuration(_))));
    }

    #[test]
    fn missing_base_is_not_found()
    {
        let err = GlobWalker::new("*.md")
            .unwrap()
            .walk_files(Path::new("/definitely/not/here"))
            .unwrap_err();
        assert!(matches!(err, IndexError::NotFound(_)));
    }
}
