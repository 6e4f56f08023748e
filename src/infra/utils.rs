//! Filepath: src/infra/utils.rs
//! Utility helpers organized by small, focused structs.
//! All functions are associated fns to keep call sites
//! ergonomic, testable, and discoverable.

use std::path::{Component, Path, PathBuf};

/// Path normalization helpers
pub struct PathUtils;

impl PathUtils
{
    /// Resolve `.` and `..` components without touching the filesystem
    pub fn normalize_lexical(path: &Path) -> PathBuf
    {
        let mut out = PathBuf::new();

        for comp in path.components()
        {
            match comp
            {
                Component::CurDir =>
                {}
                Component::ParentDir =>
                {
                    // Pop a normal segment, otherwise keep the `..`
                    let popped = matches!(
                        out.components()
                            .next_back(),
                        Some(Component::Normal(_))
                    ) && out.pop();

                    if !popped && !out.has_root()
                    {
                        out.push("..");
                    }
                }
                other => out.push(other.as_os_str()),
            }
        }

        out
    }

    /// Join normal components with `/`, dropping roots and prefixes
    pub fn to_slash(path: &Path) -> String
    {
        path.components()
            .filter_map(|c| match c
            {
                Component::Normal(s) => Some(s.to_string_lossy()),
                Component::ParentDir => Some("..".into()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("/")
    }

    /// Express `path` relative to `root` using `/` separators.
    /// Backslashes are treated as separators regardless of host.
    /// Returns None when the path escapes the root.
    pub fn relative_slash(
        root: &Path,
        path: &str,
    ) -> Option<String>
    {
        let unified = path.replace('\\', "/");
        let candidate = Path::new(&unified);

        let rel = if candidate.is_absolute()
        {
            let abs = Self::normalize_lexical(candidate);
            let root = Self::normalize_lexical(root);
            abs.strip_prefix(&root)
                .ok()?
                .to_path_buf()
        }
        else
        {
            Self::normalize_lexical(candidate)
        };

        if rel
            .components()
            .any(|c| matches!(c, Component::ParentDir))
        {
            return None;
        }

        Some(Self::to_slash(&rel))
    }
}

/// Line-level text helpers that keep bytes intact
pub struct LineUtils;

impl LineUtils
{
    /// Strip a single trailing carriage return
    pub fn without_cr(line: &str) -> &str
    {
        line.strip_suffix('\r')
            .unwrap_or(line)
    }

    /// True when the line holds nothing but whitespace
    pub fn is_blank(line: &str) -> bool
    {
        line.trim()
            .is_empty()
    }
}
