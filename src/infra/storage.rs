//! Storage capability used by the document index.
//!
//! The [`Storage`] trait is the only way the core touches files, so the
//! index can run against the real filesystem ([`FsStorage`]) or an
//! in-process map ([`MemoryStorage`]). All operations are async so callers
//! can suspend while reads or glob expansion are pending.
//!
//! | Method | Purpose |
//! |--------|---------|
//! | [`read_text`](Storage::read_text) | Read a UTF-8 file (`NotFound` if absent) |
//! | [`write_text`](Storage::write_text) | Replace a file's contents |
//! | [`list_paths`](Storage::list_paths) | Expand a glob under a base directory |
//! | [`list_paths_pruned`](Storage::list_paths_pruned) | Same, skipping excluded directories where the backend can |

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use indexmap::IndexMap;
use tokio::sync::RwLock;
use tracing::{debug, trace};

use crate::core::error::IndexError;
use crate::infra::utils::PathUtils;
use crate::infra::walk::{DirFilter, GlobWalker, compile_glob};

/// Abstract text storage. Implementations must be `Send + Sync`.
#[async_trait]
pub trait Storage: Send + Sync
{
    /// Read the whole file as UTF-8 text.
    async fn read_text(
        &self,
        path: &Path,
    ) -> Result<String, IndexError>;

    /// Replace the whole file with `text`.
    async fn write_text(
        &self,
        path: &Path,
        text: &str,
    ) -> Result<(), IndexError>;

    /// Files under `base` whose base-relative path matches `pattern`.
    async fn list_paths(
        &self,
        pattern: &str,
        base: &Path,
    ) -> Result<Vec<PathBuf>, IndexError>;

    /// Like [`list_paths`](Storage::list_paths), but directories for which
    /// `prune` returns true may be skipped without being listed. Callers
    /// still filter the result; backends without a traversal fall back to
    /// a plain listing.
    async fn list_paths_pruned(
        &self,
        pattern: &str,
        base: &Path,
        _prune: DirFilter,
    ) -> Result<Vec<PathBuf>, IndexError>
    {
        self.list_paths(pattern, base)
            .await
    }
}

/// Filesystem-backed storage
#[derive(Debug, Clone, Default)]
pub struct FsStorage
{
    follow_symlinks: bool,
}

impl FsStorage
{
    pub fn new() -> Self
    {
        Self::default()
    }

    /// (Optional) Follow symbolic links during glob expansion.
    pub fn with_follow_symlinks(
        mut self,
        follow: bool,
    ) -> Self
    {
        self.follow_symlinks = follow;
        self
    }

    /// Run a configured walker on a blocking task
    async fn walk(
        walker: GlobWalker,
        pattern: &str,
        base: &Path,
    ) -> Result<Vec<PathBuf>, IndexError>
    {
        let base_owned = base.to_path_buf();

        // Directory traversal is blocking; keep it off the async workers
        let files = tokio::task::spawn_blocking(move || walker.walk_files(&base_owned))
            .await
            .map_err(|e| IndexError::Storage {
                path: base.to_path_buf(),
                source: std::io::Error::other(e),
            })??;

        debug!(pattern, count = files.len(), "glob expanded");
        Ok(files)
    }
}

#[async_trait]
impl Storage for FsStorage
{
    async fn read_text(
        &self,
        path: &Path,
    ) -> Result<String, IndexError>
    {
        trace!(path = %path.display(), "read");
        tokio::fs::read_to_string(path)
            .await
            .map_err(|e| IndexError::from_io(path, e))
    }

    async fn write_text(
        &self,
        path: &Path,
        text: &str,
    ) -> Result<(), IndexError>
    {
        trace!(path = %path.display(), bytes = text.len(), "write");
        tokio::fs::write(path, text)
            .await
            .map_err(|e| IndexError::Storage { path: path.to_path_buf(), source: e })
    }

    async fn list_paths(
        &self,
        pattern: &str,
        base: &Path,
    ) -> Result<Vec<PathBuf>, IndexError>
    {
        let walker = GlobWalker::new(pattern)?.with_follow_symlinks(self.follow_symlinks);
        Self::walk(walker, pattern, base)
            .await
    }

    async fn list_paths_pruned(
        &self,
        pattern: &str,
        base: &Path,
        prune: DirFilter,
    ) -> Result<Vec<PathBuf>, IndexError>
    {
        let walker = GlobWalker::new(pattern)?
            .with_follow_symlinks(self.follow_symlinks)
            .with_prune(prune);
        Self::walk(walker, pattern, base)
            .await
    }
}

/// In-memory storage for tests and embedding.
///
/// Keys are lexically normalized paths; listing yields insertion order.
#[derive(Debug, Default)]
pub struct MemoryStorage
{
    files: RwLock<IndexMap<PathBuf, String>>,
}

impl MemoryStorage
{
    pub fn new() -> Self
    {
        Self::default()
    }

    /// Seed a file (builder style, for fixtures)
    pub fn with_file(
        mut self,
        path: impl AsRef<Path>,
        text: impl Into<String>,
    ) -> Self
    {
        self.files
            .get_mut()
            .insert(PathUtils::normalize_lexical(path.as_ref()), text.into());
        self
    }

    /// Current contents of a file, if present
    pub async fn get(
        &self,
        path: impl AsRef<Path>,
    ) -> Option<String>
    {
        self.files
            .read()
            .await
            .get(&PathUtils::normalize_lexical(path.as_ref()))
            .cloned()
    }
}

#[async_trait]
impl Storage for MemoryStorage
{
    async fn read_text(
        &self,
        path: &Path,
    ) -> Result<String, IndexError>
    {
        self.get(path)
            .await
            .ok_or_else(|| IndexError::NotFound(path.to_path_buf()))
    }

    async fn write_text(
        &self,
        path: &Path,
        text: &str,
    ) -> Result<(), IndexError>
    {
        self.files
            .write()
            .await
            .insert(PathUtils::normalize_lexical(path), text.to_string());
        Ok(())
    }

    async fn list_paths(
        &self,
        pattern: &str,
        base: &Path,
    ) -> Result<Vec<PathBuf>, IndexError>
    {
        let matcher = compile_glob(pattern)?;
        let base = PathUtils::normalize_lexical(base);

        Ok(self
            .files
            .read()
            .await
            .keys()
            .filter(|p| {
                p.strip_prefix(&base)
                    .is_ok_and(|rel| matcher.is_match(PathUtils::to_slash(rel)))
            })
            .cloned()
            .collect())
    }
}
