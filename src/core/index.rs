//! Document discovery, parsing and in-place task updates.
//!
//! The index never touches the filesystem itself: paths come from
//! [`Storage::list_paths_pruned`], text from [`Storage::read_text`], and updates go
//! back through [`Storage::write_text`]. Visibility is decided by the
//! compiled [`RuleSet`], shared read-only between concurrent calls.
//!
//! Concurrent `set_task_completion` calls on the same file are not
//! coordinated; the last write wins.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use indexmap::IndexMap;
use tracing::{debug, info, instrument};

use crate::core::checklist::{Checklist, rewrite_completion};
use crate::core::error::IndexError;
use crate::core::ignore_rules::{RuleSet, load_rule_sources};
use crate::core::markdown::StructuredDocument;
use crate::infra::config::IgnoreConfig;
use crate::infra::storage::Storage;
use crate::infra::utils::PathUtils;
use crate::infra::walk::DirFilter;

/// Discovery result: repository-relative `/` path to parsed document
pub type DocumentMap<T> = IndexMap<String, T>;

#[derive(Clone)]
pub struct DocumentIndex {
    root: PathBuf,
    storage: Arc<dyn Storage>,
    rules: Arc<RuleSet>,
}

impl std::fmt::Debug for DocumentIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DocumentIndex")
            .field("root", &self.root)
            .field("rules", &self.rules.pattern_count())
            .finish_non_exhaustive()
    }
}

impl DocumentIndex {
    pub fn new(root: impl Into<PathBuf>, storage: Arc<dyn Storage>, rules: Arc<RuleSet>) -> Self {
        Self {
            root: root.into(),
            storage,
            rules,
        }
    }

    /// Load and compile ignore rules through `storage`, then build the index
    pub async fn open(
        root: impl Into<PathBuf>,
        storage: Arc<dyn Storage>,
        ignore: &IgnoreConfig,
    ) -> Result<Self, IndexError> {
        let root = root.into();
        let sources = load_rule_sources(storage.as_ref(), &root, ignore).await?;
        let rules = RuleSet::compile(&root, &sources)?;
        Ok(Self::new(root, storage, Arc::new(rules)))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    /// Expand globs, dedup by resolved path (first seen wins), drop ignored
    /// paths. Returns repository-relative `/` paths; order follows the
    /// storage's match order. Ignored directories are not traversed.
    #[instrument(skip(self), fields(root = %self.root.display()))]
    pub async fn find_files(&self, patterns: &[String]) -> Result<Vec<String>, IndexError> {
        let mut seen: HashSet<PathBuf> = HashSet::new();
        let mut out = Vec::new();

        let rules = Arc::clone(&self.rules);
        let prune: DirFilter = Arc::new(move |rel: &str| rules.is_ignored(&format!("{rel}/")));

        for pattern in patterns {
            let listed = self
                .storage
                .list_paths_pruned(pattern, &self.root, Arc::clone(&prune))
                .await?;
            for path in listed {
                let resolved = PathUtils::normalize_lexical(&self.root.join(&path));
                if !seen.insert(resolved.clone()) {
                    continue;
                }

                let Some(rel) = PathUtils::relative_slash(&self.root, &resolved.to_string_lossy())
                else {
                    continue;
                };
                if self.rules.is_ignored(&rel) {
                    debug!(path = %rel, "ignored");
                    continue;
                }
                out.push(rel);
            }
        }

        debug!(count = out.len(), "files discovered");
        Ok(out)
    }

    /// Parse every discovered file as a checklist
    pub async fn read_checklists(
        &self,
        patterns: &[String],
    ) -> Result<DocumentMap<Checklist>, IndexError> {
        self.read_all(patterns, Checklist::parse).await
    }

    /// Parse every discovered file as a structured document
    pub async fn read_documents(
        &self,
        patterns: &[String],
    ) -> Result<DocumentMap<StructuredDocument>, IndexError> {
        self.read_all(patterns, StructuredDocument::parse).await
    }

    pub async fn read_checklist(&self, path: &str) -> Result<Checklist, IndexError> {
        let (_, text) = self.read_visible(path).await?;
        Ok(Checklist::parse(&text))
    }

    pub async fn read_document(&self, path: &str) -> Result<StructuredDocument, IndexError> {
        let (_, text) = self.read_visible(path).await?;
        Ok(StructuredDocument::parse(&text))
    }

    /// Set the checkbox of every task line containing `needle`.
    ///
    /// Every match is rewritten, not just the first. Returns `false` and
    /// leaves the file alone when no line matches.
    #[instrument(skip(self))]
    pub async fn set_task_completion(
        &self,
        path: &str,
        needle: &str,
        completed: bool,
    ) -> Result<bool, IndexError> {
        let (abs, text) = self.read_visible(path).await?;
        let (updated, matched) = rewrite_completion(&text, needle, completed);

        if matched == 0 {
            debug!("no task line matched");
            return Ok(false);
        }

        self.storage.write_text(&abs, &updated).await?;
        info!(matched, "task completion updated");
        Ok(true)
    }

    async fn read_all<T>(
        &self,
        patterns: &[String],
        parse: fn(&str) -> T,
    ) -> Result<DocumentMap<T>, IndexError> {
        let mut out = IndexMap::new();
        for rel in self.find_files(patterns).await? {
            let text = self.storage.read_text(&self.root.join(&rel)).await?;
            out.insert(rel, parse(&text));
        }
        Ok(out)
    }

    /// Resolve `path`, reject ignored or out-of-root paths, read its text
    async fn read_visible(&self, path: &str) -> Result<(PathBuf, String), IndexError> {
        let rel = PathUtils::relative_slash(&self.root, path)
            .filter(|rel| !rel.is_empty() && !self.rules.is_ignored(rel))
            .ok_or_else(|| IndexError::NotFound(PathBuf::from(path)))?;

        let abs = self.root.join(&rel);
        let text = self.storage.read_text(&abs).await?;
        Ok((abs, text))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ignore_rules::RuleSource;
    use crate::infra::storage::MemoryStorage;

    fn index_with(storage: Arc<MemoryStorage>, ignore: &str) -> DocumentIndex {
        let rules = RuleSet::compile(
            Path::new("/repo"),
            &[RuleSource::optional("/repo/.gitignore", Some(ignore.to_string()))],
        )
        .unwrap();
        DocumentIndex::new("/repo", storage, Arc::new(rules))
    }

    fn pats(p: &[&str]) -> Vec<String> {
        p.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn find_files_dedups_and_filters() {
        let storage = Arc::new(
            MemoryStorage::new()
                .with_file("/repo/TODO.md", "- [ ] a\n")
                .with_file("/repo/docs/TODO.md", "- [ ] b\n")
                .with_file("/repo/vendor/TODO.md", "- [ ] c\n"),
        );
        let index = index_with(storage, "vendor/\n");

        let files = index
            .find_files(&pats(&["**/TODO.md", "TODO.md"]))
            .await
            .unwrap();
        assert_eq!(files, vec!["TODO.md", "docs/TODO.md"]);
    }

    #[tokio::test]
    async fn read_checklists_keys_by_relative_path() {
        let storage = Arc::new(
            MemoryStorage::new()
                .with_file("/repo/TODO.md", "## Setup\n- [ ] write tests\n- [x] init repo\n"),
        );
        let index = index_with(storage, "");

        let lists = index.read_checklists(&pats(&["*.md"])).await.unwrap();
        let list = &lists["TODO.md"];
        assert_eq!(list.sections, vec!["Setup"]);
        assert_eq!(list.tasks.len(), 2);
    }

    #[tokio::test]
    async fn read_documents_parses_structure() {
        let storage = Arc::new(
            MemoryStorage::new().with_file("/repo/docs/a.md", "# Empty Header\n## Next\ncontent here\n"),
        );
        let index = index_with(storage, "");

        let docs = index.read_documents(&pats(&["docs/*.md"])).await.unwrap();
        assert_eq!(docs["docs/a.md"].title, "Next");

        let single = index.read_document("./docs/a.md").await.unwrap();
        assert_eq!(single, docs["docs/a.md"]);
    }

    #[tokio::test]
    async fn set_task_completion_rewrites_and_preserves() {
        let storage = Arc::new(
            MemoryStorage::new().with_file("/repo/TODO.md", "- [ ] write docs\n- [ ] write tests\n"),
        );
        let index = index_with(storage.clone(), "");

        assert!(index.set_task_completion("TODO.md", "tests", true).await.unwrap());
        let text = storage.get("/repo/TODO.md").await.unwrap();
        assert_eq!(text, "- [ ] write docs\n- [x] write tests\n");

        assert!(!index.set_task_completion("TODO.md", "absent", true).await.unwrap());
    }

    #[tokio::test]
    async fn set_task_completion_missing_or_ignored_is_not_found() {
        let storage = Arc::new(MemoryStorage::new().with_file("/repo/secret/TODO.md", "- [ ] x\n"));
        let index = index_with(storage, "secret/\n");

        let missing = index.set_task_completion("TODO.md", "x", true).await;
        assert!(matches!(missing, Err(IndexError::NotFound(_))));

        let ignored = index.set_task_completion("secret/TODO.md", "x", true).await;
        assert!(matches!(ignored, Err(IndexError::NotFound(_))));

        let outside = index.read_checklist("../elsewhere.md").await;
        assert!(matches!(outside, Err(IndexError::NotFound(_))));
    }

    /// Storage whose writes always fail
    struct ReadOnlyStorage(MemoryStorage);

    #[async_trait::async_trait]
    impl Storage for ReadOnlyStorage {
        async fn read_text(&self, path: &Path) -> Result<String, IndexError> {
            self.0.read_text(path).await
        }

        async fn write_text(&self, path: &Path, _text: &str) -> Result<(), IndexError> {
            Err(IndexError::Storage {
                path: path.to_path_buf(),
                source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read-only"),
            })
        }

        async fn list_paths(&self, pattern: &str, base: &Path) -> Result<Vec<PathBuf>, IndexError> {
            self.0.list_paths(pattern, base).await
        }
    }

    #[tokio::test]
    async fn write_failure_surfaces_as_storage_error() {
        let storage = Arc::new(ReadOnlyStorage(
            MemoryStorage::new().with_file("/repo/TODO.md", "- [ ] ship\n"),
        ));
        let index = DocumentIndex::new("/repo", storage, Arc::new(RuleSet::empty("/repo")));

        let err = index
            .set_task_completion("TODO.md", "ship", true)
            .await
            .unwrap_err();
        assert!(matches!(err, IndexError::Storage { ref path, .. } if path == Path::new("/repo/TODO.md")));

        // No match means no write attempt
        assert!(!index.set_task_completion("TODO.md", "absent", true).await.unwrap());
    }

    #[tokio::test]
    async fn ignored_directories_are_pruned_from_listing() {
        let storage = Arc::new(
            MemoryStorage::new()
                .with_file("/repo/a.md", "# A\nx\n")
                .with_file("/repo/node_modules/pkg/README.md", "# P\ny\n"),
        );
        let index = index_with(storage, "node_modules/\n");

        let files = index.find_files(&pats(&["**/*.md"])).await.unwrap();
        assert_eq!(files, vec!["a.md"]);
    }

    #[tokio::test]
    async fn open_compiles_rules_from_storage() {
        let storage: Arc<dyn Storage> = Arc::new(
            MemoryStorage::new()
                .with_file("/repo/.gitignore", "*.draft.md\n")
                .with_file("/repo/a.md", "# A\nx\n")
                .with_file("/repo/b.draft.md", "# B\ny\n"),
        );
        let index = DocumentIndex::open("/repo", storage, &IgnoreConfig::default())
            .await
            .unwrap();

        let files = index.find_files(&pats(&["*.md"])).await.unwrap();
        assert_eq!(files, vec!["a.md"]);
    }
}
