//! Gitignore-style visibility rules.
//!
//! Rules come from one or more text sources (the primary ignore file,
//! supplementary files, inline config patterns) and are compiled once into
//! an immutable [`RuleSet`]. Evaluation follows gitignore semantics: source
//! order then line order, last match wins, `!` re-includes, a trailing `/`
//! scopes a rule to directories and everything beneath them.

use std::path::{Path, PathBuf};

use ignore::gitignore::{Gitignore, GitignoreBuilder};
use tracing::{debug, instrument, warn};

use crate::core::error::IndexError;
use crate::infra::config::IgnoreConfig;
use crate::infra::storage::Storage;
use crate::infra::utils::PathUtils;

/// One raw blob of ignore rules and where it came from
#[derive(Debug, Clone)]
pub struct RuleSource {
    pub origin: PathBuf,
    /// `None` when the backing file was absent
    pub text: Option<String>,
    pub required: bool,
}

impl RuleSource {
    pub fn required(origin: impl Into<PathBuf>, text: Option<String>) -> Self {
        Self {
            origin: origin.into(),
            text,
            required: true,
        }
    }

    pub fn optional(origin: impl Into<PathBuf>, text: Option<String>) -> Self {
        Self {
            origin: origin.into(),
            text,
            required: false,
        }
    }

    /// Patterns supplied directly (e.g. from configuration)
    pub fn inline(label: &str, patterns: &[String]) -> Self {
        Self::optional(label, Some(patterns.join("\n")))
    }
}

/// Compiled, read-only rule set anchored at a repository root
#[derive(Debug, Clone)]
pub struct RuleSet {
    root: PathBuf,
    matcher: Gitignore,
    patterns: Vec<String>,
}

impl RuleSet {
    /// A rule set that ignores nothing
    pub fn empty(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            matcher: Gitignore::empty(),
            patterns: Vec::new(),
        }
    }

    /// Compile rule sources in the order given.
    ///
    /// Blank lines and `#` comments are dropped. A required source with no
    /// text is a configuration error; a missing optional source is skipped.
    /// Patterns the glob engine rejects are kept as literal segments.
    #[instrument(skip(sources), fields(count = sources.len()))]
    pub fn compile(root: &Path, sources: &[RuleSource]) -> Result<Self, IndexError> {
        let mut builder = GitignoreBuilder::new(root);
        let mut patterns = Vec::new();

        for source in sources {
            let Some(text) = source.text.as_deref() else {
                if source.required {
                    return Err(IndexError::Configuration(format!(
                        "required ignore file {} is missing",
                        source.origin.display()
                    )));
                }
                debug!(origin = %source.origin.display(), "optional ignore source absent");
                continue;
            };

            for line in text.lines().map(|l| l.trim_end_matches('\r')) {
                let head = line.trim_start();
                if head.is_empty() || head.starts_with('#') {
                    continue;
                }

                let from = Some(source.origin.clone());
                if builder.add_line(from.clone(), line).is_err() {
                    let literal = escape_glob(line);
                    if let Err(e) = builder.add_line(from, &literal) {
                        warn!(pattern = line, error = %e, "dropping unusable ignore pattern");
                        continue;
                    }
                }
                patterns.push(line.to_string());
            }
        }

        let matcher = builder
            .build()
            .map_err(|e| IndexError::Configuration(format!("cannot compile ignore rules: {e}")))?;

        debug!(count = patterns.len(), "ignore rules compiled");
        Ok(Self {
            root: root.to_path_buf(),
            matcher,
            patterns,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Patterns in evaluation order
    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    pub fn pattern_count(&self) -> usize {
        self.patterns.len()
    }

    /// Whether `path` is excluded.
    ///
    /// The path may be absolute (under the root) or root-relative, with
    /// either separator. Paths outside the root are never ignored. Without a
    /// trailing `/` the path is tried as a file first, then as a directory.
    pub fn is_ignored(&self, path: &str) -> bool {
        let Some(rel) = PathUtils::relative_slash(&self.root, path) else {
            return false;
        };
        if rel.is_empty() {
            return false;
        }

        let rel = Path::new(&rel);
        let dir_hint = path.ends_with('/') || path.ends_with('\\');

        let verdict = self.matcher.matched_path_or_any_parents(rel, dir_hint);
        if verdict.is_none() && !dir_hint {
            return self
                .matcher
                .matched_path_or_any_parents(rel, true)
                .is_ignore();
        }
        verdict.is_ignore()
    }
}

/// Wrap glob metacharacters in classes so the line matches literally
fn escape_glob(line: &str) -> String {
    let mut out = String::with_capacity(line.len() + 8);
    for ch in line.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '*' | '?' | '[' | ']' | '{' | '}' => {
                out.push('[');
                out.push(ch);
                out.push(']');
            }
            _ => out.push(ch),
        }
    }
    out
}

/// Read the configured ignore files through `storage`.
///
/// Order: primary file, supplementary files, then inline patterns. Absent
/// files become `None` sources; other I/O failures propagate.
pub async fn load_rule_sources(
    storage: &dyn Storage,
    root: &Path,
    cfg: &IgnoreConfig,
) -> Result<Vec<RuleSource>, IndexError> {
    let mut sources = Vec::with_capacity(cfg.extra_files.len() + 2);

    let primary = root.join(&cfg.primary_file);
    sources.push(RuleSource {
        text: read_optional(storage, &primary).await?,
        origin: primary,
        required: cfg.require_primary,
    });

    for extra in &cfg.extra_files {
        let path = root.join(extra);
        sources.push(RuleSource::optional(
            path.clone(),
            read_optional(storage, &path).await?,
        ));
    }

    if !cfg.patterns.is_empty() {
        sources.push(RuleSource::inline("config:ignore.patterns", &cfg.patterns));
    }

    Ok(sources)
}

async fn read_optional(storage: &dyn Storage, path: &Path) -> Result<Option<String>, IndexError> {
    match storage.read_text(path).await {
        Ok(text) => Ok(Some(text)),
        Err(IndexError::NotFound(_)) => Ok(None),
        Err(e) => Err(e),
    }
}
