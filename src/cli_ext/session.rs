//! Shared setup for command handlers: config, storage, rule set, index.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use owo_colors::OwoColorize;

use crate::cli::AppContext;
use crate::core::index::DocumentIndex;
use crate::infra::config::{AppConfig, load_config};
use crate::infra::storage::{FsStorage, Storage};

/// Everything a command needs to touch the repository
pub struct Session
{
    pub config: AppConfig,
    pub index: DocumentIndex,
}

impl Session
{
    /// Resolve the root, load configuration and compile ignore rules
    pub async fn open(ctx: &AppContext) -> Result<Self>
    {
        let root = resolve_root(&ctx.root)?;
        let config = load_config(&root)?;
        let storage: Arc<dyn Storage> =
            Arc::new(FsStorage::new().with_follow_symlinks(config.follow_symlinks));

        let index = DocumentIndex::open(root, storage, &config.ignore)
            .await
            .context("Failed to load ignore rules")?;
        tracing::debug!(
            root = %index.root().display(),
            rules = index.rules().pattern_count(),
            "session ready"
        );

        Ok(Self { config, index })
    }
}

/// Canonical repository root (Windows-friendly via dunce)
pub fn resolve_root(root: &std::path::Path) -> Result<PathBuf>
{
    dunce::canonicalize(root)
        .with_context(|| format!("Repository root not found: {}", root.display()))
}

/// Color helpers that respect --no-color
pub struct Paint
{
    enabled: bool,
}

impl Paint
{
    pub fn new(ctx: &AppContext) -> Self
    {
        Self { enabled: !ctx.no_color }
    }

    pub fn heading(
        &self,
        s: &str,
    ) -> String
    {
        if self.enabled { s.bold().to_string() } else { s.to_string() }
    }

    pub fn done(
        &self,
        s: &str,
    ) -> String
    {
        if self.enabled { s.green().to_string() } else { s.to_string() }
    }

    pub fn dim(
        &self,
        s: &str,
    ) -> String
    {
        if self.enabled { s.dimmed().to_string() } else { s.to_string() }
    }
}
