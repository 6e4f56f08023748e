//! Report context assembly
//!
//! Bundles the git snapshot, parsed checklists and structured documents into
//! one serializable value that a downstream summarizer consumes. Checklist
//! and document discovery run concurrently; the git snapshot runs on a
//! blocking task.

use std::fmt::Write as _;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

use crate::core::checklist::Checklist;
use crate::core::git::GitSnapshot;
use crate::core::index::{DocumentIndex, DocumentMap};
use crate::core::markdown::StructuredDocument;
use crate::infra::config::AppConfig;

/// Totals across every discovered file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub checklist_files: usize,
    pub document_files: usize,
    pub tasks: usize,
    pub completed: usize,
    pub pending: usize,
    /// Distinct checklist sections across files, first-seen order
    pub sections: Vec<String>,
}

impl Summary {
    fn from_checklists(todos: &DocumentMap<Checklist>, document_files: usize) -> Self {
        let mut s = Summary {
            checklist_files: todos.len(),
            document_files,
            ..Summary::default()
        };
        for list in todos.values() {
            s.tasks += list.tasks.len();
            s.completed += list.completed_count();
            for section in &list.sections {
                if !s.sections.contains(section) {
                    s.sections.push(section.clone());
                }
            }
        }
        s.pending = s.tasks - s.completed;
        s
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportContext {
    pub generated_at: DateTime<Utc>,
    pub root: PathBuf,
    pub git: Option<GitSnapshot>,
    pub todos: DocumentMap<Checklist>,
    pub docs: DocumentMap<StructuredDocument>,
    pub summary: Summary,
}

/// Assemble the report context for the index root
pub async fn build_context(
    index: &DocumentIndex,
    cfg: &AppConfig,
    with_git: bool,
) -> Result<ReportContext> {
    let (todos, mut docs) = tokio::try_join!(
        index.read_checklists(&cfg.todo.patterns),
        index.read_documents(&cfg.docs.patterns),
    )
    .context("Failed to read repository documents")?;

    if !cfg.report.include_doc_content {
        for doc in docs.values_mut() {
            doc.content.clear();
        }
    }

    let git = if with_git && cfg.git.enabled {
        let root = index.root().to_path_buf();
        let recent = cfg.git.recent_commits;
        let joined = tokio::task::spawn_blocking(move || GitSnapshot::capture(&root, recent))
            .await
            .context("git snapshot task failed")?;
        // A broken git setup degrades the report instead of failing it
        joined.unwrap_or_else(|e| {
            warn!(error = %e, "git snapshot unavailable");
            None
        })
    } else {
        None
    };

    let summary = Summary::from_checklists(&todos, docs.len());
    info!(
        tasks = summary.tasks,
        completed = summary.completed,
        docs = summary.document_files,
        "report context assembled"
    );

    Ok(ReportContext {
        generated_at: Utc::now(),
        root: index.root().to_path_buf(),
        git,
        todos,
        docs,
        summary,
    })
}

/// Plain markdown digest of a report context
pub fn render_markdown(ctx: &ReportContext) -> String {
    let mut out = String::new();
    let s = &ctx.summary;

    let _ = writeln!(out, "# Repository brief");
    let _ = writeln!(out);
    let _ = writeln!(out, "Generated: {}", ctx.generated_at.format("%Y-%m-%d %H:%M UTC"));
    let _ = writeln!(
        out,
        "Tasks: {} total, {} done, {} pending",
        s.tasks, s.completed, s.pending
    );

    if let Some(git) = &ctx.git {
        let _ = writeln!(out);
        let _ = writeln!(out, "## Git");
        let _ = writeln!(
            out,
            "Branch: {} @ {}",
            git.branch.as_deref().unwrap_or("(none)"),
            git.head.as_deref().unwrap_or("(no commits)")
        );
        if git.is_dirty() {
            let untracked = git.changes.iter().filter(|c| c.is_untracked()).count();
            let _ = writeln!(
                out,
                "Uncommitted changes: {} ({untracked} untracked)",
                git.changes.len()
            );
        } else {
            let _ = writeln!(out, "Working tree clean");
        }
        for c in &git.recent_commits {
            let _ = writeln!(out, "- {} {} ({}, {})", c.hash, c.subject, c.author, c.date);
        }
    }

    if !ctx.todos.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "## Tasks");
        for (path, list) in &ctx.todos {
            let _ = writeln!(out);
            let _ = writeln!(
                out,
                "### {} ({}/{})",
                path,
                list.completed_count(),
                list.tasks.len()
            );
            for section in &list.sections {
                let _ = writeln!(out, "#### {section}");
                for task in list.tasks_in(section) {
                    let mark = if task.completed { 'x' } else { ' ' };
                    let _ = writeln!(out, "- [{mark}] {}", task.description);
                }
            }
        }
    }

    if !ctx.docs.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "## Documents");
        for (path, doc) in &ctx.docs {
            let title = if doc.title.is_empty() { "(untitled)" } else { doc.title.as_str() };
            let _ = writeln!(out, "- {path}: {title} ({} sections)", doc.sections.len());
        }
    }

    out
}
