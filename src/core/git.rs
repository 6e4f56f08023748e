//! Working-tree snapshot via the `git` executable
//!
//! Captures branch, HEAD, porcelain status and recent commits so the report
//! context can describe what changed alongside the task lists.

use anyhow::{Context, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::debug;

/// Field separator used in `git log` output
const FIELD_SEP: char = '\u{1f}';

/// One `git status --porcelain` entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusEntry {
    /// Two-letter XY status code (e.g. " M", "??", "R ")
    pub code: String,
    pub path: String,
}

impl StatusEntry {
    pub fn is_untracked(&self) -> bool {
        self.code == "??"
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommitSummary {
    pub hash: String,
    pub author: String,
    pub date: String,
    pub subject: String,
}

/// Version-control state of the repository root
#[derive(Debug, Clone, Serialize)]
pub struct GitSnapshot {
    pub branch: Option<String>,
    pub head: Option<String>,
    pub changes: Vec<StatusEntry>,
    pub recent_commits: Vec<CommitSummary>,
}

impl GitSnapshot {
    /// Capture a snapshot; `None` when `root` is not a git work tree or git
    /// is unavailable.
    pub fn capture(root: &Path, recent: usize) -> Result<Option<Self>> {
        let Ok(git) = detect_git_executable() else {
            debug!("git not available; skipping snapshot");
            return Ok(None);
        };
        let git = GitRunner { git, root };

        if git.run(&["rev-parse", "--is-inside-work-tree"]).ok().as_deref() != Some("true") {
            debug!(root = %root.display(), "not a git work tree");
            return Ok(None);
        }

        // Both fail on a repository without commits
        let branch = git.run(&["rev-parse", "--abbrev-ref", "HEAD"]).ok();
        let head = git.run(&["rev-parse", "--short", "HEAD"]).ok();

        let status = git
            .run(&["status", "--porcelain=v1", "--untracked-files=all"])
            .context("git status failed")?;

        let recent_commits = if head.is_some() && recent > 0 {
            let log = git
                .run(&[
                    "log",
                    &format!("-n{recent}"),
                    "--date=short",
                    "--pretty=format:%h%x1f%an%x1f%ad%x1f%s",
                ])
                .context("git log failed")?;
            parse_log(&log)
        } else {
            Vec::new()
        };

        Ok(Some(Self {
            branch,
            head,
            changes: parse_porcelain(&status),
            recent_commits,
        }))
    }

    pub fn is_dirty(&self) -> bool {
        !self.changes.is_empty()
    }
}

struct GitRunner<'a> {
    git: PathBuf,
    root: &'a Path,
}

impl GitRunner<'_> {
    /// Run a git subcommand in the root and return trimmed stdout
    fn run(&self, args: &[&str]) -> Result<String> {
        let output = Command::new(&self.git)
            .current_dir(self.root)
            .args(args)
            .output()
            .with_context(|| format!("Failed to spawn git {}", args.join(" ")))?;

        if !output.status.success() {
            anyhow::bail!(
                "git {} failed: {}",
                args.join(" "),
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim_end().to_string())
    }
}

/// Detect git executable
fn detect_git_executable() -> Result<PathBuf> {
    let output = Command::new("git")
        .arg("--version")
        .output()
        .context("Git executable not found in PATH")?;

    if !output.status.success() {
        anyhow::bail!("Git command failed");
    }

    let version_str = String::from_utf8_lossy(&output.stdout);
    if !version_str.contains("git version") {
        anyhow::bail!("Unexpected git version output: {}", version_str);
    }

    Ok(PathBuf::from("git"))
}

/// Parse `git status --porcelain=v1` output
fn parse_porcelain(out: &str) -> Vec<StatusEntry> {
    out.lines()
        .filter(|l| l.len() > 3)
        .map(|line| {
            let (code, rest) = line.split_at(2);
            let path = rest.trim_start();
            // Renames and copies report "old -> new"
            let path = path.rsplit_once(" -> ").map_or(path, |(_, new)| new);
            StatusEntry {
                code: code.to_string(),
                path: path.trim_matches('"').to_string(),
            }
        })
        .collect()
}

/// Parse `git log` output written with `FIELD_SEP` separators
fn parse_log(out: &str) -> Vec<CommitSummary> {
    out.lines()
        .filter_map(|line| {
            let mut parts = line.splitn(4, FIELD_SEP);
            Some(CommitSummary {
                hash: parts.next()?.to_string(),
                author: parts.next()?.to_string(),
                date: parts.next()?.to_string(),
                subject: parts.next()?.to_string(),
            })
        })
        .collect()
}
