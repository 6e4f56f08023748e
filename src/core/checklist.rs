//! Checklist documents: markdown task lists grouped by header.
//!
//! Grammar (line oriented, single pass):
//! - `# Title` (any depth) sets the current section
//! - `- [ ] text` / `* [x] text` is a task in the current section
//! - everything else passes through untouched
//!
//! Tasks seen before any header land in [`UNCATEGORIZED`].

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::infra::utils::LineUtils;

/// Section name for tasks that precede every header
pub const UNCATEGORIZED: &str = "Uncategorized";

static HEADER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^#+\s+(.+)$").expect("header regex"));

static TASK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[-*]\s+\[([ x])\]\s+(.+)$").expect("task regex"));

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub description: String,
    pub completed: bool,
    pub section: String,
}

/// Parsed task-list file. Rebuilt from text on every read.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checklist {
    pub tasks: Vec<Task>,
    /// Sections referenced by at least one task, first-seen order
    pub sections: Vec<String>,
}

impl Checklist {
    pub fn parse(text: &str) -> Self {
        let mut current: Option<String> = None;
        let mut tasks = Vec::new();
        let mut sections: Vec<String> = Vec::new();

        for raw in text.split('\n') {
            let line = LineUtils::without_cr(raw);

            if let Some(caps) = HEADER_RE.captures(line) {
                current = Some(caps[1].trim().to_string());
                continue;
            }

            let Some(caps) = TASK_RE.captures(line) else {
                continue;
            };

            let section = current.clone().unwrap_or_else(|| UNCATEGORIZED.to_string());
            if !sections.contains(&section) {
                sections.push(section.clone());
            }

            tasks.push(Task {
                description: caps[2].trim().to_string(),
                completed: &caps[1] == "x",
                section,
            });
        }

        Self { tasks, sections }
    }

    pub fn completed_count(&self) -> usize {
        self.tasks.iter().filter(|t| t.completed).count()
    }

    pub fn pending(&self) -> impl Iterator<Item = &Task> {
        self.tasks.iter().filter(|t| !t.completed)
    }

    pub fn tasks_in<'a>(&'a self, section: &'a str) -> impl Iterator<Item = &'a Task> + 'a {
        self.tasks.iter().filter(move |t| t.section == section)
    }

    /// Fraction of tasks completed; 0.0 for an empty list
    pub fn progress(&self) -> f64 {
        if self.tasks.is_empty() {
            return 0.0;
        }
        self.completed_count() as f64 / self.tasks.len() as f64
    }
}

/// Rewrite the checkbox of every task line containing `needle`.
///
/// Only the marker byte changes; all other bytes, line endings and a missing
/// trailing newline are preserved. Returns the new text and the number of
/// lines that matched.
pub fn rewrite_completion(text: &str, needle: &str, completed: bool) -> (String, usize) {
    let marker = if completed { "x" } else { " " };
    let mut matched = 0;

    let lines: Vec<String> = text
        .split('\n')
        .map(|raw| {
            let line = LineUtils::without_cr(raw);
            let Some(caps) = TASK_RE.captures(line) else {
                return raw.to_string();
            };
            if !line.contains(needle) {
                return raw.to_string();
            }

            matched += 1;
            let span = caps.get(1).map(|m| m.range()).unwrap_or(0..0);
            let mut out = String::with_capacity(raw.len());
            out.push_str(&raw[..span.start]);
            out.push_str(marker);
            out.push_str(&raw[span.end..]);
            out
        })
        .collect();

    (lines.join("\n"), matched)
}
