//! Structured documents: generic markdown split into header-delimited
//! sections. A header that introduces no non-blank line before the next
//! header is dropped, so a headers-only file has no sections and no title.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::infra::utils::LineUtils;

static HEADER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(#+)\s+(.+)$").expect("header regex"));

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub title: String,
    /// Number of leading `#`
    pub level: usize,
    /// Non-blank lines up to the next header, verbatim
    pub content: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructuredDocument {
    /// Title of the first emitted section, empty if none
    pub title: String,
    pub sections: Vec<Section>,
    /// Original source text
    pub content: String,
}

impl StructuredDocument {
    pub fn parse(text: &str) -> Self {
        let mut sections = Vec::new();
        let mut open: Option<Section> = None;

        for raw in text.split('\n') {
            let line = LineUtils::without_cr(raw);

            if let Some(caps) = HEADER_RE.captures(line) {
                emit(&mut sections, open.take());
                open = Some(Section {
                    title: caps[2].trim().to_string(),
                    level: caps[1].len(),
                    content: Vec::new(),
                });
            } else if !LineUtils::is_blank(line) {
                // Lines before the first header have no section to join
                if let Some(section) = open.as_mut() {
                    section.content.push(line.to_string());
                }
            }
        }
        emit(&mut sections, open);

        Self {
            title: sections
                .first()
                .map(|s: &Section| s.title.clone())
                .unwrap_or_default(),
            sections,
            content: text.to_string(),
        }
    }

    /// First section with exactly this title
    pub fn section(&self, title: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.title == title)
    }

    pub fn word_count(&self) -> usize {
        self.content.split_whitespace().count()
    }
}

fn emit(sections: &mut Vec<Section>, section: Option<Section>) {
    if let Some(s) = section
        && !s.title.is_empty()
        && !s.content.is_empty()
    {
        sections.push(s);
    }
}
