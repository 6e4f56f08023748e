//! **repobrief** - Collects a repository's task lists, documentation and git
//! state into one report context for LLM summaries
//!
//! Gitignore-style rule sets decide which files are visible; checklists and
//! structured documents are parsed from markdown and exposed as a
//! [`DocumentIndex`] over a pluggable async [`Storage`].

/// Command-line interface with clap integration
pub mod cli;

/// Shell completion generation
pub mod completion;

/// Core model - rule sets, parsers, the document index and report assembly
pub mod core {
    /// Error kinds surfaced by rule compilation and storage access
    pub mod error;
    pub use error::IndexError;

    /// Gitignore-style path filtering (negation, directory rules, last match wins)
    pub mod ignore_rules;
    pub use ignore_rules::{RuleSet, RuleSource};

    /// Checkbox task lists grouped under headings
    pub mod checklist;
    pub use checklist::{Checklist, Task};

    /// Heading-delimited markdown documents
    pub mod markdown;
    pub use markdown::{Section, StructuredDocument};

    /// Discovery, parsing and task updates over a storage backend
    pub mod index;
    pub use index::{DocumentIndex, DocumentMap};

    /// Working-tree snapshot via the git executable
    pub mod git;
    pub use git::GitSnapshot;

    /// Report context assembly and markdown rendering
    pub mod context;
    pub use context::{ReportContext, build_context};
}

/// Infrastructure - configuration, storage and filesystem walking
pub mod infra {
    /// Layered configuration (file + REPOBRIEF__* env)
    pub mod config;
    pub use config::{AppConfig, init as config_init, load_config};

    /// Async storage capability with filesystem and in-memory backends
    pub mod storage;
    pub use storage::{FsStorage, MemoryStorage, Storage};

    /// Glob-driven directory walking
    pub mod walk;
    pub use walk::GlobWalker;

    /// Path and line helpers
    pub mod utils;
}

/// Command handlers behind the CLI subcommands
pub mod cli_ext {
    pub mod config_cmd;
    pub mod context_cmd;
    pub mod docs_cmd;
    pub mod session;
    pub mod todo_cmd;
}

// Strategic re-exports for library consumers
pub use cli::{AppContext, Cli, Commands};
pub use core::{Checklist, DocumentIndex, IndexError, RuleSet, StructuredDocument};
pub use infra::{AppConfig, FsStorage, MemoryStorage, Storage, load_config};
