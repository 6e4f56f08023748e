use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Shared application context for global flags
#[derive(Clone, Debug)]
pub struct AppContext {
    pub root: PathBuf,  // global --root
    pub quiet: bool,    // global --quiet
    pub no_color: bool, // global --no-color
}

#[derive(Parser)]
#[command(name = "brief")]
#[command(
    about = "Collects a repository's task lists, docs and git state into a report context for LLM summaries"
)]
#[command(version, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Repository root to operate on
    #[arg(long, global = true, default_value = ".")]
    pub root: PathBuf,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Suppress non-essential output
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Enable debug logging (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List task-list files and their tasks
    Todos(TodosArgs),

    /// List documentation files and their sections
    Docs(DocsArgs),

    /// Mark matching tasks as done
    Check(TaskArgs),

    /// Mark matching tasks as not done
    Uncheck(TaskArgs),

    /// Assemble the report context (git state, tasks, docs)
    Context(ContextArgs),

    /// Initialize a repobrief.toml config file
    Init(InitArgs),

    /// Read or change configuration values
    Config(ConfigArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}

#[derive(Parser, Debug)]
pub struct TodosArgs {
    /// Only show tasks that are not done
    #[arg(long)]
    pub pending: bool,

    /// Emit JSON instead of text
    #[arg(long)]
    pub json: bool,
}

#[derive(Parser, Debug)]
pub struct DocsArgs {
    /// Emit JSON instead of text
    #[arg(long)]
    pub json: bool,
}

#[derive(Parser, Debug)]
pub struct TaskArgs {
    /// Task-list file, relative to the root
    pub path: String,

    /// Text that identifies the task line (every matching line is updated)
    pub needle: String,
}

#[derive(Parser, Debug)]
pub struct ContextArgs {
    /// Emit JSON (overrides report.format)
    #[arg(long)]
    pub json: bool,

    /// Skip the git snapshot
    #[arg(long)]
    pub no_git: bool,

    /// Write to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Parser, Debug)]
pub struct InitArgs {
    /// Overwrite existing config file
    #[arg(long)]
    pub force: bool,
}

#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum ConfigSubcommand {
    /// Print a value by dotted key (e.g. git.recent_commits)
    Get {
        key: String,
    },

    /// Set a value by dotted key and save the config file
    Set {
        key: String,
        value: String,
    },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

#[derive(Parser)]
pub struct CompletionsArgs {
    /// Target shell (detected from $SHELL when omitted)
    #[arg(value_enum)]
    pub shell: Option<Shell>,

    /// Output directory; required unless --stdout is set
    #[arg(long)]
    pub out_dir: Option<PathBuf>,

    /// Print completion script to stdout instead of a file
    #[arg(long)]
    pub stdout: bool,
}
