//! Shell completion scripts for `brief`.
//!
//! The shell comes from the command line or, when omitted, from `$SHELL`.

use anyhow::{Context, Result};
use clap::{Command, CommandFactory};
use clap_complete::{Shell as CompletionShell, generate, generate_to};
use std::fs;
use std::io::Write;

use crate::cli::{AppContext, Cli, CompletionsArgs, Shell};

/// Installed binary name completions are generated for
const BIN_NAME: &str = "brief";

impl From<Shell> for CompletionShell {
    fn from(shell: Shell) -> Self {
        match shell {
            Shell::Bash => CompletionShell::Bash,
            Shell::Zsh => CompletionShell::Zsh,
            Shell::Fish => CompletionShell::Fish,
            Shell::PowerShell => CompletionShell::PowerShell,
            Shell::Elvish => CompletionShell::Elvish,
        }
    }
}

pub fn run(args: CompletionsArgs, ctx: &AppContext) -> Result<()> {
    let shell = match args.shell {
        Some(shell) => shell.into(),
        None => CompletionShell::from_env()
            .context("cannot detect the shell from $SHELL; name it explicitly")?,
    };

    if args.stdout {
        std::io::stdout()
            .write_all(&render(shell))
            .context("write completion to stdout")?;
        return Ok(());
    }

    let dir = args
        .out_dir
        .ok_or_else(|| anyhow::anyhow!("--out-dir is required unless --stdout is set"))?;

    fs::create_dir_all(&dir).with_context(|| format!("create {}", dir.display()))?;
    let path = generate_to(shell, &mut command(), BIN_NAME, &dir)
        .with_context(|| format!("generate {shell} completion"))?;

    if !ctx.quiet {
        eprintln!("Wrote {shell} completion to {}", path.display());
    }
    Ok(())
}

/// Completion script for `shell`
pub fn render(shell: CompletionShell) -> Vec<u8> {
    let mut buf = Vec::new();
    generate(shell, &mut command(), BIN_NAME, &mut buf);
    buf
}

fn command() -> Command {
    Cli::command().bin_name(BIN_NAME)
}
