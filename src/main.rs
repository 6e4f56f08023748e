use std::process::ExitCode;

use anyhow::Result;
use clap::Parser;
use repobrief::cli::{AppContext, Cli, Commands};
use repobrief::cli_ext::{config_cmd, context_cmd, docs_cmd, session, todo_cmd};
use repobrief::core::error::IndexError;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    install_tracing(cli.verbose);

    // Build a context once, pass everywhere
    let ctx = AppContext {
        root: cli.root.clone(),
        quiet: cli.quiet,
        no_color: cli.no_color,
    };

    match dispatch(cli.command, &ctx).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::from(exit_code(&e))
        }
    }
}

async fn dispatch(command: Commands, ctx: &AppContext) -> Result<()> {
    match command {
        Commands::Todos(args) => todo_cmd::run_list(args, ctx).await,
        Commands::Docs(args) => docs_cmd::run(args, ctx).await,
        Commands::Check(args) => todo_cmd::run_set(args, true, ctx).await,
        Commands::Uncheck(args) => todo_cmd::run_set(args, false, ctx).await,
        Commands::Context(args) => context_cmd::run(args, ctx).await,
        Commands::Init(args) => {
            let root = session::resolve_root(&ctx.root)?;
            repobrief::infra::config::init(args, &root, ctx)
        }
        Commands::Config(args) => config_cmd::run(args, ctx),
        Commands::Completions(args) => repobrief::completion::run(args, ctx),
    }
}

/// Logs go to stderr; RUST_LOG takes precedence over --verbose
fn install_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .try_init();
}

/// Index errors anywhere in the chain pick the exit code
fn exit_code(err: &anyhow::Error) -> u8 {
    err.chain()
        .find_map(|c| c.downcast_ref::<IndexError>())
        .map_or(1, IndexError::exit_code)
}
