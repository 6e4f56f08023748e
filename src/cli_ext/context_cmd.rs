//! CLI command handler for report context assembly.

use anyhow::{Context, Result};

use crate::cli::{AppContext, ContextArgs};
use crate::cli_ext::session::Session;
use crate::core::context::{build_context, render_markdown};
use crate::infra::config::ReportFormat;

/// `context`: assemble and emit the report context
pub async fn run(
    args: ContextArgs,
    ctx: &AppContext,
) -> Result<()>
{
    let session = Session::open(ctx).await?;
    let report = build_context(&session.index, &session.config, !args.no_git).await?;

    let json = args.json || session.config.report.format == ReportFormat::Json;
    let rendered = if json
    {
        serde_json::to_string_pretty(&report)?
    }
    else
    {
        render_markdown(&report)
    };

    match args.output
    {
        Some(path) =>
        {
            std::fs::write(&path, rendered)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            if !ctx.quiet
            {
                eprintln!("Wrote report context to {}", path.display());
            }
        }
        None => println!("{rendered}"),
    }
    Ok(())
}
