//! CLI command handler for documentation listing.

use anyhow::Result;

use crate::cli::{AppContext, DocsArgs};
use crate::cli_ext::session::{Paint, Session};

/// `docs`: print every discovered document with its section outline
pub async fn run(
    args: DocsArgs,
    ctx: &AppContext,
) -> Result<()>
{
    let session = Session::open(ctx).await?;
    let docs = session
        .index
        .read_documents(&session.config.docs.patterns)
        .await?;

    if args.json
    {
        println!("{}", serde_json::to_string_pretty(&docs)?);
        return Ok(());
    }

    let paint = Paint::new(ctx);
    for (path, doc) in &docs
    {
        println!(
            "{} {}",
            paint.heading(path),
            paint.dim(&format!("({} words)", doc.word_count()))
        );
        for section in &doc.sections
        {
            let indent = "  ".repeat(section.level);
            println!(
                "{indent}{} {}",
                section.title,
                paint.dim(&format!("({} lines)", section.content.len()))
            );
        }
    }
    Ok(())
}
