//! CLI command handlers for task lists: listing and completion updates.

use anyhow::Result;
use tracing::instrument;

use crate::cli::{AppContext, TaskArgs, TodosArgs};
use crate::cli_ext::session::{Paint, Session};
use crate::core::checklist::{Checklist, Task};
use crate::core::index::DocumentMap;

/// `todos`: print every discovered checklist
pub async fn run_list(
    args: TodosArgs,
    ctx: &AppContext,
) -> Result<()>
{
    let session = Session::open(ctx).await?;
    let lists = session
        .index
        .read_checklists(&session.config.todo.patterns)
        .await?;

    if args.json
    {
        println!("{}", serde_json::to_string_pretty(&lists)?);
        return Ok(());
    }

    print!("{}", render_lists(&lists, args.pending, &Paint::new(ctx)));
    Ok(())
}

/// Text view grouped by file then section
pub fn render_lists(
    lists: &DocumentMap<Checklist>,
    pending_only: bool,
    paint: &Paint,
) -> String
{
    let mut out = String::new();

    for (path, list) in lists
    {
        out.push_str(&format!(
            "{} {}\n",
            paint.heading(path),
            paint.dim(&format!(
                "({}/{} done, {:.0}%)",
                list.completed_count(),
                list.tasks.len(),
                list.progress() * 100.0
            ))
        ));

        for section in &list.sections
        {
            let tasks: Vec<&Task> = if pending_only
            {
                list.pending()
                    .filter(|t| &t.section == section)
                    .collect()
            }
            else
            {
                list.tasks_in(section)
                    .collect()
            };
            if tasks.is_empty()
            {
                continue;
            }

            out.push_str(&format!("  {section}\n"));
            for task in tasks
            {
                if task.completed
                {
                    out.push_str(&format!("    {} {}\n", paint.done("[x]"), task.description));
                }
                else
                {
                    out.push_str(&format!("    [ ] {}\n", task.description));
                }
            }
        }
    }

    out
}

/// `check` / `uncheck`: rewrite matching task lines in place
#[instrument(skip(ctx))]
pub async fn run_set(
    args: TaskArgs,
    completed: bool,
    ctx: &AppContext,
) -> Result<()>
{
    let session = Session::open(ctx).await?;
    let changed = session
        .index
        .set_task_completion(&args.path, &args.needle, completed)
        .await?;

    if !changed
    {
        anyhow::bail!("no task in {} matches `{}`", args.path, args.needle);
    }

    if !ctx.quiet
    {
        let state = if completed { "done" } else { "not done" };
        println!("Marked tasks matching `{}` in {} as {state}", args.needle, args.path);
    }
    Ok(())
}
