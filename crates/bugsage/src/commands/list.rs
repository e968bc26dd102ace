//! `bugsage list` -- page through bugs with filters.

use anyhow::Result;

use bugsage_core::enums::{Priority, Status};
use bugsage_core::filter::{AssigneeFilter, BugFilter};
use bugsage_core::validation::ValidationError;
use bugsage_ui::styles::render_muted;

use crate::cli::ListArgs;
use crate::context::RuntimeContext;
use crate::output::{BUG_HEADERS, format_bug_row, output_json, output_table};

/// Execute the `bugsage list` command.
pub fn run(ctx: &RuntimeContext, args: &ListArgs) -> Result<()> {
    let filter = filter_from_args(args)?;
    let (engine, _) = ctx.open_engine()?;
    let caller = ctx.caller(&engine)?;

    let page = engine.list_bugs(&caller, &filter)?;

    if ctx.json {
        output_json(&page)?;
        return Ok(());
    }

    if page.bugs.is_empty() {
        if !ctx.quiet {
            println!("No bugs found.");
        }
        return Ok(());
    }

    let rows: Vec<Vec<String>> = page.bugs.iter().map(format_bug_row).collect();
    output_table(BUG_HEADERS, &rows);
    if !ctx.quiet {
        let p = &page.pagination;
        println!(
            "{}",
            render_muted(&format!(
                "page {} of {} ({} bugs)",
                p.current_page,
                p.total_pages.max(1),
                p.total_bugs
            ))
        );
    }
    Ok(())
}

fn filter_from_args(args: &ListArgs) -> Result<BugFilter, ValidationError> {
    let status = args
        .status
        .as_deref()
        .map(|s| Status::parse_loose(s).ok_or_else(|| ValidationError::InvalidStatus(s.into())))
        .transpose()?;
    let priority = args
        .priority
        .as_deref()
        .map(|p| Priority::parse_loose(p).ok_or_else(|| ValidationError::InvalidPriority(p.into())))
        .transpose()?;
    let assignee = args
        .assignee
        .as_deref()
        .map(|a| AssigneeFilter::parse(a).ok_or_else(|| ValidationError::InvalidAssignee(a.into())))
        .transpose()?;

    Ok(BugFilter {
        status,
        priority,
        assignee,
        project_id: args.project,
        page: args.page,
        per_page: args.per_page,
    })
}
