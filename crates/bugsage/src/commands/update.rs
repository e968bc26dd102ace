//! `bugsage update` -- change fields of a bug.

use anyhow::Result;
use serde_json::json;

use bugsage_core::enums::{Priority, Status};
use bugsage_core::history::BugPatch;
use bugsage_core::validation::ValidationError;

use crate::cli::UpdateArgs;
use crate::context::RuntimeContext;
use crate::output::output_json;

/// Execute the `bugsage update` command.
pub fn run(ctx: &RuntimeContext, args: &UpdateArgs) -> Result<()> {
    let (engine, _) = ctx.open_engine()?;
    let caller = ctx.caller(&engine)?;

    engine.update_bug_with(&caller, args.id, || patch_from_args(args))?;

    if ctx.json {
        output_json(&json!({"success": true, "message": "Bug updated successfully"}))?;
    } else if !ctx.quiet {
        println!("Updated bug #{}", args.id);
    }
    Ok(())
}

/// Builds the typed patch. Enum values accept CLI spellings such as
/// `in_progress`; the assignee accepts an id or `none`.
fn patch_from_args(args: &UpdateArgs) -> Result<BugPatch, ValidationError> {
    let priority = args
        .priority
        .as_deref()
        .map(|p| Priority::parse_loose(p).ok_or_else(|| ValidationError::InvalidPriority(p.into())))
        .transpose()?;
    let status = args
        .status
        .as_deref()
        .map(|s| Status::parse_loose(s).ok_or_else(|| ValidationError::InvalidStatus(s.into())))
        .transpose()?;
    let assignee_id = args.assignee.as_deref().map(parse_assignee).transpose()?;

    Ok(BugPatch {
        title: args.title.clone(),
        description: args.description.clone(),
        priority,
        status,
        assignee_id,
    })
}

fn parse_assignee(raw: &str) -> Result<Option<i64>, ValidationError> {
    let raw = raw.trim();
    if raw.is_empty() || raw.eq_ignore_ascii_case("none") {
        return Ok(None);
    }
    raw.parse()
        .map(Some)
        .map_err(|_| ValidationError::InvalidAssignee(raw.to_string()))
}
