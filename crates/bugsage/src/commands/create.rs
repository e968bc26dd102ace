//! `bugsage create` -- report a new bug.

use anyhow::Result;
use serde_json::json;

use bugsage_core::bug::NewBug;
use bugsage_lifecycle::CreateOutcome;
use bugsage_ui::styles::render_warn;

use crate::cli::CreateArgs;
use crate::context::RuntimeContext;
use crate::output::output_json;

/// Execute the `bugsage create` command.
///
/// When similar bugs exist and `--force` is not given, nothing is written;
/// the candidates are printed and the command still succeeds.
pub fn run(ctx: &RuntimeContext, args: &CreateArgs) -> Result<()> {
    let (engine, _) = ctx.open_engine()?;
    let caller = ctx.caller(&engine)?;

    let new_bug = NewBug {
        title: args.title.clone(),
        description: args.description.clone(),
        priority: args.priority.clone(),
        project_id: args.project,
        assignee_id: args.assignee,
        force_create: args.force,
    };

    match engine.create_bug(&caller, &new_bug)? {
        CreateOutcome::Created { bug_id } => {
            if ctx.json {
                output_json(&json!({
                    "success": true,
                    "bug_id": bug_id,
                    "message": "Bug created successfully",
                }))?;
            } else if !ctx.quiet {
                println!("Created bug #{bug_id}");
            }
        }
        CreateOutcome::Duplicates(candidates) => {
            if ctx.json {
                output_json(&json!({
                    "warning": "Similar bugs found",
                    "duplicates": candidates,
                }))?;
            } else {
                println!("{}", render_warn("Similar bugs found; nothing was created:"));
                for c in &candidates {
                    println!("  #{} {}", c.bug_id, c.title);
                }
                println!("Re-run with --force to create it anyway.");
            }
        }
    }
    Ok(())
}
