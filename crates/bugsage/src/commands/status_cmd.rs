//! `bugsage status` -- move a bug to a new status.

use anyhow::Result;
use serde_json::json;

use bugsage_core::enums::Status;

use crate::cli::StatusArgs;
use crate::context::RuntimeContext;
use crate::output::output_json;

/// Execute the `bugsage status` command.
pub fn run(ctx: &RuntimeContext, args: &StatusArgs) -> Result<()> {
    let (engine, _) = ctx.open_engine()?;
    let caller = ctx.caller(&engine)?;

    // CLI spellings (`in_progress`) map onto the canonical names; anything
    // else goes through unchanged so the engine reports it.
    let status = Status::parse_loose(&args.status)
        .map(|s| s.as_str().to_string())
        .unwrap_or_else(|| args.status.clone());

    let changed = engine.update_status(&caller, args.id, &status)?;

    if ctx.json {
        let message = if changed {
            "Status updated successfully"
        } else {
            "Status unchanged"
        };
        output_json(&json!({"success": true, "message": message, "changed": changed}))?;
    } else if !ctx.quiet {
        if changed {
            println!("Bug #{} is now {status}", args.id);
        } else {
            println!("Bug #{} is already {status}", args.id);
        }
    }
    Ok(())
}
