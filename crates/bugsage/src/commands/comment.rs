//! `bugsage comment` -- add a comment to a bug.

use anyhow::Result;
use serde_json::json;

use crate::cli::CommentArgs;
use crate::context::RuntimeContext;
use crate::output::output_json;

/// Execute the `bugsage comment` command.
pub fn run(ctx: &RuntimeContext, args: &CommentArgs) -> Result<()> {
    let (engine, _) = ctx.open_engine()?;
    let caller = ctx.caller(&engine)?;

    let comment = engine.add_comment(&caller, args.id, &args.text)?;

    if ctx.json {
        output_json(&json!({"success": true, "comment_id": comment.comment_id}))?;
    } else if !ctx.quiet {
        println!("Added comment #{} to bug #{}", comment.comment_id, args.id);
    }
    Ok(())
}
