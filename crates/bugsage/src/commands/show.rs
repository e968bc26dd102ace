//! `bugsage show` -- display a bug with its comments, attachments and history.

use anyhow::Result;

use crate::cli::IdArgs;
use crate::context::RuntimeContext;
use crate::output::{format_bug_detail, output_json};

/// Execute the `bugsage show` command.
pub fn run(ctx: &RuntimeContext, args: &IdArgs) -> Result<()> {
    let (engine, _) = ctx.open_engine()?;
    ctx.caller(&engine)?;

    let detail = engine.bug_detail(args.id)?;
    if ctx.json {
        output_json(&detail)?;
    } else {
        println!("{}", format_bug_detail(&detail));
    }
    Ok(())
}
