//! `bugsage history` -- the audit trail of a bug.

use anyhow::Result;

use crate::cli::IdArgs;
use crate::context::RuntimeContext;
use crate::output::{format_history_line, output_json};

/// Execute the `bugsage history` command.
pub fn run(ctx: &RuntimeContext, args: &IdArgs) -> Result<()> {
    let (engine, _) = ctx.open_engine()?;
    ctx.caller(&engine)?;

    let entries = engine.bug_history(args.id)?;
    if ctx.json {
        output_json(&entries)?;
    } else if entries.is_empty() {
        if !ctx.quiet {
            println!("No changes recorded for bug #{}", args.id);
        }
    } else {
        for entry in &entries {
            println!("{}", format_history_line(entry));
        }
    }
    Ok(())
}
