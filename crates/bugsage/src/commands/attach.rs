//! `bugsage attach` -- store a file against a bug.

use anyhow::Result;

use crate::cli::AttachArgs;
use crate::context::RuntimeContext;
use crate::output::output_json;

/// Execute the `bugsage attach` command.
pub fn run(ctx: &RuntimeContext, args: &AttachArgs) -> Result<()> {
    let (engine, _) = ctx.open_engine()?;
    let caller = ctx.caller(&engine)?;

    let attachment = engine.attach_file(&caller, args.id, &args.file)?;

    if ctx.json {
        output_json(&attachment)?;
    } else if !ctx.quiet {
        println!(
            "Attached {} ({} bytes) to bug #{}",
            attachment.filename, attachment.file_size, args.id
        );
    }
    Ok(())
}
