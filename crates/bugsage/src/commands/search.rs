//! `bugsage search` -- substring search over titles and descriptions.

use anyhow::Result;
use serde_json::json;

use crate::cli::SearchArgs;
use crate::context::RuntimeContext;
use crate::output::{BUG_HEADERS, format_bug_row, output_json, output_table};

/// Execute the `bugsage search` command.
pub fn run(ctx: &RuntimeContext, args: &SearchArgs) -> Result<()> {
    let (engine, _) = ctx.open_engine()?;
    ctx.caller(&engine)?;

    let results = engine.search_bugs(&args.query)?;

    if ctx.json {
        output_json(&json!({"results": results}))?;
    } else if results.is_empty() {
        if !ctx.quiet {
            println!("No bugs match {:?}", args.query.trim());
        }
    } else {
        let rows: Vec<Vec<String>> = results.iter().map(format_bug_row).collect();
        output_table(BUG_HEADERS, &rows);
    }
    Ok(())
}
