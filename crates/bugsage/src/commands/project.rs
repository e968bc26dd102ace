//! `bugsage project` -- create and list projects.

use anyhow::Result;
use serde_json::json;

use crate::cli::{ProjectArgs, ProjectCommands};
use crate::context::RuntimeContext;
use crate::output::{output_json, output_table};

/// Execute the `bugsage project` command.
pub fn run(ctx: &RuntimeContext, args: &ProjectArgs) -> Result<()> {
    let (engine, _) = ctx.open_engine()?;

    match &args.command {
        ProjectCommands::Add { name, description } => {
            let project = engine.create_project(name, description)?;
            if ctx.json {
                output_json(&json!({"success": true, "project_id": project.project_id}))?;
            } else if !ctx.quiet {
                println!("Created project {} ({})", project.project_id, project.project_name);
            }
        }
        ProjectCommands::List => {
            let projects = engine.list_projects()?;
            if ctx.json {
                output_json(&projects)?;
            } else {
                let rows: Vec<Vec<String>> = projects
                    .iter()
                    .map(|p| {
                        vec![
                            p.project_id.to_string(),
                            p.project_name.clone(),
                            p.description.clone(),
                        ]
                    })
                    .collect();
                output_table(&["ID", "Name", "Description"], &rows);
            }
        }
    }
    Ok(())
}
