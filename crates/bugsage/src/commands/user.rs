//! `bugsage user` -- register and list users.

use anyhow::Result;
use serde_json::json;

use crate::cli::{UserArgs, UserCommands};
use crate::context::RuntimeContext;
use crate::output::{output_json, output_table};

/// Execute the `bugsage user` command.
pub fn run(ctx: &RuntimeContext, args: &UserArgs) -> Result<()> {
    let (engine, _) = ctx.open_engine()?;

    match &args.command {
        UserCommands::Add {
            name,
            email,
            password,
            role,
        } => {
            let user = engine.register_user(name, email, password, role.as_deref())?;
            if ctx.json {
                output_json(&json!({"success": true, "user_id": user.user_id}))?;
            } else if !ctx.quiet {
                println!("Created user {} ({}, {})", user.user_id, user.name, user.role);
            }
        }
        UserCommands::List => {
            let users = engine.list_users()?;
            if ctx.json {
                output_json(&users)?;
            } else {
                let rows: Vec<Vec<String>> = users
                    .iter()
                    .map(|u| {
                        vec![
                            u.user_id.to_string(),
                            u.name.clone(),
                            u.email.clone(),
                            u.role.to_string(),
                        ]
                    })
                    .collect();
                output_table(&["ID", "Name", "Email", "Role"], &rows);
            }
        }
    }
    Ok(())
}
