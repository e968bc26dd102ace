//! `bugsage init` -- create the `.bugsage` directory, config and database.

use std::env;
use std::fs;

use anyhow::{Context, Result};
use serde_json::json;

use bugsage_config::BugSageConfig;
use bugsage_config::bugsage_dir::{ensure_bugsage_dir, project_root};
use bugsage_config::config::{CONFIG_FILE_NAME, load_config, save_config};
use bugsage_storage::SqliteStore;

use crate::cli::InitArgs;
use crate::context::RuntimeContext;
use crate::output::output_json;

const GITIGNORE_CONTENT: &str = "# BugSage local state
*.db
*.db-journal
*.db-wal
*.db-shm
uploads/
";

/// Execute the `bugsage init` command.
pub fn run(ctx: &RuntimeContext, args: &InitArgs) -> Result<()> {
    let cwd = env::current_dir().context("failed to get current directory")?;
    let dir = ensure_bugsage_dir(&cwd)
        .with_context(|| format!("failed to create .bugsage in {}", cwd.display()))?;

    let gitignore_path = dir.join(".gitignore");
    if !gitignore_path.exists() {
        fs::write(&gitignore_path, GITIGNORE_CONTENT).with_context(|| {
            format!("failed to create .gitignore: {}", gitignore_path.display())
        })?;
    }

    let config_path = dir.join(CONFIG_FILE_NAME);
    let fresh = args.force || !config_path.exists();
    if fresh {
        save_config(&dir, &BugSageConfig::default())
            .with_context(|| format!("failed to write {}", config_path.display()))?;
    }

    let config = load_config(&dir)?;
    let root = project_root(&dir);
    let db_path = ctx
        .db_path
        .clone()
        .unwrap_or_else(|| BugSageConfig::resolve(&root, &config.database.path));
    SqliteStore::open(&db_path)
        .with_context(|| format!("failed to create database: {}", db_path.display()))?;

    let uploads = BugSageConfig::resolve(&root, &config.uploads.dir);
    fs::create_dir_all(&uploads)
        .with_context(|| format!("failed to create uploads dir: {}", uploads.display()))?;

    if ctx.json {
        output_json(&json!({
            "bugsage_dir": dir.display().to_string(),
            "database": db_path.display().to_string(),
            "config_written": fresh,
        }))?;
    } else if !ctx.quiet {
        println!("Initialized BugSage in {}", dir.display());
        println!("  database: {}", db_path.display());
        if !fresh {
            println!("  kept existing {CONFIG_FILE_NAME} (use --force to reset it)");
        }
    }
    Ok(())
}
