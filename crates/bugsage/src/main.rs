//! `bugsage` -- bug tracker CLI.
//!
//! Parses arguments with clap, builds the runtime context, and dispatches
//! to a command handler.

mod cli;
mod commands;
mod context;
mod output;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use bugsage_lifecycle::{ErrorKind, LifecycleError};

use cli::{Cli, Commands};
use context::RuntimeContext;

/// Crates whose events `-v` turns up to debug.
const VERBOSE_FILTER: &str =
    "bugsage=debug,bugsage_api=debug,bugsage_lifecycle=debug,bugsage_storage=debug,tower_http=debug";

fn main() {
    let cli = Cli::parse();
    let ctx = RuntimeContext::from_global_args(&cli.global);

    init_logging(&ctx);

    let result = match &cli.command {
        Some(Commands::Init(args)) => commands::init::run(&ctx, args),
        Some(Commands::User(args)) => commands::user::run(&ctx, args),
        Some(Commands::Project(args)) => commands::project::run(&ctx, args),
        Some(Commands::Create(args)) => commands::create::run(&ctx, args),
        Some(Commands::Update(args)) => commands::update::run(&ctx, args),
        Some(Commands::Status(args)) => commands::status_cmd::run(&ctx, args),
        Some(Commands::Comment(args)) => commands::comment::run(&ctx, args),
        Some(Commands::Attach(args)) => commands::attach::run(&ctx, args),
        Some(Commands::Show(args)) => commands::show::run(&ctx, args),
        Some(Commands::History(args)) => commands::history::run(&ctx, args),
        Some(Commands::List(args)) => commands::list::run(&ctx, args),
        Some(Commands::Search(args)) => commands::search::run(&ctx, args),
        Some(Commands::Dashboard(args)) => commands::dashboard::run(&ctx, args),
        Some(Commands::Serve(args)) => commands::serve::run(&ctx, args),
        Some(Commands::Completion(args)) => commands::completion::run(args),
        None => {
            use clap::CommandFactory;
            Cli::command().print_help().ok();
            println!();
            Ok(())
        }
    };

    if let Err(e) = result {
        let message = error_message(&e);
        if ctx.json {
            let err_json = serde_json::json!({ "error": message });
            if let Ok(s) = serde_json::to_string_pretty(&err_json) {
                eprintln!("{s}");
            }
        } else {
            eprintln!("Error: {message}");
        }
        std::process::exit(1);
    }
}

/// `-q` installs nothing; `-v` forces debug for our crates; otherwise
/// `RUST_LOG` wins over the config's `logging.filter`.
fn init_logging(ctx: &RuntimeContext) {
    if ctx.quiet {
        return;
    }
    let filter = if ctx.verbose {
        EnvFilter::new(VERBOSE_FILTER)
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(ctx.log_filter()))
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// The context chain joined with `: `, stopping at an internal engine
/// error so storage details stay in the log.
fn error_message(err: &anyhow::Error) -> String {
    let mut parts = Vec::new();
    for cause in err.chain() {
        parts.push(cause.to_string());
        if cause
            .downcast_ref::<LifecycleError>()
            .is_some_and(|e| e.kind() == ErrorKind::Internal)
        {
            break;
        }
    }
    parts.join(": ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Context;
    use bugsage_storage::StorageError;

    #[test]
    fn internal_errors_hide_storage_detail() {
        let err: anyhow::Result<()> =
            Err(LifecycleError::Store(StorageError::Connection("disk I/O error".into())).into());
        let err = err.context("failed to list bugs").unwrap_err();
        assert_eq!(error_message(&err), "failed to list bugs: internal storage error");
    }

    #[test]
    fn validation_errors_keep_context() {
        let err = anyhow::Error::from(LifecycleError::Validation("Title is required".into()));
        assert_eq!(error_message(&err), "Title is required");
    }
}
