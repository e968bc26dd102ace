//! `bugsage serve` -- run the JSON API.

use anyhow::{Context, Result};

use bugsage_api::{ServeOptions, start_server};

use crate::cli::ServeArgs;
use crate::context::RuntimeContext;

/// Execute the `bugsage serve` command. Blocks until Ctrl+C.
pub fn run(ctx: &RuntimeContext, args: &ServeArgs) -> Result<()> {
    let (engine, workspace) = ctx.open_engine()?;
    let server = &workspace.config.server;
    let options = ServeOptions {
        host: args.host.clone().unwrap_or_else(|| server.host.clone()),
        port: args.port.unwrap_or(server.port),
        cors: server.cors,
    };

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start async runtime")?;
    runtime.block_on(start_server(engine, options))
}
