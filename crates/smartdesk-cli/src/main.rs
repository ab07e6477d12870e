//! Smart Desk CLI
//!
//! Usage:
//!   smartdesk serve --port 3000        Start web server and digest scheduler
//!   smartdesk digest documents         Send the expiring documents reminder now
//!   smartdesk digest spending          Send the spending summary now
//!   smartdesk status                   Show configuration and record counts

mod cli;
mod commands;

#[cfg(test)]
mod tests;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;
use smartdesk_core::Config;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    let config = Config::from_env();

    match cli.command {
        Commands::Serve {
            port,
            host,
            no_auth,
            static_dir,
        } => commands::cmd_serve(config, &host, port, no_auth, static_dir.as_deref()).await,
        Commands::Digest { kind } => commands::cmd_digest(&config, kind).await,
        Commands::Status => commands::cmd_status(&config).await,
    }
}
