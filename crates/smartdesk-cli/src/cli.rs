//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Smart Desk - expenses, documents and insurance policies in one place
#[derive(Parser)]
#[command(name = "smartdesk")]
#[command(about = "Personal finance, document and policy tracker", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the web server and the digest scheduler
    Serve {
        /// Port to listen on (overrides PORT)
        #[arg(short, long)]
        port: Option<u16>,

        /// Host to bind to
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Disable authentication (for local development only)
        ///
        /// WARNING: Do not use this flag when exposing the server to a network.
        /// By default, every record and extraction route requires a Supabase
        /// session token or one of SMARTDESK_API_KEYS.
        #[arg(long)]
        no_auth: bool,

        /// Directory containing the built client (e.g., client/dist)
        #[arg(long)]
        static_dir: Option<PathBuf>,
    },

    /// Send a digest email now instead of waiting for the schedule
    Digest {
        #[command(subcommand)]
        kind: DigestKind,
    },

    /// Show which collaborators are configured and how many records exist
    Status,
}

#[derive(Subcommand, Clone, Copy, Debug, PartialEq, Eq)]
pub enum DigestKind {
    /// Documents expiring within the reminder window
    Documents {
        /// Look-ahead in months (defaults to DOCUMENT_EXPIRY_MONTHS)
        #[arg(short, long)]
        months: Option<u32>,
    },

    /// Month-to-date spending summary
    Spending,
}
