//! CLI command implementations
//!
//! Commands are organized by domain:
//! - `digest` - One-off digest emails (documents, spending)
//! - `serve` - Web server command
//! - `status` - Configuration and record counts

pub mod digest;
pub mod serve;
pub mod status;

// Re-export command functions for main.rs
pub use digest::*;
pub use serve::*;
pub use status::*;

use anyhow::{Context, Result};
use smartdesk_core::{Config, Store};

/// Open the configured datastore, failing with a hint when it is missing
pub fn open_store(config: &Config) -> Result<Store> {
    Store::from_config(&config.supabase)
        .context("Supabase is not configured. Set SUPABASE_URL and SUPABASE_SERVICE_ROLE_KEY")
}

/// Mask a secret for display, keeping the first few characters
pub fn mask(secret: &str) -> String {
    let shown: String = secret.chars().take(4).collect();
    if secret.chars().count() <= 4 {
        "***".to_string()
    } else {
        format!("{}***", shown)
    }
}
