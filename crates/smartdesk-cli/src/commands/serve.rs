//! Server command implementation

use std::path::Path;

use anyhow::{Context, Result};
use smartdesk_core::Config;

pub async fn cmd_serve(
    mut config: Config,
    host: &str,
    port: Option<u16>,
    no_auth: bool,
    static_dir: Option<&Path>,
) -> Result<()> {
    if let Some(port) = port {
        config.port = port;
    }

    println!("🚀 Starting Smart Desk web server...");
    println!("   Listening: http://{}:{}", host, config.port);
    if let Some(dir) = static_dir {
        println!("   Static files: {}", dir.display());
    }

    if no_auth {
        println!();
        println!("   ⚠️  Authentication DISABLED - do not expose to network!");
    } else {
        if config.supabase.credentials().is_some() {
            println!("   🔐 Authentication: Supabase session tokens");
        }
        if !config.api_keys.is_empty() {
            println!(
                "   🔑 API keys: {} configured (SMARTDESK_API_KEYS)",
                config.api_keys.len()
            );
        }
        if config.supabase.credentials().is_none() && config.api_keys.is_empty() {
            println!("   ❌ Authentication: nothing configured, protected routes will answer 500");
        }
    }
    if !config.allowed_origins.is_empty() {
        println!("   🌐 CORS origins: {}", config.allowed_origins.join(", "));
    }
    println!();
    println!("   Press Ctrl+C to stop");

    let server = smartdesk_server::ServerConfig {
        require_auth: !no_auth,
        allowed_origins: config.allowed_origins.clone(),
    };

    let static_dir = static_dir
        .map(|p| p.to_str().context("static dir path must be valid UTF-8"))
        .transpose()?;
    smartdesk_server::serve(config, host, static_dir, server).await?;

    Ok(())
}
