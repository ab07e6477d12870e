//! Status command implementation

use anyhow::Result;
use smartdesk_core::{AIBackend, AIClient, Config, Datastore, Mailer};

use super::mask;

/// Record counts per table
#[derive(Debug, Default, PartialEq, Eq)]
pub struct RecordCounts {
    pub transactions: usize,
    pub budgets: usize,
    pub documents: usize,
    pub policies: usize,
}

pub async fn count_records<S: Datastore + ?Sized>(
    store: &S,
) -> smartdesk_core::Result<RecordCounts> {
    let (transactions, budgets, documents, policies) = tokio::try_join!(
        store.list_transactions(),
        store.list_budgets(),
        store.list_documents(),
        store.list_policies(),
    )?;
    Ok(RecordCounts {
        transactions: transactions.len(),
        budgets: budgets.len(),
        documents: documents.len(),
        policies: policies.len(),
    })
}

/// One line per collaborator describing its configuration
pub fn config_summary(config: &Config) -> Vec<String> {
    let mut lines = Vec::new();

    match config.supabase.credentials() {
        Some((url, key)) => lines.push(format!("🗄️  Supabase: {} (key {})", url, mask(key))),
        None => lines.push("❌ Supabase: not configured".to_string()),
    }

    match &config.openai.api_key {
        Some(key) => lines.push(format!(
            "🤖 OpenAI: {} at {} (key {}{})",
            config.openai.model,
            config.openai.base_url,
            mask(key),
            if config.openai.pdf_enabled { ", PDF enabled" } else { "" }
        )),
        None => lines.push("⚪ OpenAI: not configured (extraction disabled)".to_string()),
    }

    if config.mailer.is_complete() {
        lines.push(format!(
            "✉️  Mailer: {}:{} → {}",
            config.mailer.host.as_deref().unwrap_or_default(),
            config.mailer.port,
            config.mailer.to.as_deref().unwrap_or_default()
        ));
    } else {
        lines.push("⚪ Mailer: not configured (digests disabled)".to_string());
    }

    lines.push(format!(
        "📅 Document reminder window: {} months",
        config.documents.expiry_months
    ));
    lines.push(format!("🔑 API keys: {}", config.api_keys.len()));
    lines
}

pub async fn cmd_status(config: &Config) -> Result<()> {
    println!();
    println!("📊 Smart Desk Status");
    println!("   ─────────────────────────────────────────────────────────────");
    println!("   Port: {}", config.port);
    for line in config_summary(config) {
        println!("   {}", line);
    }

    if let Some(store) = smartdesk_core::Store::from_config(&config.supabase) {
        println!();
        match count_records(&store).await {
            Ok(counts) => {
                println!("   Transactions: {}", counts.transactions);
                println!("   Budgets: {}", counts.budgets);
                println!("   Documents: {}", counts.documents);
                println!("   Policies: {}", counts.policies);
            }
            Err(e) => {
                tracing::warn!("Failed to count records: {}", e);
                println!("   ❌ Error reading datastore: {}", e);
            }
        }
    }

    if let Some(ai) = AIClient::from_config(&config.openai) {
        if ai.health_check().await {
            println!("   🤖 Model API reachable");
        } else {
            println!("   ❌ Model API not responding at {}", ai.host());
        }
    }

    if Mailer::from_config(&config.mailer).is_none() && config.mailer.is_complete() {
        println!("   ❌ Mailer settings present but an address did not parse");
    }

    println!();
    Ok(())
}
