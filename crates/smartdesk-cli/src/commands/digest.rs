//! One-off digest emails

use anyhow::{Context, Result};
use chrono::NaiveDate;
use smartdesk_core::dates::today;
use smartdesk_core::digest::{send_document_reminder, send_spending_summary};
use smartdesk_core::{Config, Datastore, Mailer, SentMail};

use super::open_store;
use crate::cli::DigestKind;

pub async fn cmd_digest(config: &Config, kind: DigestKind) -> Result<()> {
    let store = open_store(config)?;
    let mailer = Mailer::from_config(&config.mailer).context(
        "Mailer is not configured. Set NOTIFY_FROM_EMAIL, NOTIFY_TO_EMAIL, NOTIFY_SMTP_HOST, \
         NOTIFY_SMTP_USER and NOTIFY_SMTP_PASS",
    )?;

    let sent = send_digest(
        &store,
        &mailer,
        kind,
        config.documents.expiry_months,
        today(),
    )
    .await?;

    println!("✉️  Sent \"{}\" to {}", sent.subject, sent.to);
    Ok(())
}

/// Build and send one digest
pub async fn send_digest<S: Datastore + ?Sized>(
    store: &S,
    mailer: &Mailer,
    kind: DigestKind,
    default_months: u32,
    today: NaiveDate,
) -> Result<SentMail> {
    let sent = match kind {
        DigestKind::Documents { months } => {
            send_document_reminder(store, mailer, months.unwrap_or(default_months), today)
                .await
                .context("Failed to send documents reminder")?
        }
        DigestKind::Spending => send_spending_summary(store, mailer, today)
            .await
            .context("Failed to send spending summary")?,
    };
    tracing::info!("Sent \"{}\" to {}", sent.subject, sent.to);
    Ok(sent)
}
