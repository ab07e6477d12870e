//! CLI command tests

use chrono::NaiveDate;
use clap::Parser;
use smartdesk_core::config::MailerConfig;
use smartdesk_core::digest::{DOCUMENT_REMINDER_SUBJECT, SPENDING_SUMMARY_SUBJECT};
use smartdesk_core::{Config, Datastore, Mailer, NewDocument, NewTransaction, Store};

use crate::cli::{Cli, Commands, DigestKind};
use crate::commands::{self, mask};

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 5, 20).unwrap()
}

fn document(title: &str, expires: &str) -> NewDocument {
    NewDocument {
        title: title.to_string(),
        doc_type: "passport".to_string(),
        expiration_date: expires.to_string(),
        number: String::new(),
        notes: String::new(),
        source: "Manual".to_string(),
        email: String::new(),
    }
}

fn expense(date: &str, category: &str, amount: f64) -> NewTransaction {
    NewTransaction {
        date: date.to_string(),
        amount,
        currency: "USD".to_string(),
        category: category.to_string(),
        payment_method: "Cash".to_string(),
        description: String::new(),
        source: "Manual".to_string(),
    }
}

// ========== Argument Parsing ==========

#[test]
fn test_parse_serve_defaults() {
    let cli = Cli::try_parse_from(["smartdesk", "serve"]).unwrap();
    assert!(!cli.verbose);
    match cli.command {
        Commands::Serve {
            port,
            host,
            no_auth,
            static_dir,
        } => {
            assert_eq!(port, None);
            assert_eq!(host, "127.0.0.1");
            assert!(!no_auth);
            assert!(static_dir.is_none());
        }
        _ => panic!("expected serve"),
    }
}

#[test]
fn test_parse_serve_flags() {
    let cli = Cli::try_parse_from([
        "smartdesk",
        "serve",
        "--port",
        "8080",
        "--no-auth",
        "--static-dir",
        "client/dist",
        "-v",
    ])
    .unwrap();
    assert!(cli.verbose);
    match cli.command {
        Commands::Serve {
            port,
            no_auth,
            static_dir,
            ..
        } => {
            assert_eq!(port, Some(8080));
            assert!(no_auth);
            assert_eq!(static_dir.unwrap().to_str(), Some("client/dist"));
        }
        _ => panic!("expected serve"),
    }
}

#[test]
fn test_parse_digest_kinds() {
    let cli = Cli::try_parse_from(["smartdesk", "digest", "documents", "--months", "3"]).unwrap();
    assert!(matches!(
        cli.command,
        Commands::Digest {
            kind: DigestKind::Documents { months: Some(3) }
        }
    ));

    let cli = Cli::try_parse_from(["smartdesk", "digest", "spending"]).unwrap();
    assert!(matches!(
        cli.command,
        Commands::Digest {
            kind: DigestKind::Spending
        }
    ));

    assert!(Cli::try_parse_from(["smartdesk", "digest", "weekly"]).is_err());
}

// ========== Digest Command Tests ==========

#[tokio::test]
async fn test_send_document_digest_uses_default_window() {
    let store = Store::memory();
    store.create_document(&document("Passport", "2024-09-01")).await.unwrap();
    store.create_document(&document("Visa", "2025-06-01")).await.unwrap();
    let mailer = Mailer::memory();

    let sent = commands::send_digest(
        &store,
        &mailer,
        DigestKind::Documents { months: None },
        8,
        today(),
    )
    .await
    .unwrap();

    assert_eq!(sent.subject, DOCUMENT_REMINDER_SUBJECT);
    assert!(sent.html.contains("within 8 months"));
    assert!(sent.html.contains("Passport"));
    assert!(!sent.html.contains("Visa"));
}

#[tokio::test]
async fn test_send_document_digest_months_override() {
    let store = Store::memory();
    store.create_document(&document("Visa", "2025-06-01")).await.unwrap();
    let mailer = Mailer::memory();

    let sent = commands::send_digest(
        &store,
        &mailer,
        DigestKind::Documents { months: Some(24) },
        8,
        today(),
    )
    .await
    .unwrap();

    assert!(sent.html.contains("within 24 months"));
    assert!(sent.html.contains("Visa"));
}

#[tokio::test]
async fn test_send_spending_digest() {
    let store = Store::memory();
    store
        .create_transaction(&expense("2024-05-02", "Food", 30.0))
        .await
        .unwrap();
    store
        .create_transaction(&expense("2024-04-30", "Rent", 900.0))
        .await
        .unwrap();
    let mailer = Mailer::memory();

    let sent = commands::send_digest(&store, &mailer, DigestKind::Spending, 8, today())
        .await
        .unwrap();

    assert_eq!(sent.subject, SPENDING_SUMMARY_SUBJECT);
    assert!(sent.html.contains("30.00"));
    assert!(!sent.html.contains("Rent"));

    let Mailer::Memory(inbox) = &mailer else {
        panic!("expected memory mailer");
    };
    assert_eq!(inbox.sent().len(), 1);
}

#[tokio::test]
async fn test_digest_requires_datastore() {
    let err = commands::cmd_digest(&Config::default(), DigestKind::Spending)
        .await
        .unwrap_err();
    assert!(err.to_string().starts_with("Supabase is not configured"));
}

// ========== Status Command Tests ==========

#[tokio::test]
async fn test_count_records() {
    let store = Store::memory();
    store
        .create_transaction(&expense("2024-05-02", "Food", 30.0))
        .await
        .unwrap();
    store.create_document(&document("Passport", "2030-01-01")).await.unwrap();

    let counts = commands::count_records(&store).await.unwrap();
    assert_eq!(
        counts,
        commands::RecordCounts {
            transactions: 1,
            budgets: 0,
            documents: 1,
            policies: 0,
        }
    );
}

#[test]
fn test_config_summary_unconfigured() {
    let lines = commands::config_summary(&Config::default());
    assert_eq!(lines[0], "❌ Supabase: not configured");
    assert!(lines[1].contains("OpenAI: not configured"));
    assert!(lines[2].contains("Mailer: not configured"));
    assert_eq!(lines[3], "📅 Document reminder window: 8 months");
}

#[test]
fn test_config_summary_masks_secrets() {
    let mut config = Config::default();
    config.supabase.url = Some("https://abc.supabase.co".to_string());
    config.supabase.key = Some("service-role-secret".to_string());
    config.openai.api_key = Some("sk-live-123456".to_string());
    config.mailer = MailerConfig {
        from: Some("desk@example.com".to_string()),
        to: Some("me@example.com".to_string()),
        host: Some("smtp.example.com".to_string()),
        port: 465,
        user: Some("desk".to_string()),
        pass: Some("hunter2".to_string()),
    };

    let lines = commands::config_summary(&config).join("\n");
    assert!(lines.contains("https://abc.supabase.co (key serv***)"));
    assert!(lines.contains("gpt-4o-mini"));
    assert!(lines.contains("smtp.example.com:465 → me@example.com"));
    assert!(!lines.contains("service-role-secret"));
    assert!(!lines.contains("sk-live-123456"));
    assert!(!lines.contains("hunter2"));
}

#[test]
fn test_mask() {
    assert_eq!(mask("abcdefgh"), "abcd***");
    assert_eq!(mask("abc"), "***");
    assert_eq!(mask(""), "***");
}
