//! Digest delivery over SMTP
//!
//! Port 465 uses implicit TLS; any other port upgrades with STARTTLS.
//! `Mailer::Memory` keeps sent messages for tests and dry runs.

use std::sync::{Arc, Mutex};

use lettre::message::{header::ContentType, Mailbox};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tracing::{info, warn};

use crate::config::MailerConfig;
use crate::error::{Error, Result};

/// A delivered (or recorded) message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMail {
    pub to: String,
    pub subject: String,
    pub html: String,
}

/// SMTP transport with fixed sender and recipient
#[derive(Clone)]
pub struct SmtpMailer {
    transport: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    to: Mailbox,
}

impl SmtpMailer {
    /// Create from configuration. Returns None when a setting is missing
    /// or an address does not parse.
    pub fn from_config(config: &MailerConfig) -> Option<Self> {
        let (Some(from), Some(to), Some(host), Some(user), Some(pass)) = (
            config.from.as_deref(),
            config.to.as_deref(),
            config.host.as_deref(),
            config.user.as_deref(),
            config.pass.as_deref(),
        ) else {
            return None;
        };

        let (from, to) = match (from.parse::<Mailbox>(), to.parse::<Mailbox>()) {
            (Ok(from), Ok(to)) => (from, to),
            (Err(e), _) | (_, Err(e)) => {
                warn!(error = %e, "Invalid notification address, digests disabled");
                return None;
            }
        };

        let builder = if config.implicit_tls() {
            AsyncSmtpTransport::<Tokio1Executor>::relay(host)
        } else {
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host)
        };
        let transport = match builder {
            Ok(builder) => builder
                .port(config.port)
                .credentials(Credentials::new(user.to_string(), pass.to_string()))
                .build(),
            Err(e) => {
                warn!(host, error = %e, "Invalid SMTP host, digests disabled");
                return None;
            }
        };

        Some(Self { transport, from, to })
    }

    async fn send(&self, subject: &str, html: &str) -> Result<SentMail> {
        let message = Message::builder()
            .from(self.from.clone())
            .to(self.to.clone())
            .subject(subject)
            .header(ContentType::TEXT_HTML)
            .body(html.to_string())
            .map_err(|e| Error::Mail(e.to_string()))?;

        self.transport
            .send(message)
            .await
            .map_err(|e| Error::Mail(e.to_string()))?;

        Ok(SentMail {
            to: self.to.to_string(),
            subject: subject.to_string(),
            html: html.to_string(),
        })
    }
}

/// Records messages instead of sending them
#[derive(Clone, Default)]
pub struct MemoryMailer {
    sent: Arc<Mutex<Vec<SentMail>>>,
}

impl MemoryMailer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Messages recorded so far
    pub fn sent(&self) -> Vec<SentMail> {
        self.sent.lock().map(|s| s.clone()).unwrap_or_default()
    }

    fn send(&self, subject: &str, html: &str) -> Result<SentMail> {
        let mail = SentMail {
            to: "memory".to_string(),
            subject: subject.to_string(),
            html: html.to_string(),
        };
        self.sent
            .lock()
            .map_err(|_| Error::Mail("Mailbox lock poisoned".to_string()))?
            .push(mail.clone());
        Ok(mail)
    }
}

/// Concrete mailer enum
#[derive(Clone)]
pub enum Mailer {
    Smtp(SmtpMailer),
    Memory(MemoryMailer),
}

impl Mailer {
    /// Create an SMTP mailer from configuration
    ///
    /// Returns None when the mailer section is incomplete.
    pub fn from_config(config: &MailerConfig) -> Option<Self> {
        if !config.is_complete() {
            return None;
        }
        SmtpMailer::from_config(config).map(Mailer::Smtp)
    }

    pub fn memory() -> Self {
        Mailer::Memory(MemoryMailer::new())
    }

    /// Send one HTML message to the configured recipient
    pub async fn send(&self, subject: &str, html: &str) -> Result<SentMail> {
        let sent = match self {
            Mailer::Smtp(m) => m.send(subject, html).await?,
            Mailer::Memory(m) => m.send(subject, html)?,
        };
        info!(to = %sent.to, subject, "Email sent");
        Ok(sent)
    }
}
