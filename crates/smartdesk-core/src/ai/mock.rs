//! Mock backend for testing
//!
//! Answers each extraction task with a canned reply picked from the system
//! prompt, or with a fixed reply set by the test. Every request is recorded
//! so tests can inspect what would have been sent.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::error::{Error, Result};

use super::prompts;
use super::types::ChatRequest;
use super::AIBackend;

#[derive(Debug, Clone)]
enum Reply {
    Canned,
    Fixed(String),
    Fail(String),
}

/// Mock AI backend for testing
#[derive(Clone)]
pub struct MockBackend {
    /// Whether health_check should return true
    pub healthy: bool,
    pdf_enabled: bool,
    reply: Reply,
    requests: Arc<Mutex<Vec<ChatRequest>>>,
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MockBackend {
    /// Create a new mock backend (healthy, canned replies)
    pub fn new() -> Self {
        Self {
            healthy: true,
            pdf_enabled: false,
            reply: Reply::Canned,
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Always answer with `text`
    pub fn with_reply(mut self, text: impl Into<String>) -> Self {
        self.reply = Reply::Fixed(text.into());
        self
    }

    /// Fail every call as an unreachable model would
    pub fn failing(mut self, message: impl Into<String>) -> Self {
        self.reply = Reply::Fail(message.into());
        self.healthy = false;
        self
    }

    pub fn with_pdf(mut self, enabled: bool) -> Self {
        self.pdf_enabled = enabled;
        self
    }

    /// Requests received so far
    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }
}

/// Canned model reply for a task, keyed by its system prompt
pub(crate) fn canned_reply(system: &str) -> &'static str {
    if system == prompts::RECEIPT_SYSTEM {
        r#"```json
[
  {"date": "2024-05-01", "amount": 3.5, "currency": "USD", "category": "Food", "paymentMethod": "Credit Card", "description": "Blue Bottle latte"},
  {"date": "2024-05-01", "amount": 12.75, "currency": "USD", "category": "Food", "paymentMethod": "Credit Card", "description": "Blue Bottle total"}
]
```"#
    } else if system == prompts::NOTE_SYSTEM {
        r#"{"amount": 18, "currency": "USD", "category": "Travel", "paymentMethod": "UPI", "merchant": "Taxi to airport"}"#
    } else if system == prompts::DOCUMENT_SYSTEM {
        r#"[{"title": "Jane Doe Passport", "docType": "passport", "expirationDate": "2031-03-14", "number": "X1234567", "notes": "US"}]"#
    } else if system == prompts::POLICY_SYSTEM {
        r#"{"policies": [{"policyName": "Auto Shield", "provider": "Acme Insurance", "policyType": "auto", "premiumAmount": "89.90", "frequency": "monthly", "nextPaymentDate": "2024-06-01"}]}"#
    } else {
        "{}"
    }
}

#[async_trait]
impl AIBackend for MockBackend {
    async fn chat(&self, request: &ChatRequest) -> Result<String> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request.clone());
        }
        match &self.reply {
            Reply::Canned => Ok(canned_reply(&request.system).to_string()),
            Reply::Fixed(text) => Ok(text.clone()),
            Reply::Fail(message) => Err(Error::Extraction(message.clone())),
        }
    }

    async fn health_check(&self) -> bool {
        self.healthy
    }

    fn supports_pdf(&self) -> bool {
        self.pdf_enabled
    }

    fn model(&self) -> &str {
        "mock"
    }

    fn host(&self) -> &str {
        "mock://localhost"
    }
}
