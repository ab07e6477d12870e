//! Smart Desk Core Library
//!
//! Shared functionality for the Smart Desk tracker:
//! - Records for expenses, budgets, documents and insurance policies
//! - Payload validation with per-field defaults
//! - Model-backed extraction from receipts, notes, documents and policies
//! - Dashboard aggregation and list filtering
//! - Supabase datastore and identity clients
//! - SMTP digests for expiring documents and monthly spending

pub mod ai;
pub mod auth;
pub mod config;
pub mod datastore;
pub mod dates;
pub mod digest;
pub mod error;
pub mod fields;
pub mod filters;
pub mod insights;
pub mod mailer;
pub mod models;
pub mod validation;

/// Test utilities including mock OpenAI-compatible server
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use ai::{AIBackend, AIClient, MockBackend, OpenAICompatibleBackend, Upload};
pub use auth::{AuthUser, Authenticator, SupabaseAuth};
pub use config::Config;
pub use datastore::{Datastore, MemoryStore, Store, SupabaseStore};
pub use error::{Error, Result};
pub use filters::{ExpiryWindow, TransactionFilter};
pub use mailer::{Mailer, MemoryMailer, SentMail};
pub use models::{
    Budget, BudgetStatus, Document, InsightSummary, NewBudget, NewDocument, NewPolicy,
    NewTransaction, PaymentFrequency, Policy, PolicyInsights, Source, Transaction, CATEGORIES,
    PAYMENT_METHODS,
};
