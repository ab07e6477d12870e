//! Record storage
//!
//! # Architecture
//!
//! - `Datastore` trait: list/create/update/delete per entity, budget upsert
//! - `Store` enum: concrete wrapper providing Clone + compile-time dispatch
//! - Implementations: `SupabaseStore` (PostgREST over HTTP), `MemoryStore`
//!
//! Lists come back already ordered: transactions newest first, budgets by
//! category, documents by expiry, policies by next payment. Updates replace
//! every column. A missing id on update or delete is [`Error::NotFound`].
//!
//! [`Error::NotFound`]: crate::error::Error::NotFound

mod memory;
pub mod rows;
mod supabase;

pub use memory::MemoryStore;
pub use supabase::SupabaseStore;

use async_trait::async_trait;

use crate::config::SupabaseConfig;
use crate::error::Result;
use crate::models::{
    Budget, Document, NewBudget, NewDocument, NewPolicy, NewTransaction, Policy, Transaction,
};

/// Trait defining the interface for record storage
#[async_trait]
pub trait Datastore: Send + Sync {
    async fn list_transactions(&self) -> Result<Vec<Transaction>>;
    async fn create_transaction(&self, tx: &NewTransaction) -> Result<Transaction>;
    async fn update_transaction(&self, id: &str, tx: &NewTransaction) -> Result<Transaction>;
    async fn delete_transaction(&self, id: &str) -> Result<()>;

    async fn list_budgets(&self) -> Result<Vec<Budget>>;
    /// Insert, or replace the limit of the budget with the same category
    async fn upsert_budget(&self, budget: &NewBudget) -> Result<Budget>;
    async fn delete_budget(&self, id: &str) -> Result<()>;

    async fn list_documents(&self) -> Result<Vec<Document>>;
    async fn create_document(&self, doc: &NewDocument) -> Result<Document>;
    async fn update_document(&self, id: &str, doc: &NewDocument) -> Result<Document>;
    async fn delete_document(&self, id: &str) -> Result<()>;

    async fn list_policies(&self) -> Result<Vec<Policy>>;
    async fn create_policy(&self, policy: &NewPolicy) -> Result<Policy>;
    async fn update_policy(&self, id: &str, policy: &NewPolicy) -> Result<Policy>;
    async fn delete_policy(&self, id: &str) -> Result<()>;
}

/// Concrete store enum
#[derive(Clone)]
pub enum Store {
    /// Hosted Supabase project
    Supabase(SupabaseStore),
    /// Process-local tables (tests and offline development)
    Memory(MemoryStore),
}

impl Store {
    /// Create a Supabase store from configuration
    ///
    /// Returns None when the URL or key is missing.
    pub fn from_config(config: &SupabaseConfig) -> Option<Self> {
        SupabaseStore::from_config(config).map(Store::Supabase)
    }

    /// Create an empty in-memory store
    pub fn memory() -> Self {
        Store::Memory(MemoryStore::new())
    }

    fn inner(&self) -> &dyn Datastore {
        match self {
            Store::Supabase(s) => s,
            Store::Memory(s) => s,
        }
    }

    /// Short backend name for logs
    pub fn kind(&self) -> &'static str {
        match self {
            Store::Supabase(_) => "supabase",
            Store::Memory(_) => "memory",
        }
    }
}

// Implement Datastore for Store by delegating to the inner backend
#[async_trait]
impl Datastore for Store {
    async fn list_transactions(&self) -> Result<Vec<Transaction>> {
        self.inner().list_transactions().await
    }

    async fn create_transaction(&self, tx: &NewTransaction) -> Result<Transaction> {
        self.inner().create_transaction(tx).await
    }

    async fn update_transaction(&self, id: &str, tx: &NewTransaction) -> Result<Transaction> {
        self.inner().update_transaction(id, tx).await
    }

    async fn delete_transaction(&self, id: &str) -> Result<()> {
        self.inner().delete_transaction(id).await
    }

    async fn list_budgets(&self) -> Result<Vec<Budget>> {
        self.inner().list_budgets().await
    }

    async fn upsert_budget(&self, budget: &NewBudget) -> Result<Budget> {
        self.inner().upsert_budget(budget).await
    }

    async fn delete_budget(&self, id: &str) -> Result<()> {
        self.inner().delete_budget(id).await
    }

    async fn list_documents(&self) -> Result<Vec<Document>> {
        self.inner().list_documents().await
    }

    async fn create_document(&self, doc: &NewDocument) -> Result<Document> {
        self.inner().create_document(doc).await
    }

    async fn update_document(&self, id: &str, doc: &NewDocument) -> Result<Document> {
        self.inner().update_document(id, doc).await
    }

    async fn delete_document(&self, id: &str) -> Result<()> {
        self.inner().delete_document(id).await
    }

    async fn list_policies(&self) -> Result<Vec<Policy>> {
        self.inner().list_policies().await
    }

    async fn create_policy(&self, policy: &NewPolicy) -> Result<Policy> {
        self.inner().create_policy(policy).await
    }

    async fn update_policy(&self, id: &str, policy: &NewPolicy) -> Result<Policy> {
        self.inner().update_policy(id, policy).await
    }

    async fn delete_policy(&self, id: &str) -> Result<()> {
        self.inner().delete_policy(id).await
    }
}
