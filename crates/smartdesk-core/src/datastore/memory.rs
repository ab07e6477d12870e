//! In-memory store
//!
//! Holds every table in one mutex. Ids are sequential integers rendered as
//! text, matching what a serial primary key would return.

use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;

use crate::error::{Error, Result};
use crate::models::{
    Budget, Document, NewBudget, NewDocument, NewPolicy, NewTransaction, Policy, Transaction,
};

use super::Datastore;

#[derive(Default)]
struct Tables {
    next_id: u64,
    /// Writes left before inserts start failing (None = unlimited)
    writes_left: Option<usize>,
    transactions: Vec<Transaction>,
    budgets: Vec<Budget>,
    documents: Vec<Document>,
    policies: Vec<Policy>,
}

impl Tables {
    fn allocate(&mut self) -> Result<(String, Option<String>)> {
        if let Some(left) = self.writes_left.as_mut() {
            if *left == 0 {
                return Err(Error::Datastore {
                    status: 503,
                    message: "Write rejected".to_string(),
                });
            }
            *left -= 1;
        }
        self.next_id += 1;
        Ok((self.next_id.to_string(), Some(Utc::now().to_rfc3339())))
    }
}

/// Process-local store
#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<Mutex<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Let `count` inserts succeed, then reject the rest
    pub fn failing_writes_after(self, count: usize) -> Self {
        if let Ok(mut tables) = self.tables.lock() {
            tables.writes_left = Some(count);
        }
        self
    }

    fn lock(&self) -> Result<MutexGuard<'_, Tables>> {
        self.tables.lock().map_err(|_| Error::Datastore {
            status: 500,
            message: "Store lock poisoned".to_string(),
        })
    }
}

/// Rows addressable by id
trait Keyed: Clone {
    const ENTITY: &'static str;
    fn key(&self) -> &str;
}

impl Keyed for Transaction {
    const ENTITY: &'static str = "Transaction";
    fn key(&self) -> &str {
        &self.id
    }
}

impl Keyed for Budget {
    const ENTITY: &'static str = "Budget";
    fn key(&self) -> &str {
        &self.id
    }
}

impl Keyed for Document {
    const ENTITY: &'static str = "Document";
    fn key(&self) -> &str {
        &self.id
    }
}

impl Keyed for Policy {
    const ENTITY: &'static str = "Policy";
    fn key(&self) -> &str {
        &self.id
    }
}

fn not_found<T: Keyed>() -> Error {
    Error::NotFound(format!("{} not found", T::ENTITY))
}

fn created_time<T: Keyed>(
    rows: &[T],
    id: &str,
    created: fn(&T) -> Option<String>,
) -> Option<String> {
    rows.iter().find(|r| r.key() == id).and_then(created)
}

fn replace<T: Keyed>(rows: &mut [T], id: &str, row: T) -> Result<T> {
    let slot = rows
        .iter_mut()
        .find(|r| r.key() == id)
        .ok_or_else(not_found::<T>)?;
    *slot = row;
    Ok(slot.clone())
}

fn remove<T: Keyed>(rows: &mut Vec<T>, id: &str) -> Result<()> {
    let before = rows.len();
    rows.retain(|r| r.key() != id);
    if rows.len() == before {
        return Err(not_found::<T>());
    }
    Ok(())
}

/// Ascending with empty values last, like `nullslast` ordering
fn empty_last(a: &str, b: &str) -> std::cmp::Ordering {
    (a.is_empty(), a).cmp(&(b.is_empty(), b))
}

#[async_trait]
impl Datastore for MemoryStore {
    async fn list_transactions(&self) -> Result<Vec<Transaction>> {
        let mut rows = self.lock()?.transactions.clone();
        rows.sort_by(|a, b| {
            b.date
                .cmp(&a.date)
                .then_with(|| b.created_time.cmp(&a.created_time))
        });
        Ok(rows)
    }

    async fn create_transaction(&self, tx: &NewTransaction) -> Result<Transaction> {
        let mut tables = self.lock()?;
        let (id, created) = tables.allocate()?;
        let record = tx.clone().into_record(id, created);
        tables.transactions.push(record.clone());
        Ok(record)
    }

    async fn update_transaction(&self, id: &str, tx: &NewTransaction) -> Result<Transaction> {
        let mut tables = self.lock()?;
        let created = created_time(&tables.transactions, id, |t| t.created_time.clone());
        let row = tx.clone().into_record(id.to_string(), created);
        replace(&mut tables.transactions, id, row)
    }

    async fn delete_transaction(&self, id: &str) -> Result<()> {
        remove(&mut self.lock()?.transactions, id)
    }

    async fn list_budgets(&self) -> Result<Vec<Budget>> {
        let mut rows = self.lock()?.budgets.clone();
        rows.sort_by(|a, b| a.category.cmp(&b.category));
        Ok(rows)
    }

    async fn upsert_budget(&self, budget: &NewBudget) -> Result<Budget> {
        let mut tables = self.lock()?;
        if let Some(existing) = tables
            .budgets
            .iter_mut()
            .find(|b| b.category == budget.category)
        {
            existing.monthly_limit = budget.monthly_limit;
            return Ok(existing.clone());
        }
        let (id, created_time) = tables.allocate()?;
        let record = Budget {
            id,
            category: budget.category.clone(),
            monthly_limit: budget.monthly_limit,
            created_time,
        };
        tables.budgets.push(record.clone());
        Ok(record)
    }

    async fn delete_budget(&self, id: &str) -> Result<()> {
        remove(&mut self.lock()?.budgets, id)
    }

    async fn list_documents(&self) -> Result<Vec<Document>> {
        let mut rows = self.lock()?.documents.clone();
        rows.sort_by(|a, b| {
            empty_last(&a.expiration_date, &b.expiration_date)
                .then_with(|| a.created_time.cmp(&b.created_time))
        });
        Ok(rows)
    }

    async fn create_document(&self, doc: &NewDocument) -> Result<Document> {
        let mut tables = self.lock()?;
        let (id, created) = tables.allocate()?;
        let record = doc.clone().into_record(id, created);
        tables.documents.push(record.clone());
        Ok(record)
    }

    async fn update_document(&self, id: &str, doc: &NewDocument) -> Result<Document> {
        let mut tables = self.lock()?;
        let created = created_time(&tables.documents, id, |d| d.created_time.clone());
        let row = doc.clone().into_record(id.to_string(), created);
        replace(&mut tables.documents, id, row)
    }

    async fn delete_document(&self, id: &str) -> Result<()> {
        remove(&mut self.lock()?.documents, id)
    }

    async fn list_policies(&self) -> Result<Vec<Policy>> {
        let mut rows = self.lock()?.policies.clone();
        rows.sort_by(|a, b| {
            empty_last(&a.next_payment_date, &b.next_payment_date)
                .then_with(|| a.created_time.cmp(&b.created_time))
        });
        Ok(rows)
    }

    async fn create_policy(&self, policy: &NewPolicy) -> Result<Policy> {
        let mut tables = self.lock()?;
        let (id, created) = tables.allocate()?;
        let record = policy.clone().into_record(id, created);
        tables.policies.push(record.clone());
        Ok(record)
    }

    async fn update_policy(&self, id: &str, policy: &NewPolicy) -> Result<Policy> {
        let mut tables = self.lock()?;
        let created = created_time(&tables.policies, id, |p| p.created_time.clone());
        let row = policy.clone().into_record(id.to_string(), created);
        replace(&mut tables.policies, id, row)
    }

    async fn delete_policy(&self, id: &str) -> Result<()> {
        remove(&mut self.lock()?.policies, id)
    }
}
