//! Supabase PostgREST store
//!
//! Rows live at `{SUPABASE_URL}/rest/v1/{table}`. Every request carries the
//! project key as both `apikey` and bearer token. Writes ask for
//! `return=representation` so the stored row comes back in the response.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::{SupabaseConfig, TableNames};
use crate::error::{Error, Result};
use crate::models::{
    Budget, Document, NewBudget, NewDocument, NewPolicy, NewTransaction, Policy, Transaction,
};

use super::rows::{
    BudgetRow, BudgetWrite, DocumentRow, DocumentWrite, PolicyRow, PolicyWrite, TransactionRow,
    TransactionWrite,
};
use super::Datastore;

const TRANSACTION_ORDER: &str = "date.desc,created_at.desc";
const BUDGET_ORDER: &str = "category.asc";
const DOCUMENT_ORDER: &str = "expiration_date.asc,created_at.asc";
const POLICY_ORDER: &str = "next_payment_date.asc,created_at.asc";

/// PostgREST error body
#[derive(Debug, Deserialize)]
struct PostgrestError {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    details: Option<String>,
}

/// Supabase-backed store
#[derive(Clone)]
pub struct SupabaseStore {
    http_client: Client,
    base_url: String,
    key: String,
    tables: TableNames,
}

impl SupabaseStore {
    pub fn new(base_url: &str, key: &str, tables: TableNames) -> Self {
        Self {
            http_client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            key: key.to_string(),
            tables,
        }
    }

    /// Create from configuration. Returns None without URL and key.
    pub fn from_config(config: &SupabaseConfig) -> Option<Self> {
        let (url, key) = config.credentials()?;
        Some(Self::new(url, key, config.tables.clone()))
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    fn authed(&self, builder: RequestBuilder) -> RequestBuilder {
        builder.header("apikey", &self.key).bearer_auth(&self.key)
    }

    async fn select<R: DeserializeOwned>(&self, table: &str, order: &str) -> Result<Vec<R>> {
        let request = self
            .http_client
            .get(self.table_url(table))
            .query(&[("select", "*"), ("order", order)]);
        let response = check(self.authed(request).send().await?).await?;
        let rows: Vec<R> = response.json().await?;
        debug!(table, rows = rows.len(), "Selected rows");
        Ok(rows)
    }

    async fn insert<B, R>(&self, table: &str, body: &B, on_conflict: Option<&str>) -> Result<R>
    where
        B: Serialize + Sync,
        R: DeserializeOwned,
    {
        let mut request = self.http_client.post(self.table_url(table)).json(body);
        request = match on_conflict {
            Some(column) => request
                .query(&[("on_conflict", column)])
                .header("Prefer", "resolution=merge-duplicates,return=representation"),
            None => request.header("Prefer", "return=representation"),
        };
        let response = check(self.authed(request).send().await?).await?;
        let rows: Vec<R> = response.json().await?;
        rows.into_iter().next().ok_or_else(|| Error::Datastore {
            status: 500,
            message: format!("Insert into {} returned no row", table),
        })
    }

    async fn update<B, R>(&self, table: &str, id: &str, body: &B, entity: &str) -> Result<R>
    where
        B: Serialize + Sync,
        R: DeserializeOwned,
    {
        let request = self
            .http_client
            .patch(self.table_url(table))
            .query(&[("id", format!("eq.{}", id))])
            .header("Prefer", "return=representation")
            .json(body);
        let response = check(self.authed(request).send().await?).await?;
        let rows: Vec<R> = response.json().await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| Error::NotFound(format!("{} not found", entity)))
    }

    async fn delete(&self, table: &str, id: &str, entity: &str) -> Result<()> {
        let request = self
            .http_client
            .delete(self.table_url(table))
            .query(&[("id", format!("eq.{}", id))])
            .header("Prefer", "return=representation");
        let response = check(self.authed(request).send().await?).await?;
        let rows: Vec<serde_json::Value> = response.json().await?;
        if rows.is_empty() {
            return Err(Error::NotFound(format!("{} not found", entity)));
        }
        Ok(())
    }
}

/// Map non-2xx responses to [`Error::Datastore`]
async fn check(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<PostgrestError>(&body)
        .ok()
        .and_then(|e| e.message.or(e.details))
        .unwrap_or(body);
    Err(Error::Datastore {
        status: status.as_u16(),
        message,
    })
}

#[async_trait]
impl Datastore for SupabaseStore {
    async fn list_transactions(&self) -> Result<Vec<Transaction>> {
        let rows: Vec<TransactionRow> =
            self.select(&self.tables.transactions, TRANSACTION_ORDER).await?;
        Ok(rows.into_iter().map(Transaction::from).collect())
    }

    async fn create_transaction(&self, tx: &NewTransaction) -> Result<Transaction> {
        let row: TransactionRow = self
            .insert(&self.tables.transactions, &TransactionWrite::from(tx), None)
            .await?;
        Ok(row.into())
    }

    async fn update_transaction(&self, id: &str, tx: &NewTransaction) -> Result<Transaction> {
        let row: TransactionRow = self
            .update(&self.tables.transactions, id, &TransactionWrite::from(tx), "Transaction")
            .await?;
        Ok(row.into())
    }

    async fn delete_transaction(&self, id: &str) -> Result<()> {
        self.delete(&self.tables.transactions, id, "Transaction").await
    }

    async fn list_budgets(&self) -> Result<Vec<Budget>> {
        let rows: Vec<BudgetRow> = self.select(&self.tables.budgets, BUDGET_ORDER).await?;
        Ok(rows.into_iter().map(Budget::from).collect())
    }

    async fn upsert_budget(&self, budget: &NewBudget) -> Result<Budget> {
        let row: BudgetRow = self
            .insert(&self.tables.budgets, &BudgetWrite::from(budget), Some("category"))
            .await?;
        Ok(row.into())
    }

    async fn delete_budget(&self, id: &str) -> Result<()> {
        self.delete(&self.tables.budgets, id, "Budget").await
    }

    async fn list_documents(&self) -> Result<Vec<Document>> {
        let rows: Vec<DocumentRow> = self.select(&self.tables.documents, DOCUMENT_ORDER).await?;
        Ok(rows.into_iter().map(Document::from).collect())
    }

    async fn create_document(&self, doc: &NewDocument) -> Result<Document> {
        let row: DocumentRow = self
            .insert(&self.tables.documents, &DocumentWrite::from(doc), None)
            .await?;
        Ok(row.into())
    }

    async fn update_document(&self, id: &str, doc: &NewDocument) -> Result<Document> {
        let row: DocumentRow = self
            .update(&self.tables.documents, id, &DocumentWrite::from(doc), "Document")
            .await?;
        Ok(row.into())
    }

    async fn delete_document(&self, id: &str) -> Result<()> {
        self.delete(&self.tables.documents, id, "Document").await
    }

    async fn list_policies(&self) -> Result<Vec<Policy>> {
        let rows: Vec<PolicyRow> = self.select(&self.tables.policies, POLICY_ORDER).await?;
        Ok(rows.into_iter().map(Policy::from).collect())
    }

    async fn create_policy(&self, policy: &NewPolicy) -> Result<Policy> {
        let row: PolicyRow = self
            .insert(&self.tables.policies, &PolicyWrite::from(policy), None)
            .await?;
        Ok(row.into())
    }

    async fn update_policy(&self, id: &str, policy: &NewPolicy) -> Result<Policy> {
        let row: PolicyRow = self
            .update(&self.tables.policies, id, &PolicyWrite::from(policy), "Policy")
            .await?;
        Ok(row.into())
    }

    async fn delete_policy(&self, id: &str) -> Result<()> {
        self.delete(&self.tables.policies, id, "Policy").await
    }
}
