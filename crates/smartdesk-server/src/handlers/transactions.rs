//! Transaction handlers

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use serde_json::Value;
use tracing::info;

use crate::{data, AppError, AppState, Data};
use smartdesk_core::dates::today;
use smartdesk_core::insights::compute_insights;
use smartdesk_core::validation::validate_transaction;
use smartdesk_core::{Datastore, InsightSummary, Transaction, TransactionFilter};

/// Query parameters for listing transactions and insights
#[derive(Debug, Default, Deserialize)]
pub struct TransactionQuery {
    /// Inclusive start date (YYYY-MM-DD)
    pub from: Option<String>,
    /// Inclusive end date (YYYY-MM-DD)
    pub to: Option<String>,
    /// Exact category, case-insensitive
    pub category: Option<String>,
}

impl TransactionQuery {
    fn filter(&self) -> Result<TransactionFilter, AppError> {
        Ok(TransactionFilter::from_query(
            self.from.as_deref(),
            self.to.as_deref(),
            self.category.as_deref(),
        )?)
    }
}

async fn filtered(
    state: &AppState,
    params: &TransactionQuery,
) -> Result<Vec<Transaction>, AppError> {
    let filter = params.filter()?;
    let transactions = state
        .store("fetch transactions")?
        .list_transactions()
        .await?;
    Ok(filter.apply(transactions))
}

/// GET /api/transactions - List transactions, newest first
pub async fn list_transactions(
    State(state): State<Arc<AppState>>,
    Query(params): Query<TransactionQuery>,
) -> Result<Json<Data<Vec<Transaction>>>, AppError> {
    Ok(data(filtered(&state, &params).await?))
}

/// GET /api/insights - Aggregate the filtered transactions
pub async fn get_insights(
    State(state): State<Arc<AppState>>,
    Query(params): Query<TransactionQuery>,
) -> Result<Json<Data<InsightSummary>>, AppError> {
    let transactions = filtered(&state, &params).await?;
    Ok(data(compute_insights(&transactions)))
}

/// POST /api/transactions - Create a transaction
pub async fn create_transaction(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<Data<Transaction>>), AppError> {
    let Json(payload) = payload?;
    let tx = validate_transaction(&payload, today())?;
    let record = state
        .store("save transaction")?
        .create_transaction(&tx)
        .await?;
    info!(id = %record.id, amount = record.amount, source = %record.source, "Transaction created");
    Ok((StatusCode::CREATED, data(record)))
}

/// PUT /api/transactions/:id - Replace every field of a transaction
pub async fn update_transaction(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Data<Transaction>>, AppError> {
    let Json(payload) = payload?;
    let tx = validate_transaction(&payload, today())?;
    let record = state
        .store("update transaction")?
        .update_transaction(&id, &tx)
        .await?;
    Ok(data(record))
}

/// DELETE /api/transactions/:id
pub async fn delete_transaction(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    state
        .store("delete transaction")?
        .delete_transaction(&id)
        .await?;
    info!(id = %id, "Transaction deleted");
    Ok(StatusCode::NO_CONTENT)
}
