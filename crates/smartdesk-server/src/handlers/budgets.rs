//! Budget handlers

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use serde_json::Value;
use tracing::info;

use crate::{data, AppError, AppState, Data};
use smartdesk_core::dates::today;
use smartdesk_core::insights::budget_statuses;
use smartdesk_core::validation::validate_budget;
use smartdesk_core::{Budget, BudgetStatus, Datastore};

/// GET /api/budgets - Budgets with current-month consumption
pub async fn list_budgets(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Data<Vec<BudgetStatus>>>, AppError> {
    let store = state.store("fetch budgets")?;
    let (budgets, transactions) =
        tokio::try_join!(store.list_budgets(), store.list_transactions())?;
    Ok(data(budget_statuses(&budgets, &transactions, today())))
}

/// POST /api/budgets - Create or replace the budget for a category
pub async fn upsert_budget(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<Data<Budget>>), AppError> {
    let Json(payload) = payload?;
    let budget = validate_budget(&payload)?;
    let record = state.store("save budget")?.upsert_budget(&budget).await?;
    info!(category = %record.category, limit = record.monthly_limit, "Budget saved");
    Ok((StatusCode::CREATED, data(record)))
}

/// DELETE /api/budgets/:id
pub async fn delete_budget(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    state.store("delete budget")?.delete_budget(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
