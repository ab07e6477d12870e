//! Insurance policy handlers

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, Query, State},
    http::StatusCode,
    response::Response,
    Json,
};
use serde_json::Value;
use tracing::info;

use super::{batch_items, batch_response, WindowQuery};
use crate::{data, AppError, AppState, Data};
use smartdesk_core::dates::today;
use smartdesk_core::insights::policy_insights;
use smartdesk_core::validation::validate_policy;
use smartdesk_core::{Datastore, ExpiryWindow, Policy, PolicyInsights};

/// GET /api/policies - List policies by next payment date
///
/// `?upcoming=true` keeps policies due today or later; `?months=N` also caps
/// the due date at today + N months.
pub async fn list_policies(
    State(state): State<Arc<AppState>>,
    Query(params): Query<WindowQuery>,
) -> Result<Json<Data<Vec<Policy>>>, AppError> {
    let window = ExpiryWindow::from_query(params.months.as_deref(), params.upcoming.as_deref())?;
    let policies = state.store("fetch policies")?.list_policies().await?;
    Ok(data(window.filter_policies(policies, today())))
}

/// GET /api/policies/insights - Next premium and what is due soon
pub async fn get_policy_insights(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Data<PolicyInsights>>, AppError> {
    let policies = state.store("fetch policies")?.list_policies().await?;
    Ok(data(policy_insights(&policies, today())))
}

/// POST /api/policies - Create a policy
pub async fn create_policy(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<Data<Policy>>), AppError> {
    let Json(payload) = payload?;
    let policy = validate_policy(&payload, today())?;
    let record = state.store("save policy")?.create_policy(&policy).await?;
    info!(id = %record.id, provider = %record.provider, "Policy created");
    Ok((StatusCode::CREATED, data(record)))
}

/// POST /api/policies/batch - Save extracted policies one by one
pub async fn create_policies_batch(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Response, AppError> {
    let Json(payload) = payload?;
    let items = batch_items(payload, "policies")?;
    let store = state.store("save policy")?;
    let today = today();

    let mut saved = Vec::with_capacity(items.len());
    let mut failure = None;
    for item in &items {
        let result = match validate_policy(item, today) {
            Ok(policy) => store.create_policy(&policy).await,
            Err(e) => Err(e),
        };
        match result {
            Ok(record) => saved.push(record),
            Err(e) => {
                failure = Some(e);
                break;
            }
        }
    }

    info!(saved = saved.len(), requested = items.len(), "Policy batch processed");
    batch_response(saved, failure)
}

/// PUT /api/policies/:id - Replace every field of a policy
pub async fn update_policy(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Data<Policy>>, AppError> {
    let Json(payload) = payload?;
    let policy = validate_policy(&payload, today())?;
    let record = state
        .store("update policy")?
        .update_policy(&id, &policy)
        .await?;
    Ok(data(record))
}

/// DELETE /api/policies/:id
pub async fn delete_policy(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    state.store("delete policy")?.delete_policy(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
