//! Document handlers

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
use smartdesk_core::validation::validate_document;
use smartdesk_core::{Datastore, Document, ExpiryWindow};

/// GET /api/documents - List documents, optionally within an expiry window
///
/// `?months=N` keeps documents expiring before today + N months;
/// `?upcoming=true` alone uses the configured default window.
pub async fn list_documents(
    State(state): State<Arc<AppState>>,
    Query(params): Query<WindowQuery>,
) -> Result<Json<Data<Vec<Document>>>, AppError> {
    let window = ExpiryWindow::from_query(params.months.as_deref(), params.upcoming.as_deref())?;
    let documents = state.store("fetch documents")?.list_documents().await?;
    Ok(data(window.filter_documents(
        documents,
        state.expiry_months,
        today(),
    )))
}

/// POST /api/documents - Create a document
pub async fn create_document(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<(StatusCode, Json<Data<Document>>), AppError> {
    let Json(payload) = payload?;
    let doc = validate_document(&payload, today())?;
    let record = state.store("save document")?.create_document(&doc).await?;
    info!(id = %record.id, doc_type = %record.doc_type, "Document created");
    Ok((StatusCode::CREATED, data(record)))
}

/// POST /api/documents/batch - Save extracted documents one by one
///
/// Writes are independent: the first failure stops the loop and earlier
/// documents stay saved.
pub async fn create_documents_batch(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Response, AppError> {
    let Json(payload) = payload?;
    let items = batch_items(payload, "documents")?;
    let store = state.store("save document")?;
    let today = today();

    let mut saved = Vec::with_capacity(items.len());
    let mut failure = None;
    for item in &items {
        let result = match validate_document(item, today) {
            Ok(doc) => store.create_document(&doc).await,
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

    info!(saved = saved.len(), requested = items.len(), "Document batch processed");
    batch_response(saved, failure)
}

/// PUT /api/documents/:id - Replace every field of a document
pub async fn update_document(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Data<Document>>, AppError> {
    let Json(payload) = payload?;
    let doc = validate_document(&payload, today())?;
    let record = state
        .store("update document")?
        .update_document(&id, &doc)
        .await?;
    Ok(data(record))
}

/// DELETE /api/documents/:id
pub async fn delete_document(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    state.store("delete document")?.delete_document(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}
