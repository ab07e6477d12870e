//! Extraction handlers
//!
//! These routes never persist anything: the client reviews the candidates
//! and saves them through the regular record routes.

use std::sync::Arc;

use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        rejection::JsonRejection,
        Multipart, State,
    },
    http::StatusCode,
    Json,
};
use serde_json::Value;
use tracing::info;

use crate::{data, AppError, AppState, Data, MAX_UPLOAD_SIZE};
use smartdesk_core::dates::today;
use smartdesk_core::{NewDocument, NewPolicy, NewTransaction, Upload};

fn multipart_error(e: MultipartError) -> AppError {
    AppError::new(e.status(), &e.body_text())
}

/// Read the `file` field of a multipart form
///
/// Other fields are ignored. `missing` is the 400 message when no file was
/// sent, including requests that are not multipart at all.
async fn read_upload(
    multipart: Result<Multipart, MultipartRejection>,
    missing: &str,
) -> Result<Upload, AppError> {
    let Ok(mut multipart) = multipart else {
        return Err(AppError::bad_request(missing));
    };
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some("file") {
            continue;
        }
        let mime_type = field.content_type().map(str::to_string);
        let filename = field.file_name().map(str::to_string);
        let bytes = field.bytes().await.map_err(multipart_error)?;

        if bytes.len() > MAX_UPLOAD_SIZE {
            return Err(AppError::new(
                StatusCode::PAYLOAD_TOO_LARGE,
                &format!(
                    "File too large. Maximum size is {} MB",
                    MAX_UPLOAD_SIZE / 1024 / 1024
                ),
            ));
        }
        if bytes.is_empty() {
            break;
        }

        let mut upload = Upload::new(bytes.to_vec());
        if let Some(mime_type) = mime_type {
            upload = upload.with_mime_type(mime_type);
        }
        if let Some(filename) = filename {
            upload = upload.with_filename(filename);
        }
        return Ok(upload);
    }
    Err(AppError::bad_request(missing))
}

/// POST /api/ai/extract - Read the payable total from a receipt photo
///
/// Expects multipart form with:
/// - file: receipt or payment screenshot (required, max 8MB)
pub async fn extract_transactions(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<Data<Vec<NewTransaction>>>, AppError> {
    let upload = read_upload(multipart, "Image file is required").await?;
    let ai = state.ai("image")?;
    let found = ai.extract_transactions_from_image(&upload, today()).await?;
    info!(bytes = upload.data.len(), "Receipt extracted");
    Ok(data(found))
}

/// POST /api/ai/text - Read one expense from a free-text note
pub async fn extract_from_text(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Data<NewTransaction>>, AppError> {
    let Json(payload) = payload?;
    let note = payload
        .get("note")
        .and_then(Value::as_str)
        .filter(|n| !n.trim().is_empty())
        .ok_or_else(|| AppError::bad_request("Note text is required"))?;

    let ai = state.ai("text")?;
    Ok(data(ai.extract_transaction_from_text(note, today()).await?))
}

/// POST /api/ai/documents - Read identity documents from a photo
pub async fn extract_documents(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<Data<Vec<NewDocument>>>, AppError> {
    let upload = read_upload(multipart, "Image file is required").await?;
    let ai = state.ai("image")?;
    let found = ai.extract_documents_from_image(&upload, today()).await?;
    info!(count = found.len(), "Documents extracted");
    Ok(data(found))
}

/// POST /api/ai/policies - Read insurance policies from a photo or PDF
pub async fn extract_policies(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<Data<Vec<NewPolicy>>>, AppError> {
    let upload = read_upload(multipart, "Image or PDF file is required").await?;
    let ai = state.ai("image")?;
    let found = ai.extract_policies_from_file(&upload, today()).await?;
    info!(count = found.len(), pdf = upload.is_pdf(), "Policies extracted");
    Ok(data(found))
}
