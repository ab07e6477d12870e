//! HTTP request handlers organized by domain
//!
//! Each submodule contains handlers for a specific API area.

pub mod ai;
pub mod budgets;
pub mod documents;
pub mod meta;
pub mod policies;
pub mod transactions;

// Re-export all handlers for use in router
pub use ai::*;
pub use budgets::*;
pub use documents::*;
pub use meta::*;
pub use policies::*;
pub use transactions::*;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::warn;

use crate::{data, AppError};

/// Query parameters shared by document and policy lists
#[derive(Debug, Default, Deserialize)]
pub struct WindowQuery {
    pub months: Option<String>,
    pub upcoming: Option<String>,
}

/// Items of a batch body: a bare array or `{<key>: [...]}`
pub(crate) fn batch_items(payload: Value, key: &str) -> Result<Vec<Value>, AppError> {
    match payload {
        Value::Array(items) => Ok(items),
        Value::Object(mut map) => match map.remove(key) {
            Some(Value::Array(items)) => Ok(items),
            _ => Err(AppError::bad_request(&format!("Expected an array of {}", key))),
        },
        _ => Err(AppError::bad_request(&format!("Expected an array of {}", key))),
    }
}

/// Outcome of a batch save
#[derive(Debug, Serialize)]
pub struct BatchResult<T> {
    pub saved: Vec<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// 201 when every item was saved, 207 when a failure stopped the loop after
/// some writes, the failure itself when nothing was saved.
pub(crate) fn batch_response<T: Serialize>(
    saved: Vec<T>,
    failure: Option<smartdesk_core::Error>,
) -> Result<Response, AppError> {
    match failure {
        None => Ok((StatusCode::CREATED, data(BatchResult { saved, error: None })).into_response()),
        Some(e) if saved.is_empty() => Err(e.into()),
        Some(e) => {
            let error = AppError::from(e);
            warn!(saved = saved.len(), error = %error.message(), "Batch stopped after partial save");
            Ok((
                StatusCode::MULTI_STATUS,
                data(BatchResult {
                    saved,
                    error: Some(error.message().to_string()),
                }),
            )
                .into_response())
        }
    }
}
