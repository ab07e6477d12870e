//! Health and metadata handlers (unauthenticated)

use axum::Json;
use serde::Serialize;

use crate::{data, Data};
use smartdesk_core::{CATEGORIES, PAYMENT_METHODS};

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub module: &'static str,
}

/// GET /api/health
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        module: "Finance Tracker",
    })
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MetaResponse {
    pub categories: &'static [&'static str],
    pub payment_methods: &'static [&'static str],
}

/// GET /api/meta - Allowed categories and payment methods
pub async fn meta() -> Json<Data<MetaResponse>> {
    data(MetaResponse {
        categories: CATEGORIES,
        payment_methods: PAYMENT_METHODS,
    })
}
