//! Health check endpoint.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use crate::api::types::ApiContext;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub catalog_loaded: bool,
    pub medicines: u64,
    pub version: &'static str,
}

/// `GET /api/health`. Always 200; a failed catalog load reports `degraded`.
pub async fn check(State(ctx): State<ApiContext>) -> Json<HealthResponse> {
    let catalog_loaded = ctx.core.is_loaded();

    Json(HealthResponse {
        status: if catalog_loaded { "ok" } else { "degraded" },
        catalog_loaded,
        medicines: ctx.core.medicine_count(),
        version: crate::config::APP_VERSION,
    })
}
