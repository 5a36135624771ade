//! Medicine suggestion endpoint.
//!
//! `GET /api/medicines/suggest?query=<text>&limit=<n>`

use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::models::QueryResult;
use crate::suggest::{self, SuggestRequest};

/// Raw query-string values. Both are kept as strings so a non-numeric
/// `limit` falls back to the default instead of rejecting the request.
#[derive(Debug, Deserialize)]
pub struct SuggestQuery {
    pub query: Option<String>,
    pub limit: Option<String>,
}

/// `GET /api/medicines/suggest`: fuzzy matches plus related medicines.
///
/// The query is validated before the catalog is touched. The pipeline
/// itself is synchronous SQLite work and runs on the blocking pool.
pub async fn suggest(
    State(ctx): State<ApiContext>,
    Query(params): Query<SuggestQuery>,
) -> Result<Json<QueryResult>, ApiError> {
    let request = SuggestRequest::from_params(params.query.as_deref(), params.limit.as_deref())?;

    let core = ctx.core.clone();
    let result = tokio::task::spawn_blocking(move || -> Result<QueryResult, ApiError> {
        let conn = core.open_db()?;
        Ok(suggest::suggest(&conn, core.score_cache(), &request)?)
    })
    .await??;

    Ok(Json(result))
}
