//! Raw CSV upload

use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, Query, State},
    routing::post,
    Json, Router,
};
use copilot_common::csv_import::{self, EntityKind, ImportReport};
use serde::Deserialize;

use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// Largest CSV body accepted
const MAX_CSV_BYTES: usize = 16 * 1024 * 1024;

#[derive(Debug, Deserialize)]
pub struct ImportQuery {
    pub entity: Option<String>,
}

/// POST /import/csv?entity=lead|company
pub async fn import_csv(
    State(state): State<AppState>,
    Query(query): Query<ImportQuery>,
    body: Bytes,
) -> ApiResult<Json<ImportReport>> {
    let entity: EntityKind = query
        .entity
        .as_deref()
        .ok_or_else(|| ApiError::BadRequest("Query parameter 'entity' is required.".to_string()))?
        .parse()
        .map_err(ApiError::BadRequest)?;

    let text = std::str::from_utf8(&body)
        .map_err(|e| ApiError::BadRequest(format!("CSV body is not valid UTF-8: {}", e)))?;

    let report = csv_import::import_csv(&state.db, entity, text).await?;
    Ok(Json(report))
}

/// Build CSV import routes
pub fn import_routes() -> Router<AppState> {
    Router::new()
        .route("/import/csv", post(import_csv))
        .layer(DefaultBodyLimit::max(MAX_CSV_BYTES))
}
