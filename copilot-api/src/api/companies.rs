//! Company endpoints: list, create, JSON row import

use axum::{extract::State, http::StatusCode, routing::{get, post}, Json, Router};
use copilot_common::csv_import;
use copilot_common::db::companies as store;
use copilot_common::models::CompanyInput;
use copilot_common::Company;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::info;

use super::ValidJson;
use crate::error::{ApiError, ApiResult};
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct CompaniesResponse {
    pub companies: Vec<Company>,
}

#[derive(Debug, Deserialize)]
pub struct CompanyImportRequest {
    pub rows: Vec<CompanyInput>,
}

/// GET /companies
pub async fn list_companies(State(state): State<AppState>) -> ApiResult<Json<CompaniesResponse>> {
    let companies = store::list_companies(&state.db)
        .await
        .map_err(|e| ApiError::failed("companies", "Failed to load companies.", e))?;
    Ok(Json(CompaniesResponse { companies }))
}

/// POST /companies
pub async fn create_company(
    State(state): State<AppState>,
    ValidJson(input): ValidJson<CompanyInput>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let company = input.validate()?;
    let id = store::insert_company(&state.db, &company)
        .await
        .map_err(|e| ApiError::failed("companies", "Failed to create company.", e))?;

    info!(company_id = %id, "Company created");
    Ok((StatusCode::CREATED, Json(json!({ "ok": true }))))
}

/// POST /companies/import
pub async fn import_companies(
    State(state): State<AppState>,
    ValidJson(request): ValidJson<CompanyImportRequest>,
) -> ApiResult<Json<Value>> {
    let inserted = csv_import::import_companies(&state.db, request.rows).await?;
    info!(inserted, "Company rows imported");
    Ok(Json(json!({ "inserted": inserted })))
}

/// Build company routes
pub fn company_routes() -> Router<AppState> {
    Router::new()
        .route("/companies", get(list_companies).post(create_company))
        .route("/companies/import", post(import_companies))
}
