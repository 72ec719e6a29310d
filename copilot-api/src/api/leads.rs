//! Lead endpoints: list, create, JSON row import, link to company

use axum::{extract::State, http::StatusCode, routing::{get, post}, Json, Router};
use copilot_common::csv_import;
use copilot_common::db::leads as store;
use copilot_common::models::{LeadInput, LinkedLead};
use copilot_common::validation::{self, FieldErrors};
use copilot_common::Lead;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::info;

use super::ValidJson;
use crate::error::{ApiError, ApiResult};
use crate::AppState;

#[derive(Debug, Serialize)]
pub struct LeadsResponse {
    pub leads: Vec<Lead>,
}

#[derive(Debug, Deserialize)]
pub struct LeadImportRequest {
    pub rows: Vec<LeadInput>,
}

/// `companyId` and `notes` may be null or missing; both mean "none"
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkCompanyRequest {
    pub lead_id: Option<String>,
    pub company_id: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LinkCompanyResponse {
    pub lead: LinkedLead,
}

/// GET /leads
pub async fn list_leads(State(state): State<AppState>) -> ApiResult<Json<LeadsResponse>> {
    let leads = store::list_leads(&state.db)
        .await
        .map_err(|e| ApiError::failed("leads", "Failed to load leads.", e))?;
    Ok(Json(LeadsResponse { leads }))
}

/// POST /leads
pub async fn create_lead(
    State(state): State<AppState>,
    ValidJson(input): ValidJson<LeadInput>,
) -> ApiResult<(StatusCode, Json<Value>)> {
    let lead = input.validate()?;
    let id = store::insert_lead(&state.db, &lead)
        .await
        .map_err(|e| ApiError::failed("leads", "Failed to create lead.", e))?;

    info!(lead_id = %id, "Lead created");
    Ok((StatusCode::CREATED, Json(json!({ "ok": true }))))
}

/// POST /leads/import
pub async fn import_leads(
    State(state): State<AppState>,
    ValidJson(request): ValidJson<LeadImportRequest>,
) -> ApiResult<Json<Value>> {
    let inserted = csv_import::import_leads(&state.db, request.rows).await?;
    info!(inserted, "Lead rows imported");
    Ok(Json(json!({ "inserted": inserted })))
}

/// POST /leads/link-company
pub async fn link_company(
    State(state): State<AppState>,
    ValidJson(request): ValidJson<LinkCompanyRequest>,
) -> ApiResult<Json<LinkCompanyResponse>> {
    let mut errors = FieldErrors::new();
    let lead_id = validation::require(&mut errors, "leadId", request.lead_id);
    if matches!(&request.company_id, Some(id) if id.trim().is_empty()) {
        errors.add("companyId", "companyId must not be empty");
    }
    let lead_id = errors.finish(lead_id)?.unwrap_or_default();
    let company_id = request.company_id.map(|id| id.trim().to_string());

    let linked = store::link_company(
        &state.db,
        &lead_id,
        company_id.as_deref(),
        request.notes.as_deref(),
    )
    .await
    .map_err(|e| ApiError::failed("link-company", "Failed to link company to lead.", e))?
    .ok_or_else(|| ApiError::NotFound("Lead not found.".to_string()))?;

    info!(
        lead_id = %linked.id,
        company_id = linked.associated_company_id.as_deref().unwrap_or("none"),
        "Lead linked to company"
    );
    Ok(Json(LinkCompanyResponse { lead: linked }))
}

/// Build lead routes
pub fn lead_routes() -> Router<AppState> {
    Router::new()
        .route("/leads", get(list_leads).post(create_lead))
        .route("/leads/import", post(import_leads))
        .route("/leads/link-company", post(link_company))
}
