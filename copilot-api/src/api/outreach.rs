//! Outreach drafts for a lead or a company (not persisted)

use axum::{extract::State, routing::post, Json, Router};
use copilot_common::db::{companies as company_store, leads as lead_store};
use copilot_common::validation::{self, FieldErrors};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;

use super::ValidJson;
use crate::ai_output::{self, OutreachMessages, COMPANY_OUTREACH_SCHEMA_NAME, OUTREACH_SCHEMA_NAME};
use crate::clients::{GenerationRequest, Message};
use crate::error::{ApiError, ApiResult};
use crate::prompts::{
    COMPANY_OUTREACH_INSTRUCTION, COMPANY_OUTREACH_PROMPT, LEAD_OUTREACH_INSTRUCTION,
    LEAD_OUTREACH_PROMPT,
};
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadOutreachRequest {
    pub lead_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyOutreachRequest {
    pub company_id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadOutreachResponse {
    pub lead_id: String,
    pub messages: OutreachMessages,
}

#[derive(Debug, Serialize)]
pub struct CompanyOutreachResponse {
    pub messages: OutreachMessages,
}

/// POST /ai-message
pub async fn lead_message(
    State(state): State<AppState>,
    ValidJson(request): ValidJson<LeadOutreachRequest>,
) -> ApiResult<Json<LeadOutreachResponse>> {
    const FAILURE: &str = "Failed to generate outreach messages.";
    let failed = |e: &dyn std::fmt::Display| ApiError::failed("ai-message", FAILURE, e);

    let mut errors = FieldErrors::new();
    let lead_id = validation::require(&mut errors, "leadId", request.lead_id);
    let lead_id = errors.finish(lead_id)?.unwrap_or_default();

    let lead = lead_store::get_lead(&state.db, &lead_id)
        .await
        .map_err(|e| failed(&e))?
        .ok_or_else(|| ApiError::NotFound("Lead not found".to_string()))?;

    let company = match lead.associated_company_id.as_deref() {
        Some(company_id) => company_store::get_company(&state.db, company_id)
            .await
            .map_err(|e| failed(&e))?,
        None => None,
    };
    let has_company = company.is_some();

    let request = GenerationRequest::new(vec![
        Message::system(LEAD_OUTREACH_PROMPT),
        Message::user(json!({ "lead": lead, "company": company }).to_string()),
        Message::assistant(LEAD_OUTREACH_INSTRUCTION),
    ])
    .with_format(OUTREACH_SCHEMA_NAME, ai_output::outreach_schema(), true);

    let text = state.ai.generate(request).await.map_err(|e| failed(&e))?;
    let messages = ai_output::parse_outreach(&text).map_err(|e| failed(&e))?;

    info!(lead_id = %lead_id, has_company, "Lead outreach generated");
    Ok(Json(LeadOutreachResponse { lead_id, messages }))
}

/// POST /company-message
pub async fn company_message(
    State(state): State<AppState>,
    ValidJson(request): ValidJson<CompanyOutreachRequest>,
) -> ApiResult<Json<CompanyOutreachResponse>> {
    const FAILURE: &str = "Failed to generate company outreach.";
    let failed = |e: &dyn std::fmt::Display| ApiError::failed("company-message", FAILURE, e);

    let mut errors = FieldErrors::new();
    let company_id = validation::require(&mut errors, "companyId", request.company_id);
    let company_id = errors.finish(company_id)?.unwrap_or_default();

    let company = company_store::get_company(&state.db, &company_id)
        .await
        .map_err(|e| failed(&e))?
        .ok_or_else(|| ApiError::NotFound("Company not found".to_string()))?;

    let request = GenerationRequest::new(vec![
        Message::system(COMPANY_OUTREACH_PROMPT),
        Message::user(json!({ "company": company }).to_string()),
        Message::assistant(COMPANY_OUTREACH_INSTRUCTION),
    ])
    .with_format(COMPANY_OUTREACH_SCHEMA_NAME, ai_output::outreach_schema(), true);

    let text = state.ai.generate(request).await.map_err(|e| failed(&e))?;
    let messages = ai_output::parse_outreach(&text).map_err(|e| failed(&e))?;

    info!(company_id = %company_id, "Company outreach generated");
    Ok(Json(CompanyOutreachResponse { messages }))
}

/// Build outreach routes
pub fn outreach_routes() -> Router<AppState> {
    Router::new()
        .route("/ai-message", post(lead_message))
        .route("/company-message", post(company_message))
}
