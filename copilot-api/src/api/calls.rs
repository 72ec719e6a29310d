//! Discovery calls through the configured voice dialer

use axum::{extract::State, routing::post, Json, Router};
use copilot_common::db::{companies as company_store, leads as lead_store};
use copilot_common::validation::{self, normalize_optional, FieldErrors};
use serde::{Deserialize, Serialize};
use tracing::info;

use super::ValidJson;
use crate::clients::CallRequest;
use crate::error::{ApiError, ApiResult};
use crate::prompts::{self, DEFAULT_CALL_GOAL};
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartCallRequest {
    pub lead_id: Option<String>,
    pub phone_number: Option<String>,
    pub goal: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StartCallResponse {
    pub call_id: String,
}

/// POST /calls
pub async fn start_call(
    State(state): State<AppState>,
    ValidJson(request): ValidJson<StartCallRequest>,
) -> ApiResult<Json<StartCallResponse>> {
    const FAILURE: &str = "Failed to start call. Check API keys and agent configuration.";
    let failed = |e: &dyn std::fmt::Display| ApiError::failed("calls", FAILURE, e);

    let mut errors = FieldErrors::new();
    let lead_id = validation::require(&mut errors, "leadId", request.lead_id);
    let phone_number = validation::require(&mut errors, "phoneNumber", request.phone_number);
    let (lead_id, phone_number) = match errors.finish((lead_id, phone_number))? {
        (Some(lead_id), Some(phone_number)) => (lead_id, phone_number),
        _ => return Err(ApiError::BadRequest("leadId and phoneNumber are required".to_string())),
    };
    let goal = normalize_optional(request.goal).unwrap_or_else(|| DEFAULT_CALL_GOAL.to_string());

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

    let script = prompts::discovery_call_script(&lead, company.as_ref(), &goal);
    let call_id = state
        .voice
        .start_call(CallRequest {
            lead_id: lead_id.clone(),
            phone_number,
            goal,
            script,
        })
        .await
        .map_err(|e| failed(&e))?;

    info!(lead_id = %lead_id, call_id = %call_id, "Discovery call started");
    Ok(Json(StartCallResponse { call_id }))
}

/// Build call routes
pub fn call_routes() -> Router<AppState> {
    Router::new().route("/calls", post(start_call))
}
