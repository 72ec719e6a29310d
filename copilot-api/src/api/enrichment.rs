//! AI enrichment endpoints
//!
//! - `/leads/enrich` and `/companies/enrich` write free-form insights text
//!   to `ai_insights`.
//! - `/enrich-company` asks for structured firmographics and merges them
//!   over the stored company.

use axum::{extract::State, routing::post, Json, Router};
use copilot_common::db::{companies as company_store, leads as lead_store};
use copilot_common::models::Firmographics;
use copilot_common::validation::{self, FieldErrors};
use copilot_common::Company;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{info, warn};

use super::ValidJson;
use crate::ai_output::{self, ENRICHMENT_SCHEMA_NAME};
use crate::clients::{AiError, GenerationRequest, Message};
use crate::error::{ApiError, ApiResult};
use crate::prompts::{
    COMPANY_ENRICHMENT_PROMPT, ENRICHABLE_COMPANY_FIELDS, LEAD_ENRICHMENT_PROMPT,
    STRUCTURED_ENRICHMENT_SUFFIX,
};
use crate::AppState;

/// Written instead of an empty AI answer when `ai.enrichment_placeholder` is on
pub const ENRICHMENT_PLACEHOLDER: &str = "AI enrichment placeholder. Replace with OpenAI response.";

pub const LEAD_FOCUS_TAGS: [&str; 4] = ["summary", "persona", "nextSteps", "firmographics"];
pub const COMPANY_FOCUS_TAGS: [&str; 3] = ["summary", "competitiveLandscape", "technologyStack"];

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadEnrichmentRequest {
    pub lead_id: Option<String>,
    pub notes: Option<String>,
    pub enrichment_fields: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyEnrichmentRequest {
    pub company_id: Option<String>,
    pub notes: Option<String>,
    pub enrichment_fields: Option<Vec<String>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructuredEnrichmentRequest {
    pub company_id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Insights {
    pub id: String,
    pub ai_insights: String,
}

#[derive(Debug, Serialize)]
pub struct LeadInsightsResponse {
    pub lead: Insights,
}

#[derive(Debug, Serialize)]
pub struct CompanyInsightsResponse {
    pub company: Insights,
}

#[derive(Debug, Serialize)]
pub struct CompanyResponse {
    pub company: Company,
}

fn check_focus_tags(errors: &mut FieldErrors, tags: Option<&[String]>, allowed: &[&str]) {
    for tag in tags.unwrap_or_default() {
        if !allowed.contains(&tag.as_str()) {
            errors.add(
                "enrichmentFields",
                format!(
                    "Unknown enrichment field '{}' (expected one of: {})",
                    tag,
                    allowed.join(", ")
                ),
            );
        }
    }
}

/// Run a free-form generation for enrichment insights
///
/// Empty output is an error unless the placeholder switch is on.
async fn generate_insights(
    state: &AppState,
    integration: &str,
    failure: &str,
    system_prompt: &str,
    user_prompt: String,
) -> ApiResult<String> {
    let request = GenerationRequest::new(vec![
        Message::system(system_prompt),
        Message::user(user_prompt),
    ]);

    match state.ai.generate(request).await {
        Ok(text) => Ok(text),
        Err(AiError::EmptyOutput) if state.enrichment_placeholder => {
            warn!(integration, "AI returned no text; writing enrichment placeholder");
            Ok(ENRICHMENT_PLACEHOLDER.to_string())
        }
        Err(e) => Err(ApiError::failed(integration, failure, e)),
    }
}

/// POST /leads/enrich
pub async fn enrich_lead(
    State(state): State<AppState>,
    ValidJson(request): ValidJson<LeadEnrichmentRequest>,
) -> ApiResult<Json<LeadInsightsResponse>> {
    const FAILURE: &str = "Failed to enrich lead. Check OpenAI and database configuration.";

    let mut errors = FieldErrors::new();
    let lead_id = validation::require(&mut errors, "leadId", request.lead_id);
    check_focus_tags(&mut errors, request.enrichment_fields.as_deref(), &LEAD_FOCUS_TAGS);
    let lead_id = errors.finish(lead_id)?.unwrap_or_default();

    let lead = lead_store::get_lead(&state.db, &lead_id)
        .await
        .map_err(|e| ApiError::failed("lead-enrichment", FAILURE, e))?
        .ok_or_else(|| ApiError::NotFound("Lead not found".to_string()))?;

    let user_prompt = json!({
        "lead": lead,
        "notes": request.notes,
        "enrichmentFields": request.enrichment_fields,
    })
    .to_string();
    let insights =
        generate_insights(&state, "lead-enrichment", FAILURE, LEAD_ENRICHMENT_PROMPT, user_prompt)
            .await?;

    let updated = lead_store::update_lead_insights(&state.db, &lead_id, &insights)
        .await
        .map_err(|e| ApiError::failed("lead-enrichment", FAILURE, e))?;
    if !updated {
        return Err(ApiError::NotFound("Lead not found".to_string()));
    }

    info!(lead_id = %lead_id, insight_chars = insights.len(), "Lead enriched");
    Ok(Json(LeadInsightsResponse {
        lead: Insights {
            id: lead_id,
            ai_insights: insights,
        },
    }))
}

/// POST /companies/enrich
pub async fn enrich_company_insights(
    State(state): State<AppState>,
    ValidJson(request): ValidJson<CompanyEnrichmentRequest>,
) -> ApiResult<Json<CompanyInsightsResponse>> {
    const FAILURE: &str = "Failed to enrich company. Verify OpenAI and database configuration.";

    let mut errors = FieldErrors::new();
    let company_id = validation::require(&mut errors, "companyId", request.company_id);
    check_focus_tags(&mut errors, request.enrichment_fields.as_deref(), &COMPANY_FOCUS_TAGS);
    let company_id = errors.finish(company_id)?.unwrap_or_default();

    let company = company_store::get_company(&state.db, &company_id)
        .await
        .map_err(|e| ApiError::failed("company-enrichment", FAILURE, e))?
        .ok_or_else(|| ApiError::NotFound("Company not found".to_string()))?;

    let user_prompt = json!({
        "company": company,
        "notes": request.notes,
        "enrichmentFields": request.enrichment_fields,
    })
    .to_string();
    let insights = generate_insights(
        &state,
        "company-enrichment",
        FAILURE,
        COMPANY_ENRICHMENT_PROMPT,
        user_prompt,
    )
    .await?;

    let updated = company_store::update_company_insights(&state.db, &company_id, &insights)
        .await
        .map_err(|e| ApiError::failed("company-enrichment", FAILURE, e))?;
    if !updated {
        return Err(ApiError::NotFound("Company not found".to_string()));
    }

    info!(company_id = %company_id, insight_chars = insights.len(), "Company enriched");
    Ok(Json(CompanyInsightsResponse {
        company: Insights {
            id: company_id,
            ai_insights: insights,
        },
    }))
}

/// POST /enrich-company
pub async fn enrich_company_firmographics(
    State(state): State<AppState>,
    ValidJson(request): ValidJson<StructuredEnrichmentRequest>,
) -> ApiResult<Json<CompanyResponse>> {
    const FAILURE: &str = "Failed to enrich company.";
    let failed = |e: &dyn std::fmt::Display| ApiError::failed("enrich-company", FAILURE, e);

    let mut errors = FieldErrors::new();
    let company_id = validation::require(&mut errors, "companyId", request.company_id);
    let company_id = errors.finish(company_id)?.unwrap_or_default();

    let company = company_store::get_company(&state.db, &company_id)
        .await
        .map_err(|e| failed(&e))?
        .ok_or_else(|| ApiError::NotFound("Company not found".to_string()))?;

    let request = GenerationRequest::new(vec![
        Message::system(format!(
            "{}\n{}",
            COMPANY_ENRICHMENT_PROMPT, STRUCTURED_ENRICHMENT_SUFFIX
        )),
        Message::user(
            json!({ "company": company, "enrichFields": ENRICHABLE_COMPANY_FIELDS }).to_string(),
        ),
    ])
    .with_format(ENRICHMENT_SCHEMA_NAME, ai_output::enrichment_schema(), false);

    let text = state.ai.generate(request).await.map_err(|e| failed(&e))?;
    let enrichment = ai_output::parse_enrichment(&text).map_err(|e| failed(&e))?;
    let merged = enrichment.merge_into(&Firmographics::of(&company));

    let updated = company_store::update_firmographics(&state.db, &company_id, &merged)
        .await
        .map_err(|e| failed(&e))?
        .ok_or_else(|| ApiError::NotFound("Company not found".to_string()))?;

    info!(company_id = %company_id, "Company firmographics enriched");
    Ok(Json(CompanyResponse { company: updated }))
}

/// Build enrichment routes
pub fn enrichment_routes() -> Router<AppState> {
    Router::new()
        .route("/leads/enrich", post(enrich_lead))
        .route("/companies/enrich", post(enrich_company_insights))
        .route("/enrich-company", post(enrich_company_firmographics))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_focus_tags_accept_known_values() {
        let mut errors = FieldErrors::new();
        let tags = vec!["summary".to_string(), "nextSteps".to_string()];
        check_focus_tags(&mut errors, Some(tags.as_slice()), &LEAD_FOCUS_TAGS);
        assert!(errors.is_empty());

        check_focus_tags(&mut errors, None, &COMPANY_FOCUS_TAGS);
        assert!(errors.is_empty());
    }

    #[test]
    fn test_focus_tags_reject_unknown_values() {
        let mut errors = FieldErrors::new();
        let tags = vec!["persona".to_string()];
        check_focus_tags(&mut errors, Some(tags.as_slice()), &COMPANY_FOCUS_TAGS);
        assert!(errors.has_field("enrichmentFields"));
    }
}
