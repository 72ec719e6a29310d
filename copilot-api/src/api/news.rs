//! Recent company news, generated on demand and never stored

use axum::{extract::State, routing::post, Json, Router};
use copilot_common::db::companies as store;
use copilot_common::validation::normalize_optional;
use serde::Deserialize;
use tracing::info;

use super::ValidJson;
use crate::ai_output::{self, NewsDigest, NEWS_SCHEMA_NAME};
use crate::clients::{GenerationRequest, Message};
use crate::error::{ApiError, ApiResult};
use crate::prompts::{self, NEWS_SYSTEM_PROMPT};
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyNewsRequest {
    pub company_id: Option<String>,
    pub company_name: Option<String>,
}

/// POST /company-news
///
/// An explicit `companyName` wins over the stored name; the stored row
/// still contributes context when `companyId` is given.
pub async fn company_news(
    State(state): State<AppState>,
    ValidJson(request): ValidJson<CompanyNewsRequest>,
) -> ApiResult<Json<NewsDigest>> {
    const FAILURE: &str = "Failed to gather company news.";
    let failed = |e: &dyn std::fmt::Display| ApiError::failed("company-news", FAILURE, e);

    let company_id = normalize_optional(request.company_id);
    let company_name = normalize_optional(request.company_name);
    if company_id.is_none() && company_name.is_none() {
        return Err(ApiError::BadRequest(
            "Provide a companyId or companyName.".to_string(),
        ));
    }

    let mut resolved_name = company_name;
    let mut context = None;
    if let Some(id) = company_id.as_deref() {
        let company = store::get_company(&state.db, id)
            .await
            .map_err(|e| failed(&e))?
            .ok_or_else(|| ApiError::NotFound("Company not found".to_string()))?;
        context = prompts::company_context(&company);
        resolved_name = resolved_name.or(Some(company.name));
    }
    let name = resolved_name
        .ok_or_else(|| ApiError::BadRequest("Unable to resolve company name.".to_string()))?;

    let request = GenerationRequest::new(vec![
        Message::system(NEWS_SYSTEM_PROMPT),
        Message::user(prompts::company_news_prompt(&name, context.as_deref())),
    ])
    .with_format(NEWS_SCHEMA_NAME, ai_output::news_schema(), false);

    let text = state.ai.generate(request).await.map_err(|e| failed(&e))?;
    let digest = ai_output::parse_news(&text).map_err(|e| failed(&e))?;

    info!(
        company_id = company_id.as_deref().unwrap_or("n/a"),
        company_name = %name,
        count = digest.items.len(),
        "Company news generated"
    );
    Ok(Json(digest))
}

/// Build news routes
pub fn news_routes() -> Router<AppState> {
    Router::new().route("/company-news", post(company_news))
}
