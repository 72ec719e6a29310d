//! Prompt templates

use copilot_common::{Company, Lead};
use serde_json::Value;

pub const LEAD_ENRICHMENT_PROMPT: &str = "You are Sales Copilot, an expert sales analyst.
Given the lead information, summarize actionable insights, highlight buying signals,
identify potential risks, and suggest the next best touchpoint.
Return structured JSON with keys: summary, buyerPersona, recommendedActions, dataPoints.";

pub const COMPANY_ENRICHMENT_PROMPT: &str = "You are Sales Copilot, an AI revenue assistant.
Analyze the company context and surface a concise overview, ideal customer profile fit,
recent strategic moves, and relevant technologies.";

/// Appended to [`COMPANY_ENRICHMENT_PROMPT`] for structured firmographic enrichment
pub const STRUCTURED_ENRICHMENT_SUFFIX: &str =
    "Respond strictly with JSON matching the provided schema.";

pub const NEWS_SYSTEM_PROMPT: &str =
    "You are Sales Copilot, summarizing external news for revenue teams. Respond as JSON.";

pub const LEAD_OUTREACH_PROMPT: &str =
    "You are Sales Copilot, crafting concise, personalized outreach messages. \
     Return JSON only. Tone: warm, professional, value-driven.";

pub const LEAD_OUTREACH_INSTRUCTION: &str =
    "Craft short outreach for three channels: Email (3 sentences), LinkedIn (2 sentences), \
     WhatsApp (one friendly note + CTA). Focus on discovery call value and personalization.";

pub const COMPANY_OUTREACH_PROMPT: &str =
    "You are Sales Copilot, crafting concise account-based outreach. Respond as JSON.";

pub const COMPANY_OUTREACH_INSTRUCTION: &str =
    "Create three short outreach messages: Email (3 sentences), LinkedIn (2 sentences), \
     WhatsApp (one friendly note + CTA). Reference the company context and urge a \
     discovery conversation.";

pub const VOICE_PROMPT: &str =
    "You are Sales Copilot Voice, an SDR assistant conducting a discovery call.\n\
     Gather context, qualify the lead, and schedule a follow-up with clear next steps.";

pub const DEFAULT_CALL_GOAL: &str = "Qualify the lead.";

/// Fields asked for during structured company enrichment
pub const ENRICHABLE_COMPANY_FIELDS: [&str; 7] = [
    "linkedIn",
    "description",
    "sector",
    "subSector",
    "employees",
    "fundingStage",
    "investmentInfo",
];

/// Research prompt for recent company news
pub fn company_news_prompt(company_name: &str, context: Option<&str>) -> String {
    let instructions = [
        "You are Sales Copilot, an AI research analyst.",
        "Find the latest 3-5 noteworthy news items about the specified company.",
        "Each item must include: date (ISO or Month Day, Year), headline/title, \
         and a 1-2 sentence summary that focuses on why it matters to sales teams.",
        "Prioritize credible sources and recent developments such as funding, partnerships, \
         product launches, leadership changes, or market signals.",
        "If no news exists within the past 12 months, state that explicitly in a single sentence \
         instead of inventing items.",
    ];

    let mut lines = vec![
        instructions.join(" "),
        format!("Company: {}", company_name),
    ];
    if let Some(context) = context.map(str::trim).filter(|c| !c.is_empty()) {
        lines.push(format!("Additional context: {}", context));
    }
    lines.push(
        "Output format: JSON with an array \"items\". Each item contains { date, title, summary }."
            .to_string(),
    );

    lines.join("\n")
}

/// `description | sector | fundingStage`, skipping blanks
pub fn company_context(company: &Company) -> Option<String> {
    let fragments: Vec<&str> = [&company.description, &company.sector, &company.funding_stage]
        .into_iter()
        .filter_map(|field| field.as_deref())
        .map(str::trim)
        .filter(|fragment| !fragment.is_empty())
        .collect();

    (!fragments.is_empty()).then(|| fragments.join(" | "))
}

/// Discovery-call script embedding everything known about the lead
pub fn discovery_call_script(lead: &Lead, company: Option<&Company>, goal: &str) -> String {
    let lead_section = format!(
        "Lead details:
- Name: {}
- Title: {}
- Email: {}
- Phone: {}
- LinkedIn: {}
- Personal notes: {}
- AI insights: {}
- Recent news: {}
- Messages: {}",
        lead.full_name,
        or_unknown(&lead.title),
        or_unknown(&lead.email),
        or_unknown(&lead.phone),
        or_unknown(&lead.linked_in),
        or_none(&lead.personal_notes),
        or_none(&lead.ai_insights),
        format_news(lead.news_feed.as_ref()),
        format_messages(lead.messages.as_ref()),
    );

    let company_section = match company {
        Some(company) => format!(
            "Company details:
- Name: {}
- Website: {}
- LinkedIn: {}
- Sector: {}
- Sub-sector: {}
- Employees: {}
- Funding stage: {}
- Investment info: {}
- AI insights: {}
- Recent news: {}
- Associated leads: {}",
            company.name,
            or_unknown(&company.website),
            or_unknown(&company.linked_in),
            or_unknown(&company.sector),
            or_unknown(&company.sub_sector),
            company
                .employees
                .map(|n| n.to_string())
                .unwrap_or_else(|| "Unknown".to_string()),
            or_unknown(&company.funding_stage),
            format_investment(company.investment_info.as_ref()),
            or_none(&company.ai_insights),
            format_news(company.news_feed.as_ref()),
            company
                .associated_leads
                .as_ref()
                .filter(|ids| !ids.is_empty())
                .map(|ids| ids.join(", "))
                .unwrap_or_else(|| "None".to_string()),
        ),
        None => "Company details: Unknown".to_string(),
    };

    let goal = match goal.trim() {
        "" => DEFAULT_CALL_GOAL,
        goal => goal,
    };

    [
        VOICE_PROMPT.to_string(),
        "Your goal is to qualify the prospect, understand their needs, and schedule a follow-up demo."
            .to_string(),
        String::new(),
        lead_section,
        String::new(),
        company_section,
        String::new(),
        "Call objectives:
1. Build rapport using the notes and AI insights.
2. Confirm current priorities and pain points.
3. Introduce Sales Copilot's value props tailored to their context.
4. Secure agreement on next steps (demo or follow-up meeting)."
            .to_string(),
        String::new(),
        format!("Goal: {}", goal),
        String::new(),
        "Ensure the tone stays consultative, concise, and outcome-driven.".to_string(),
    ]
    .join("\n")
}

fn or_unknown(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or("Unknown")
}

fn or_none(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or("None")
}

fn field(object: &serde_json::Map<String, Value>, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| match object.get(*key)? {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    })
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
        other => Some(other.to_string()),
    }
}

fn is_empty(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.is_empty(),
        Some(Value::Array(items)) => items.is_empty(),
        _ => false,
    }
}

/// News items as `title (published date)`, joined by `; `
fn format_news(news: Option<&Value>) -> String {
    if is_empty(news) {
        return "None".to_string();
    }
    match news {
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| match item {
                Value::Object(object) => {
                    let headline = field(object, &["headline", "title"])
                        .unwrap_or_else(|| "News item".to_string());
                    match field(object, &["publishedAt", "date"]) {
                        Some(date) => format!("{} (published {})", headline, date),
                        None => headline,
                    }
                }
                other => scalar_text(other).unwrap_or_else(|| "News item".to_string()),
            })
            .collect::<Vec<_>>()
            .join("; "),
        Some(other) => scalar_text(other).unwrap_or_else(|| other.to_string()),
        None => "None".to_string(),
    }
}

/// Interaction history as `channel: summary (timestamp)`, joined by `; `
fn format_messages(messages: Option<&Value>) -> String {
    if is_empty(messages) {
        return "None".to_string();
    }
    match messages {
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| match item {
                Value::Object(object) => {
                    let channel =
                        field(object, &["channel"]).unwrap_or_else(|| "channel".to_string());
                    let summary = field(object, &["subject", "notes"])
                        .unwrap_or_else(|| "interaction".to_string());
                    match field(object, &["sentAt", "occurredAt"]) {
                        Some(at) => format!("{}: {} ({})", channel, summary, at),
                        None => format!("{}: {}", channel, summary),
                    }
                }
                other => scalar_text(other).unwrap_or_else(|| "Message".to_string()),
            })
            .collect::<Vec<_>>()
            .join("; "),
        Some(other) => scalar_text(other).unwrap_or_else(|| other.to_string()),
        None => "None".to_string(),
    }
}

fn format_investment(investment: Option<&Value>) -> String {
    if is_empty(investment) {
        return "None".to_string();
    }
    match investment {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Array(items)) => items
            .iter()
            .map(|item| match item {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect::<Vec<_>>()
            .join(", "),
        Some(other) => other.to_string(),
        None => "None".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use serde_json::json;

    fn lead() -> Lead {
        Lead {
            id: "lead-1".to_string(),
            full_name: "Ada Lovelace".to_string(),
            title: Some("Countess".to_string()),
            email: None,
            phone: Some("+15550100".to_string()),
            company_name: None,
            associated_company_id: None,
            linked_in: None,
            personal_notes: Some("Enjoys poetry".to_string()),
            ai_insights: None,
            news_feed: Some(json!([{"title": "Engine unveiled", "date": "1843-09-01"}])),
            messages: Some(json!([
                {"channel": "email", "subject": "Intro", "sentAt": "2024-01-02"}
            ])),
            created_at: Utc::now(),
        }
    }

    fn company() -> Company {
        Company {
            id: "company-1".to_string(),
            name: "Analytical Engines Inc.".to_string(),
            website: None,
            linked_in: None,
            description: Some("  ".to_string()),
            sector: Some("Analytics".to_string()),
            sub_sector: None,
            employees: Some(320),
            funding_stage: Some("Series A".to_string()),
            investment_info: Some(json!(["Turing Ventures", {"round": "A"}])),
            associated_leads: None,
            ai_insights: None,
            news_feed: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_news_prompt_with_and_without_context() {
        let prompt = company_news_prompt("Acme", Some("Robotics | Seed"));
        assert!(prompt.contains("latest 3-5 noteworthy news items"));
        assert!(prompt.contains("\nCompany: Acme\n"));
        assert!(prompt.contains("Additional context: Robotics | Seed"));

        let prompt = company_news_prompt("Acme", Some("   "));
        assert!(!prompt.contains("Additional context"));
    }

    #[test]
    fn test_company_context_skips_blanks() {
        assert_eq!(company_context(&company()).as_deref(), Some("Analytics | Series A"));
    }

    #[test]
    fn test_discovery_script_with_company() {
        let script = discovery_call_script(&lead(), Some(&company()), "Book a demo");

        assert!(script.contains("- Name: Ada Lovelace"));
        assert!(script.contains("- Email: Unknown"));
        assert!(script.contains("- Personal notes: Enjoys poetry"));
        assert!(script.contains("- AI insights: None"));
        assert!(script.contains("- Recent news: Engine unveiled (published 1843-09-01)"));
        assert!(script.contains("- Messages: email: Intro (2024-01-02)"));
        assert!(script.contains("- Employees: 320"));
        assert!(script.contains(r#"- Investment info: Turing Ventures, {"round":"A"}"#));
        assert!(script.contains("Goal: Book a demo"));
    }

    #[test]
    fn test_discovery_script_without_company_uses_default_goal() {
        let script = discovery_call_script(&lead(), None, "  ");
        assert!(script.contains("Company details: Unknown"));
        assert!(script.contains("Goal: Qualify the lead."));
    }
}
