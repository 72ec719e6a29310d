//! Structured AI outputs: response schemas and validation
//!
//! Every `parse_*` function takes the raw model text and either returns a
//! fully validated value or an [`OutputError`] describing what was wrong.
//! Nothing is repaired or defaulted beyond what the schema allows.

use copilot_common::models::{CountValue, Firmographics};
use copilot_common::validation::normalize_optional;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;

pub const OUTREACH_SCHEMA_NAME: &str = "outreach_messages";
pub const COMPANY_OUTREACH_SCHEMA_NAME: &str = "company_outreach";
pub const NEWS_SCHEMA_NAME: &str = "company_news";
pub const ENRICHMENT_SCHEMA_NAME: &str = "company_enrichment";

#[derive(Debug, Error, PartialEq)]
pub enum OutputError {
    #[error("Unable to parse AI response as JSON: {0}")]
    NotJson(String),

    #[error("Invalid {payload} payload: {message}")]
    Schema {
        payload: &'static str,
        message: String,
    },
}

impl OutputError {
    fn schema(payload: &'static str, message: impl Into<String>) -> Self {
        OutputError::Schema {
            payload,
            message: message.into(),
        }
    }
}

/// Per-channel outreach drafts; exactly these three keys
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutreachMessages {
    pub email: String,
    #[serde(rename = "linkedIn")]
    pub linked_in: String,
    pub whatsapp: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsItem {
    pub date: String,
    pub title: String,
    pub summary: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct NewsDigest {
    #[serde(default)]
    pub items: Vec<NewsItem>,
}

/// Firmographic fields proposed by the model; every key optional
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CompanyEnrichment {
    pub linked_in: Option<String>,
    pub description: Option<String>,
    pub sector: Option<String>,
    pub sub_sector: Option<String>,
    pub employees: Option<CountValue>,
    pub funding_stage: Option<String>,
    pub investment_info: Option<Value>,
}

impl CompanyEnrichment {
    /// Merge over stored values; blank, missing or unusable fields keep the stored value
    pub fn merge_into(self, stored: &Firmographics) -> Firmographics {
        let text = |proposed: Option<String>, current: &Option<String>| {
            normalize_optional(proposed).or_else(|| current.clone())
        };

        let employees = match self.employees.as_ref().map(CountValue::resolve) {
            Some(Ok(Some(count))) => Some(count),
            _ => stored.employees,
        };

        let investment_info = match self.investment_info {
            None | Some(Value::Null) => stored.investment_info.clone(),
            Some(Value::String(s)) if s.trim().is_empty() => stored.investment_info.clone(),
            Some(value) => Some(value),
        };

        Firmographics {
            linked_in: text(self.linked_in, &stored.linked_in),
            description: text(self.description, &stored.description),
            sector: text(self.sector, &stored.sector),
            sub_sector: text(self.sub_sector, &stored.sub_sector),
            employees,
            funding_stage: text(self.funding_stage, &stored.funding_stage),
            investment_info,
        }
    }
}

pub fn outreach_schema() -> Value {
    json!({
        "type": "object",
        "additionalProperties": false,
        "required": ["email", "linkedIn", "whatsapp"],
        "properties": {
            "email": { "type": "string" },
            "linkedIn": { "type": "string" },
            "whatsapp": { "type": "string" }
        }
    })
}

pub fn news_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "items": {
                "type": "array",
                "items": {
                    "type": "object",
                    "required": ["date", "title", "summary"],
                    "properties": {
                        "date": { "type": "string" },
                        "title": { "type": "string" },
                        "summary": { "type": "string" }
                    }
                }
            }
        }
    })
}

pub fn enrichment_schema() -> Value {
    json!({
        "type": "object",
        "additionalProperties": false,
        "properties": {
            "linkedIn": { "type": "string" },
            "description": { "type": "string" },
            "sector": { "type": "string" },
            "subSector": { "type": "string" },
            "employees": { "anyOf": [{ "type": "integer" }, { "type": "string" }] },
            "fundingStage": { "type": "string" },
            "investmentInfo": {}
        }
    })
}

fn parse_json<T: DeserializeOwned>(payload: &'static str, text: &str) -> Result<T, OutputError> {
    let value: Value =
        serde_json::from_str(text.trim()).map_err(|e| OutputError::NotJson(e.to_string()))?;
    serde_json::from_value(value).map_err(|e| OutputError::schema(payload, e.to_string()))
}

fn require_text(payload: &'static str, field: &str, value: &str) -> Result<(), OutputError> {
    if value.trim().is_empty() {
        Err(OutputError::schema(
            payload,
            format!("`{}` must be a non-empty string", field),
        ))
    } else {
        Ok(())
    }
}

pub fn parse_outreach(text: &str) -> Result<OutreachMessages, OutputError> {
    let messages: OutreachMessages = parse_json("outreach", text)?;
    require_text("outreach", "email", &messages.email)?;
    require_text("outreach", "linkedIn", &messages.linked_in)?;
    require_text("outreach", "whatsapp", &messages.whatsapp)?;
    Ok(messages)
}

pub fn parse_news(text: &str) -> Result<NewsDigest, OutputError> {
    let digest: NewsDigest = parse_json("news", text)?;
    for (index, item) in digest.items.iter().enumerate() {
        require_text("news", &format!("items[{}].date", index), &item.date)?;
        require_text("news", &format!("items[{}].title", index), &item.title)?;
        require_text("news", &format!("items[{}].summary", index), &item.summary)?;
    }
    Ok(digest)
}

pub fn parse_enrichment(text: &str) -> Result<CompanyEnrichment, OutputError> {
    parse_json("enrichment", text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_outreach_accepts_exact_keys() {
        let messages = parse_outreach(
            r#"{"email":"Hi Ada.","linkedIn":"Great to connect.","whatsapp":"Quick chat? Reply yes."}"#,
        )
        .unwrap();
        assert_eq!(messages.linked_in, "Great to connect.");

        let json = serde_json::to_value(&messages).unwrap();
        let mut keys: Vec<&String> = json.as_object().unwrap().keys().collect();
        keys.sort();
        assert_eq!(keys, vec!["email", "linkedIn", "whatsapp"]);
    }

    #[test]
    fn test_parse_outreach_rejects_missing_whatsapp() {
        let err = parse_outreach(r#"{"email":"Hi","linkedIn":"Hello"}"#).unwrap_err();
        assert!(err.to_string().contains("whatsapp"), "{}", err);
    }

    #[test]
    fn test_parse_outreach_rejects_empty_string() {
        let err = parse_outreach(r#"{"email":"Hi","linkedIn":"  ","whatsapp":"Yo"}"#).unwrap_err();
        assert_eq!(
            err,
            OutputError::schema("outreach", "`linkedIn` must be a non-empty string")
        );
    }

    #[test]
    fn test_parse_outreach_rejects_extra_keys_and_non_json() {
        assert!(parse_outreach(
            r#"{"email":"a","linkedIn":"b","whatsapp":"c","sms":"d"}"#
        )
        .is_err());
        assert!(matches!(
            parse_outreach("Here are your messages"),
            Err(OutputError::NotJson(_))
        ));
    }

    #[test]
    fn test_parse_news() {
        assert_eq!(parse_news(r#"{"items":[]}"#).unwrap().items, vec![]);
        assert_eq!(parse_news("{}").unwrap().items, vec![]);

        let digest = parse_news(
            r#"{"items":[{"date":"2024-05-01","title":"Series B","summary":"Raised $40M."}]}"#,
        )
        .unwrap();
        assert_eq!(digest.items[0].title, "Series B");

        assert!(parse_news(r#"{"items":[{"date":"","title":"t","summary":"s"}]}"#).is_err());
        assert!(parse_news(r#"{"items":[{"title":"t","summary":"s"}]}"#).is_err());
    }

    #[test]
    fn test_enrichment_merge_keeps_stored_values() {
        let stored = Firmographics {
            sector: Some("Analytics".to_string()),
            employees: Some(320),
            investment_info: Some(json!({"round": "A"})),
            ..Default::default()
        };
        let enrichment = parse_enrichment(
            r#"{"sector":"  ","description":"Builds engines","employees":"N/A","fundingStage":"Series B"}"#,
        )
        .unwrap();

        let merged = enrichment.merge_into(&stored);
        assert_eq!(merged.sector.as_deref(), Some("Analytics"));
        assert_eq!(merged.description.as_deref(), Some("Builds engines"));
        assert_eq!(merged.employees, Some(320));
        assert_eq!(merged.funding_stage.as_deref(), Some("Series B"));
        assert_eq!(merged.investment_info, Some(json!({"round": "A"})));
    }

    #[test]
    fn test_enrichment_employees_coercion() {
        let enrichment = parse_enrichment(r#"{"employees":"1,200 people"}"#).unwrap();
        assert_eq!(enrichment.merge_into(&Firmographics::default()).employees, Some(1200));

        let enrichment = parse_enrichment(r#"{"employees":85}"#).unwrap();
        assert_eq!(enrichment.merge_into(&Firmographics::default()).employees, Some(85));
    }

    #[test]
    fn test_parse_enrichment_rejects_unknown_keys() {
        assert!(matches!(
            parse_enrichment(r#"{"revenue":"$10M"}"#),
            Err(OutputError::Schema { .. })
        ));
    }
}
