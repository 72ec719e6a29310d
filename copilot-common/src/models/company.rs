use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::validation::{self, FieldErrors};

/// Account-level firmographic record as stored
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Company {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linked_in: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sector: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_sector: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub employees: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub funding_stage: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub investment_info: Option<Value>,
    /// Denormalized back-reference to lead ids; not maintained on link
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub associated_leads: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_insights: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub news_feed: Option<Value>,
    pub created_at: DateTime<Utc>,
}

/// Employee count as supplied by a caller: a JSON number or free text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CountValue {
    Number(i64),
    Text(String),
}

impl CountValue {
    /// Resolve to a non-negative integer; text without digits is absent
    pub fn resolve(&self) -> Result<Option<i64>, String> {
        match self {
            CountValue::Number(n) if *n < 0 => {
                Err("Number must be greater than or equal to 0".to_string())
            }
            CountValue::Number(n) => Ok(Some(*n)),
            CountValue::Text(text) => validation::parse_count(text),
        }
    }
}

/// Unvalidated company fields from a create request or an import row
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyInput {
    pub name: Option<String>,
    pub website: Option<String>,
    pub linked_in: Option<String>,
    pub description: Option<String>,
    pub sector: Option<String>,
    pub sub_sector: Option<String>,
    pub employees: Option<CountValue>,
    pub funding_stage: Option<String>,
    pub investment_info: Option<Value>,
}

impl CompanyInput {
    /// Check the company rules and produce an insertable [`NewCompany`]
    pub fn validate(self) -> Result<NewCompany, FieldErrors> {
        let mut errors = FieldErrors::new();

        let name = validation::require(&mut errors, "name", self.name);
        let website = validation::optional_url(&mut errors, "website", self.website);
        let linked_in = validation::optional_url(&mut errors, "linkedIn", self.linked_in);

        let employees = match self.employees.as_ref().map(CountValue::resolve) {
            Some(Ok(count)) => count,
            Some(Err(message)) => {
                errors.add("employees", message);
                None
            }
            None => None,
        };

        let investment_info = match self.investment_info {
            Some(Value::Null) => None,
            Some(Value::String(text)) => {
                validation::normalize_optional(Some(text)).map(Value::String)
            }
            other => other,
        };

        let company = NewCompany {
            name: name.unwrap_or_default(),
            website,
            linked_in,
            description: validation::normalize_optional(self.description),
            sector: validation::normalize_optional(self.sector),
            sub_sector: validation::normalize_optional(self.sub_sector),
            employees,
            funding_stage: validation::normalize_optional(self.funding_stage),
            investment_info,
        };

        errors.finish(company)
    }
}

/// Validated company ready for insertion
#[derive(Debug, Clone, PartialEq)]
pub struct NewCompany {
    pub name: String,
    pub website: Option<String>,
    pub linked_in: Option<String>,
    pub description: Option<String>,
    pub sector: Option<String>,
    pub sub_sector: Option<String>,
    pub employees: Option<i64>,
    pub funding_stage: Option<String>,
    pub investment_info: Option<Value>,
}

impl NewCompany {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            website: None,
            linked_in: None,
            description: None,
            sector: None,
            sub_sector: None,
            employees: None,
            funding_stage: None,
            investment_info: None,
        }
    }
}

/// Firmographic columns written by structured company enrichment
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Firmographics {
    pub linked_in: Option<String>,
    pub description: Option<String>,
    pub sector: Option<String>,
    pub sub_sector: Option<String>,
    pub employees: Option<i64>,
    pub funding_stage: Option<String>,
    pub investment_info: Option<Value>,
}

impl Firmographics {
    /// Current firmographic values of a stored company
    pub fn of(company: &Company) -> Self {
        Self {
            linked_in: company.linked_in.clone(),
            description: company.description.clone(),
            sector: company.sector.clone(),
            sub_sector: company.sub_sector.clone(),
            employees: company.employees,
            funding_stage: company.funding_stage.clone(),
            investment_info: company.investment_info.clone(),
        }
    }
}
