use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::validation::{self, FieldErrors};

/// Sales prospect as stored
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lead {
    pub id: String,
    pub full_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    /// Free-text company name, independent of `associated_company_id`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub company_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub associated_company_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub linked_in: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub personal_notes: Option<String>,
    /// Last AI enrichment summary (overwritten on every enrichment)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_insights: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub news_feed: Option<Value>,
    /// Outreach and interaction history
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub messages: Option<Value>,
    pub created_at: DateTime<Utc>,
}

/// Unvalidated lead fields from a create request or an import row
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeadInput {
    pub full_name: Option<String>,
    pub title: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub company_name: Option<String>,
    pub associated_company_id: Option<String>,
    pub linked_in: Option<String>,
    pub personal_notes: Option<String>,
}

impl LeadInput {
    /// Check the lead rules and produce an insertable [`NewLead`]
    ///
    /// `fullName` must be non-blank, `email` and `linkedIn` must be well
    /// formed when present. Blank optional values become absent.
    pub fn validate(self) -> Result<NewLead, FieldErrors> {
        let mut errors = FieldErrors::new();

        let full_name = validation::require(&mut errors, "fullName", self.full_name);
        let email = validation::optional_email(&mut errors, "email", self.email);
        let linked_in = validation::optional_url(&mut errors, "linkedIn", self.linked_in);

        let lead = NewLead {
            full_name: full_name.unwrap_or_default(),
            title: validation::normalize_optional(self.title),
            email,
            phone: validation::normalize_optional(self.phone),
            company_name: validation::normalize_optional(self.company_name),
            associated_company_id: validation::normalize_optional(self.associated_company_id),
            linked_in,
            personal_notes: validation::normalize_optional(self.personal_notes),
        };

        errors.finish(lead)
    }
}

/// Validated lead ready for insertion
#[derive(Debug, Clone, PartialEq)]
pub struct NewLead {
    pub full_name: String,
    pub title: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub company_name: Option<String>,
    pub associated_company_id: Option<String>,
    pub linked_in: Option<String>,
    pub personal_notes: Option<String>,
}

impl NewLead {
    pub fn named(full_name: impl Into<String>) -> Self {
        Self {
            full_name: full_name.into(),
            title: None,
            email: None,
            phone: None,
            company_name: None,
            associated_company_id: None,
            linked_in: None,
            personal_notes: None,
        }
    }
}

/// Row subset returned after linking a lead to a company (snake_case keys)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkedLead {
    pub id: String,
    pub associated_company_id: Option<String>,
    pub personal_notes: Option<String>,
}

/// Append a link note to existing personal notes
///
/// Blank notes leave the existing value untouched.
pub fn append_link_note(existing: Option<String>, note: Option<&str>) -> Option<String> {
    let note = match note.map(str::trim) {
        Some(n) if !n.is_empty() => n,
        _ => return existing,
    };

    match existing {
        Some(current) if !current.is_empty() => {
            Some(format!("{}\n\nLinked company note: {}", current, note))
        }
        _ => Some(format!("Linked company note: {}", note)),
    }
}
