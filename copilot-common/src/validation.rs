//! Field-level validation shared by create inputs, CSV rows and API requests
//!
//! Errors are collected per field into [`FieldErrors`], whose JSON form is
//! `{"formErrors": [...], "fieldErrors": {"field": [...]}}`.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

static EMAIL_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles"));

/// Validation failures grouped by field
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldErrors {
    /// Errors not tied to a single field
    pub form_errors: Vec<String>,
    /// Errors keyed by camelCase field name
    pub field_errors: BTreeMap<String, Vec<String>>,
}

impl FieldErrors {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an error against a field
    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.field_errors
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    /// Record an error that applies to the whole payload
    pub fn add_form(&mut self, message: impl Into<String>) {
        self.form_errors.push(message.into());
    }

    pub fn is_empty(&self) -> bool {
        self.form_errors.is_empty() && self.field_errors.is_empty()
    }

    pub fn has_field(&self, field: &str) -> bool {
        self.field_errors.contains_key(field)
    }

    /// Single-error convenience constructor
    pub fn single(field: &str, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    /// `Ok(value)` when nothing was recorded, otherwise `Err(self)`
    pub fn finish<T>(self, value: T) -> Result<T, FieldErrors> {
        if self.is_empty() {
            Ok(value)
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts: Vec<String> = self.form_errors.clone();
        for (field, messages) in &self.field_errors {
            parts.push(format!("{}: {}", field, messages.join(", ")));
        }
        write!(f, "{}", parts.join("; "))
    }
}

impl std::error::Error for FieldErrors {}

/// Trim an optional string; blank values become `None`
pub fn normalize_optional(value: Option<String>) -> Option<String> {
    value.and_then(|v| {
        let trimmed = v.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

/// Required non-blank string; records "`<field>` is required" when missing
pub fn require(errors: &mut FieldErrors, field: &str, value: Option<String>) -> Option<String> {
    let value = normalize_optional(value);
    if value.is_none() {
        errors.add(field, format!("{} is required", field));
    }
    value
}

/// Optional URL field; records an error for a present but invalid URL
pub fn optional_url(
    errors: &mut FieldErrors,
    field: &str,
    value: Option<String>,
) -> Option<String> {
    let value = normalize_optional(value);
    if let Some(url) = &value {
        if !is_valid_url(url) {
            errors.add(field, "Invalid url");
        }
    }
    value
}

/// Optional email field; records an error for a present but invalid address
pub fn optional_email(
    errors: &mut FieldErrors,
    field: &str,
    value: Option<String>,
) -> Option<String> {
    let value = normalize_optional(value);
    if let Some(email) = &value {
        if !is_valid_email(email) {
            errors.add(field, "Invalid email");
        }
    }
    value
}

/// Absolute http(s) URL with a host
pub fn is_valid_url(value: &str) -> bool {
    match url::Url::parse(value) {
        Ok(url) => matches!(url.scheme(), "http" | "https") && url.host_str().is_some(),
        Err(_) => false,
    }
}

pub fn is_valid_email(value: &str) -> bool {
    EMAIL_PATTERN.is_match(value)
}

/// Coerce a free-text count such as `"1,000 employees"` to an integer
///
/// Every non-digit character is stripped first. Text without digits yields
/// `Ok(None)` (absent, not zero). Only a digit run too long for `i64` is an
/// error.
pub fn parse_count(raw: &str) -> Result<Option<i64>, String> {
    let digits: String = raw.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return Ok(None);
    }
    digits
        .parse::<i64>()
        .map(Some)
        .map_err(|_| format!("'{}' is out of range", raw.trim()))
}
