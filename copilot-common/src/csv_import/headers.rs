//! Header normalization and per-entity alias tables

use super::EntityKind;

/// Normalize a raw CSV header for alias lookup
///
/// Trims, lowercases and keeps only ASCII letters and digits, so
/// `"Associated Company ID"`, `"associated_company_id"` and
/// `"associatedcompanyid"` all normalize to the same key.
pub fn normalize_header(raw: &str) -> String {
    raw.trim()
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

const LEAD_ALIASES: &[(&str, &str)] = &[
    ("fullname", "fullName"),
    ("name", "fullName"),
    ("contactname", "fullName"),
    ("title", "title"),
    ("jobtitle", "title"),
    ("email", "email"),
    ("emailaddress", "email"),
    ("phone", "phone"),
    ("phonenumber", "phone"),
    ("companyname", "companyName"),
    ("company", "companyName"),
    ("associatedcompanyid", "associatedCompanyId"),
    ("companyid", "associatedCompanyId"),
    ("linkedin", "linkedIn"),
    ("linkedinurl", "linkedIn"),
    ("personalnotes", "personalNotes"),
    ("notes", "personalNotes"),
];

const COMPANY_ALIASES: &[(&str, &str)] = &[
    ("name", "name"),
    ("companyname", "name"),
    ("company", "name"),
    ("website", "website"),
    ("websiteurl", "website"),
    ("url", "website"),
    ("linkedin", "linkedIn"),
    ("linkedinurl", "linkedIn"),
    ("description", "description"),
    ("sector", "sector"),
    ("industry", "sector"),
    ("subsector", "subSector"),
    ("employees", "employees"),
    ("employeecount", "employees"),
    ("headcount", "employees"),
    ("fundingstage", "fundingStage"),
    ("stage", "fundingStage"),
    ("investmentinfo", "investmentInfo"),
    ("investment", "investmentInfo"),
];

/// Canonical field name for a raw header, or `None` when the header is unknown
pub fn canonical_field(kind: EntityKind, raw_header: &str) -> Option<&'static str> {
    let table = match kind {
        EntityKind::Lead => LEAD_ALIASES,
        EntityKind::Company => COMPANY_ALIASES,
    };
    let key = normalize_header(raw_header);
    table
        .iter()
        .find(|(alias, _)| *alias == key)
        .map(|(_, field)| *field)
}

/// Map every header column to its canonical field
///
/// Unknown headers map to `None`. When two columns resolve to the same
/// field, only the first keeps it.
pub fn map_columns<'a>(
    kind: EntityKind,
    headers: impl IntoIterator<Item = &'a str>,
) -> Vec<Option<&'static str>> {
    let mut seen: Vec<&'static str> = Vec::new();
    headers
        .into_iter()
        .map(|header| {
            let field = canonical_field(kind, header)?;
            if seen.contains(&field) {
                None
            } else {
                seen.push(field);
                Some(field)
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_header() {
        assert_eq!(normalize_header("  Associated Company ID "), "associatedcompanyid");
        assert_eq!(normalize_header("associated_company_id"), "associatedcompanyid");
        assert_eq!(normalize_header("LinkedIn-URL"), "linkedinurl");
        assert_eq!(normalize_header("\u{feff}Full Name"), "fullname");
    }

    #[test]
    fn test_associated_company_aliases_agree() {
        for header in ["Associated Company ID", "associatedcompanyid", "associated_company_id"] {
            assert_eq!(
                canonical_field(EntityKind::Lead, header),
                Some("associatedCompanyId"),
                "header {:?}",
                header
            );
        }
    }

    #[test]
    fn test_aliases_are_per_entity() {
        assert_eq!(canonical_field(EntityKind::Lead, "Company"), Some("companyName"));
        assert_eq!(canonical_field(EntityKind::Company, "Company"), Some("name"));
        assert_eq!(canonical_field(EntityKind::Lead, "Employees"), None);
        assert_eq!(canonical_field(EntityKind::Company, "Sub-Sector"), Some("subSector"));
    }

    #[test]
    fn test_first_duplicate_column_wins() {
        let columns =
            map_columns(EntityKind::Lead, ["Full Name", "Email", "full_name", "Shoe Size"]);
        assert_eq!(columns, vec![Some("fullName"), Some("email"), None, None]);
    }
}
