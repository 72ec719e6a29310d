//! CSV import pipeline
//!
//! Parse a header-row CSV document, map headers through the per-entity
//! alias table, validate every row with the same rules as the create
//! endpoints and bulk insert the batch in one transaction. The first
//! invalid row aborts the import and nothing is written.

pub mod headers;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::SqlitePool;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use tracing::{info, warn};

use crate::db;
use crate::models::{CompanyInput, CountValue, LeadInput, NewCompany, NewLead};
use crate::validation::FieldErrors;

/// Kind of record an import targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Lead,
    Company,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Lead => "lead",
            EntityKind::Company => "company",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lead" | "leads" => Ok(EntityKind::Lead),
            "company" | "companies" => Ok(EntityKind::Company),
            other => Err(format!(
                "Unknown entity '{}' (expected 'lead' or 'company')",
                other
            )),
        }
    }
}

/// Outcome of a successful import
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImportReport {
    pub entity: EntityKind,
    pub parsed: usize,
    pub inserted: usize,
}

#[derive(Error, Debug)]
pub enum ImportError {
    /// Malformed CSV (e.g. a row with a different field count than the header)
    #[error("CSV parse error: {0}")]
    Parse(#[from] csv::Error),

    /// A data row failed validation; `row` is the 1-based data record number
    /// in the source, counting skipped blank records
    #[error("Row {row} is invalid: {errors}")]
    InvalidRow { row: usize, errors: FieldErrors },

    #[error("Failed to store rows: {0}")]
    Store(#[from] crate::Error),
}

/// One data row keyed by canonical field name; blank cells are left out
pub type CanonicalRow = HashMap<&'static str, String>;

/// A row paired with its 1-based data record number
pub type Numbered<T> = (usize, T);

/// Number rows from 1 in the order given
pub fn numbered<T>(rows: Vec<T>) -> impl Iterator<Item = Numbered<T>> {
    rows.into_iter().enumerate().map(|(index, row)| (index + 1, row))
}

/// Parse CSV text into canonical rows
///
/// Records whose cells are all blank are skipped but still counted, so row
/// numbers match the data records in the file.
pub fn read_records(
    kind: EntityKind,
    content: &str,
) -> Result<Vec<Numbered<CanonicalRow>>, ImportError> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(content.as_bytes());

    let columns = headers::map_columns(kind, reader.headers()?.iter());

    let mut rows = Vec::new();
    for (index, record) in reader.records().enumerate() {
        let record = record?;
        if record.iter().all(|cell| cell.trim().is_empty()) {
            continue;
        }

        let row: CanonicalRow = columns
            .iter()
            .zip(record.iter())
            .filter_map(|(field, cell)| {
                let field = (*field)?;
                let cell = cell.trim();
                (!cell.is_empty()).then(|| (field, cell.to_string()))
            })
            .collect();
        rows.push((index + 1, row));
    }

    Ok(rows)
}

fn lead_input(mut row: CanonicalRow) -> LeadInput {
    LeadInput {
        full_name: row.remove("fullName"),
        title: row.remove("title"),
        email: row.remove("email"),
        phone: row.remove("phone"),
        company_name: row.remove("companyName"),
        associated_company_id: row.remove("associatedCompanyId"),
        linked_in: row.remove("linkedIn"),
        personal_notes: row.remove("personalNotes"),
    }
}

fn company_input(mut row: CanonicalRow) -> CompanyInput {
    CompanyInput {
        name: row.remove("name"),
        website: row.remove("website"),
        linked_in: row.remove("linkedIn"),
        description: row.remove("description"),
        sector: row.remove("sector"),
        sub_sector: row.remove("subSector"),
        employees: row.remove("employees").map(CountValue::Text),
        funding_stage: row.remove("fundingStage"),
        investment_info: row.remove("investmentInfo").map(investment_info_cell),
    }
}

/// JSON when the cell parses as JSON, otherwise the raw text
fn investment_info_cell(cell: String) -> Value {
    serde_json::from_str(&cell).unwrap_or(Value::String(cell))
}

/// Validate lead rows in order, stopping at the first invalid one
pub fn prepare_leads(
    rows: impl IntoIterator<Item = Numbered<LeadInput>>,
) -> Result<Vec<NewLead>, ImportError> {
    rows.into_iter()
        .map(|(row, input)| {
            input
                .validate()
                .map_err(|errors| ImportError::InvalidRow { row, errors })
        })
        .collect()
}

/// Validate company rows in order, stopping at the first invalid one
pub fn prepare_companies(
    rows: impl IntoIterator<Item = Numbered<CompanyInput>>,
) -> Result<Vec<NewCompany>, ImportError> {
    rows.into_iter()
        .map(|(row, input)| {
            input
                .validate()
                .map_err(|errors| ImportError::InvalidRow { row, errors })
        })
        .collect()
}

async fn store_leads(
    pool: &SqlitePool,
    rows: impl IntoIterator<Item = Numbered<LeadInput>>,
) -> Result<usize, ImportError> {
    let leads = prepare_leads(rows)?;
    Ok(db::leads::insert_leads(pool, &leads).await?)
}

async fn store_companies(
    pool: &SqlitePool,
    rows: impl IntoIterator<Item = Numbered<CompanyInput>>,
) -> Result<usize, ImportError> {
    let companies = prepare_companies(rows)?;
    Ok(db::companies::insert_companies(pool, &companies).await?)
}

/// Validate and bulk insert lead rows that are already keyed by canonical name
pub async fn import_leads(pool: &SqlitePool, rows: Vec<LeadInput>) -> Result<usize, ImportError> {
    store_leads(pool, numbered(rows)).await
}

/// Validate and bulk insert company rows that are already keyed by canonical name
pub async fn import_companies(
    pool: &SqlitePool,
    rows: Vec<CompanyInput>,
) -> Result<usize, ImportError> {
    store_companies(pool, numbered(rows)).await
}

/// Run the full pipeline over CSV text
pub async fn import_csv(
    pool: &SqlitePool,
    kind: EntityKind,
    content: &str,
) -> Result<ImportReport, ImportError> {
    let rows = read_records(kind, content).map_err(|e| {
        warn!(entity = %kind, error = %e, "CSV import rejected");
        e
    })?;
    let parsed = rows.len();

    if parsed == 0 {
        info!(entity = %kind, "CSV import contained no data rows");
        return Ok(ImportReport {
            entity: kind,
            parsed: 0,
            inserted: 0,
        });
    }

    let result = match kind {
        EntityKind::Lead => {
            let leads = rows.into_iter().map(|(n, row)| (n, lead_input(row)));
            store_leads(pool, leads).await
        }
        EntityKind::Company => {
            let companies = rows.into_iter().map(|(n, row)| (n, company_input(row)));
            store_companies(pool, companies).await
        }
    };

    let inserted = result.map_err(|e| {
        warn!(entity = %kind, parsed, error = %e, "CSV import rejected");
        e
    })?;

    info!(entity = %kind, parsed, inserted, "CSV import complete");

    Ok(ImportReport {
        entity: kind,
        parsed,
        inserted,
    })
}
