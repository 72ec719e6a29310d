//! Company database operations

use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::{QueryBuilder, Row, Sqlite, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use super::{decode_json, decode_timestamp, encode_json, encode_timestamp, BULK_CHUNK_ROWS};
use crate::models::{Company, Firmographics, NewCompany};
use crate::{Error, Result};

const COMPANY_COLUMNS: &str = "id, name, website, linkedin, description, sector, sub_sector, \
    employees, funding_stage, investment_info, associated_leads, ai_insights, news_feed, \
    created_at";

const INSERT_COMPANIES: &str = "INSERT INTO companies (id, name, website, linkedin, description, \
    sector, sub_sector, employees, funding_stage, investment_info, created_at) ";

/// All companies, newest first
pub async fn list_companies(pool: &SqlitePool) -> Result<Vec<Company>> {
    let rows = sqlx::query(&format!(
        "SELECT {} FROM companies ORDER BY created_at DESC, rowid DESC",
        COMPANY_COLUMNS
    ))
    .fetch_all(pool)
    .await?;

    rows.iter().map(company_from_row).collect()
}

pub async fn get_company(pool: &SqlitePool, id: &str) -> Result<Option<Company>> {
    let row = sqlx::query(&format!(
        "SELECT {} FROM companies WHERE id = ?",
        COMPANY_COLUMNS
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    row.as_ref().map(company_from_row).transpose()
}

/// Insert one company and return its id
pub async fn insert_company(pool: &SqlitePool, company: &NewCompany) -> Result<String> {
    let id = Uuid::new_v4().to_string();
    let prepared = vec![(id.clone(), company, encode_json(company.investment_info.as_ref())?)];

    let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new(INSERT_COMPANIES);
    builder.push_values(prepared, |mut row, (id, company, investment_info)| {
        push_company(&mut row, id, company, investment_info);
    });
    builder.build().execute(pool).await?;

    debug!(company_id = %id, "Company inserted");
    Ok(id)
}

/// Insert many companies in one transaction; either all rows land or none do
pub async fn insert_companies(pool: &SqlitePool, companies: &[NewCompany]) -> Result<usize> {
    if companies.is_empty() {
        return Ok(0);
    }

    // Encode JSON up front so a bad value fails before the transaction opens
    let prepared = companies
        .iter()
        .map(|company| {
            encode_json(company.investment_info.as_ref())
                .map(|info| (Uuid::new_v4().to_string(), company, info))
        })
        .collect::<Result<Vec<_>>>()?;

    let mut tx = pool.begin().await?;

    for chunk in prepared.chunks(BULK_CHUNK_ROWS) {
        let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new(INSERT_COMPANIES);
        builder.push_values(chunk, |mut row, (id, company, investment_info)| {
            push_company(&mut row, id.clone(), company, investment_info.clone());
        });
        builder.build().execute(&mut *tx).await?;
    }

    tx.commit().await?;

    debug!(count = companies.len(), "Companies bulk inserted");
    Ok(companies.len())
}

fn push_company(
    row: &mut sqlx::query_builder::Separated<'_, '_, Sqlite, &'static str>,
    id: String,
    company: &NewCompany,
    investment_info: Option<String>,
) {
    row.push_bind(id)
        .push_bind(company.name.clone())
        .push_bind(company.website.clone())
        .push_bind(company.linked_in.clone())
        .push_bind(company.description.clone())
        .push_bind(company.sector.clone())
        .push_bind(company.sub_sector.clone())
        .push_bind(company.employees)
        .push_bind(company.funding_stage.clone())
        .push_bind(investment_info)
        .push_bind(encode_timestamp(Utc::now()));
}

/// Overwrite `ai_insights`; returns false when no company has this id
pub async fn update_company_insights(
    pool: &SqlitePool,
    id: &str,
    insights: &str,
) -> Result<bool> {
    let result = sqlx::query("UPDATE companies SET ai_insights = ? WHERE id = ?")
        .bind(insights)
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Write firmographic columns and return the updated company
///
/// Every column in `values` is written as given; callers merge with the
/// stored row first. Returns `None` when no company has this id.
pub async fn update_firmographics(
    pool: &SqlitePool,
    id: &str,
    values: &Firmographics,
) -> Result<Option<Company>> {
    if values.employees.is_some_and(|n| n < 0) {
        return Err(Error::Internal("employees must be non-negative".to_string()));
    }

    let result = sqlx::query(
        r#"
        UPDATE companies SET
            linkedin = ?,
            description = ?,
            sector = ?,
            sub_sector = ?,
            employees = ?,
            funding_stage = ?,
            investment_info = ?
        WHERE id = ?
        "#,
    )
    .bind(&values.linked_in)
    .bind(&values.description)
    .bind(&values.sector)
    .bind(&values.sub_sector)
    .bind(values.employees)
    .bind(&values.funding_stage)
    .bind(encode_json(values.investment_info.as_ref())?)
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Ok(None);
    }

    get_company(pool, id).await
}

fn company_from_row(row: &SqliteRow) -> Result<Company> {
    let created_at: String = row.try_get("created_at")?;
    let associated_leads = match decode_json(row.try_get("associated_leads")?) {
        Some(value) => Some(serde_json::from_value::<Vec<String>>(value)?),
        None => None,
    };

    Ok(Company {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        website: row.try_get("website")?,
        linked_in: row.try_get("linkedin")?,
        description: row.try_get("description")?,
        sector: row.try_get("sector")?,
        sub_sector: row.try_get("sub_sector")?,
        employees: row.try_get("employees")?,
        funding_stage: row.try_get("funding_stage")?,
        investment_info: decode_json(row.try_get("investment_info")?),
        associated_leads,
        ai_insights: row.try_get("ai_insights")?,
        news_feed: decode_json(row.try_get("news_feed")?),
        created_at: decode_timestamp("created_at", &created_at)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_database;
    use serde_json::json;

    async fn test_pool() -> SqlitePool {
        init_database("sqlite::memory:").await.unwrap()
    }

    #[tokio::test]
    async fn test_insert_and_get_company() {
        let pool = test_pool().await;
        let mut company = NewCompany::named("Analytical Engines Inc.");
        company.sub_sector = Some("Analytics".to_string());
        company.employees = Some(320);
        company.investment_info = Some(json!({"investors": ["Turing Ventures"]}));

        let id = insert_company(&pool, &company).await.unwrap();
        let stored = get_company(&pool, &id).await.unwrap().unwrap();

        assert_eq!(stored.name, "Analytical Engines Inc.");
        assert_eq!(stored.sub_sector.as_deref(), Some("Analytics"));
        assert_eq!(stored.employees, Some(320));
        assert_eq!(stored.investment_info, Some(json!({"investors": ["Turing Ventures"]})));
        assert_eq!(stored.associated_leads, None);
    }

    #[tokio::test]
    async fn test_bulk_insert_companies() {
        let pool = test_pool().await;
        let companies = vec![NewCompany::named("A"), NewCompany::named("B")];

        assert_eq!(insert_companies(&pool, &companies).await.unwrap(), 2);
        assert_eq!(insert_companies(&pool, &[]).await.unwrap(), 0);

        let names: Vec<String> = list_companies(&pool)
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names, vec!["B", "A"]);
    }

    #[tokio::test]
    async fn test_update_company_insights() {
        let pool = test_pool().await;
        let id = insert_company(&pool, &NewCompany::named("A")).await.unwrap();

        assert!(update_company_insights(&pool, &id, "Cross-sell automation").await.unwrap());
        assert!(!update_company_insights(&pool, "missing", "x").await.unwrap());

        let stored = get_company(&pool, &id).await.unwrap().unwrap();
        assert_eq!(stored.ai_insights.as_deref(), Some("Cross-sell automation"));
    }

    #[tokio::test]
    async fn test_update_firmographics() {
        let pool = test_pool().await;
        let mut company = NewCompany::named("Compiler Systems");
        company.website = Some("https://compiler.systems".to_string());
        let id = insert_company(&pool, &company).await.unwrap();

        let values = Firmographics {
            sector: Some("Developer Tools".to_string()),
            employees: Some(95),
            ..Default::default()
        };
        let updated = update_firmographics(&pool, &id, &values).await.unwrap().unwrap();

        assert_eq!(updated.sector.as_deref(), Some("Developer Tools"));
        assert_eq!(updated.employees, Some(95));
        // Website is not a firmographic column and stays untouched
        assert_eq!(updated.website.as_deref(), Some("https://compiler.systems"));

        assert!(update_firmographics(&pool, "missing", &values).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_associated_leads_decoded() {
        let pool = test_pool().await;
        let id = insert_company(&pool, &NewCompany::named("A")).await.unwrap();
        sqlx::query("UPDATE companies SET associated_leads = ? WHERE id = ?")
            .bind(r#"["lead-1","lead-2"]"#)
            .bind(&id)
            .execute(&pool)
            .await
            .unwrap();

        let stored = get_company(&pool, &id).await.unwrap().unwrap();
        assert_eq!(
            stored.associated_leads,
            Some(vec!["lead-1".to_string(), "lead-2".to_string()])
        );
    }
}
