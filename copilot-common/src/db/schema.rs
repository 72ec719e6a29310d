//! Table definitions
//!
//! `associated_company_id` carries no foreign key: leads may be imported
//! before the companies they name, and nothing is ever deleted.

use sqlx::SqlitePool;

use crate::Result;

/// Create the `leads` and `companies` tables if they don't exist
pub async fn create_tables(pool: &SqlitePool) -> Result<()> {
    create_companies_table(pool).await?;
    create_leads_table(pool).await?;
    Ok(())
}

async fn create_leads_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS leads (
            id TEXT PRIMARY KEY,
            full_name TEXT NOT NULL CHECK (length(trim(full_name)) > 0),
            title TEXT,
            email TEXT,
            phone TEXT,
            company_name TEXT,
            associated_company_id TEXT,
            linkedin TEXT,
            personal_notes TEXT,
            ai_insights TEXT,
            news_feed TEXT,
            messages TEXT,
            created_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_leads_created_at ON leads(created_at)")
        .execute(pool)
        .await?;

    Ok(())
}

async fn create_companies_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS companies (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL CHECK (length(trim(name)) > 0),
            website TEXT,
            linkedin TEXT,
            description TEXT,
            sector TEXT,
            sub_sector TEXT,
            employees INTEGER CHECK (employees IS NULL OR employees >= 0),
            funding_stage TEXT,
            investment_info TEXT,
            associated_leads TEXT,
            ai_insights TEXT,
            news_feed TEXT,
            created_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_companies_created_at ON companies(created_at)")
        .execute(pool)
        .await?;

    Ok(())
}
