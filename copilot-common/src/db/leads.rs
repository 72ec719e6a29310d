//! Lead database operations

use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::{QueryBuilder, Row, Sqlite, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use super::{decode_json, decode_timestamp, encode_timestamp, BULK_CHUNK_ROWS};
use crate::models::{append_link_note, Lead, LinkedLead, NewLead};
use crate::Result;

const LEAD_COLUMNS: &str = "id, full_name, title, email, phone, company_name, \
    associated_company_id, linkedin, personal_notes, ai_insights, news_feed, messages, created_at";

const INSERT_LEADS: &str = "INSERT INTO leads (id, full_name, title, email, phone, company_name, \
    associated_company_id, linkedin, personal_notes, created_at) ";

/// All leads, newest first
pub async fn list_leads(pool: &SqlitePool) -> Result<Vec<Lead>> {
    let rows = sqlx::query(&format!(
        "SELECT {} FROM leads ORDER BY created_at DESC, rowid DESC",
        LEAD_COLUMNS
    ))
    .fetch_all(pool)
    .await?;

    rows.iter().map(lead_from_row).collect()
}

pub async fn get_lead(pool: &SqlitePool, id: &str) -> Result<Option<Lead>> {
    let row = sqlx::query(&format!("SELECT {} FROM leads WHERE id = ?", LEAD_COLUMNS))
        .bind(id)
        .fetch_optional(pool)
        .await?;

    row.as_ref().map(lead_from_row).transpose()
}

/// Insert one lead and return its id
pub async fn insert_lead(pool: &SqlitePool, lead: &NewLead) -> Result<String> {
    let id = Uuid::new_v4().to_string();

    let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new(INSERT_LEADS);
    builder.push_values(std::iter::once(lead), |mut row, lead| {
        push_lead(&mut row, id.clone(), lead);
    });
    builder.build().execute(pool).await?;

    debug!(lead_id = %id, "Lead inserted");
    Ok(id)
}

/// Insert many leads in one transaction; either all rows land or none do
pub async fn insert_leads(pool: &SqlitePool, leads: &[NewLead]) -> Result<usize> {
    if leads.is_empty() {
        return Ok(0);
    }

    let mut tx = pool.begin().await?;

    for chunk in leads.chunks(BULK_CHUNK_ROWS) {
        let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new(INSERT_LEADS);
        builder.push_values(chunk, |mut row, lead| {
            push_lead(&mut row, Uuid::new_v4().to_string(), lead);
        });
        builder.build().execute(&mut *tx).await?;
    }

    tx.commit().await?;

    debug!(count = leads.len(), "Leads bulk inserted");
    Ok(leads.len())
}

fn push_lead(
    row: &mut sqlx::query_builder::Separated<'_, '_, Sqlite, &'static str>,
    id: String,
    lead: &NewLead,
) {
    row.push_bind(id)
        .push_bind(lead.full_name.clone())
        .push_bind(lead.title.clone())
        .push_bind(lead.email.clone())
        .push_bind(lead.phone.clone())
        .push_bind(lead.company_name.clone())
        .push_bind(lead.associated_company_id.clone())
        .push_bind(lead.linked_in.clone())
        .push_bind(lead.personal_notes.clone())
        .push_bind(encode_timestamp(Utc::now()));
}

/// Overwrite `ai_insights`; returns false when no lead has this id
pub async fn update_lead_insights(pool: &SqlitePool, id: &str, insights: &str) -> Result<bool> {
    let result = sqlx::query("UPDATE leads SET ai_insights = ? WHERE id = ?")
        .bind(insights)
        .bind(id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

/// Point a lead at a company (or clear the link) and append an optional note
///
/// Returns `None` when the lead does not exist.
pub async fn link_company(
    pool: &SqlitePool,
    id: &str,
    company_id: Option<&str>,
    note: Option<&str>,
) -> Result<Option<LinkedLead>> {
    let existing: Option<(Option<String>,)> =
        sqlx::query_as("SELECT personal_notes FROM leads WHERE id = ?")
            .bind(id)
            .fetch_optional(pool)
            .await?;

    let Some((personal_notes,)) = existing else {
        return Ok(None);
    };

    let personal_notes = append_link_note(personal_notes, note);

    let result =
        sqlx::query("UPDATE leads SET associated_company_id = ?, personal_notes = ? WHERE id = ?")
            .bind(company_id)
            .bind(&personal_notes)
            .bind(id)
            .execute(pool)
            .await?;

    if result.rows_affected() == 0 {
        return Ok(None);
    }

    Ok(Some(LinkedLead {
        id: id.to_string(),
        associated_company_id: company_id.map(str::to_string),
        personal_notes,
    }))
}

fn lead_from_row(row: &SqliteRow) -> Result<Lead> {
    let created_at: String = row.try_get("created_at")?;

    Ok(Lead {
        id: row.try_get("id")?,
        full_name: row.try_get("full_name")?,
        title: row.try_get("title")?,
        email: row.try_get("email")?,
        phone: row.try_get("phone")?,
        company_name: row.try_get("company_name")?,
        associated_company_id: row.try_get("associated_company_id")?,
        linked_in: row.try_get("linkedin")?,
        personal_notes: row.try_get("personal_notes")?,
        ai_insights: row.try_get("ai_insights")?,
        news_feed: decode_json(row.try_get("news_feed")?),
        messages: decode_json(row.try_get("messages")?),
        created_at: decode_timestamp("created_at", &created_at)?,
    })
}
