//! Record store access
//!
//! Two tables, `leads` and `companies`, with snake_case columns. Opaque
//! JSON values are stored as TEXT and timestamps as RFC 3339 text with
//! microsecond precision so that lexical order is creation order.

pub mod companies;
pub mod leads;
mod schema;

pub use schema::create_tables;

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::Value;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;
use std::time::Duration;
use tracing::info;

use crate::{Error, Result};

/// Rows per INSERT statement inside a bulk insert transaction
pub(crate) const BULK_CHUNK_ROWS: usize = 500;

/// Open the record store and create the tables if needed
///
/// Accepts any sqlx SQLite URL (`sqlite://path/to/copilot.db`,
/// `sqlite::memory:`). Missing database files and parent directories are
/// created.
pub async fn init_database(database_url: &str) -> Result<SqlitePool> {
    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .busy_timeout(Duration::from_millis(5000));

    let in_memory = is_in_memory(database_url);

    let options = if in_memory {
        options
    } else {
        if let Some(parent) = options.get_filename().parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        options.journal_mode(SqliteJournalMode::Wal)
    };

    // Every connection to an in-memory database is a separate database,
    // so keep exactly one and never recycle it
    let pool_options = if in_memory {
        SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
    } else {
        SqlitePoolOptions::new().max_connections(10)
    };

    let pool = pool_options.connect_with(options).await?;

    create_tables(&pool).await?;

    info!("Record store ready: {}", database_url);

    Ok(pool)
}

fn is_in_memory(database_url: &str) -> bool {
    database_url.contains(":memory:") || database_url.contains("mode=memory")
}

/// Timestamp in the stored text form
pub(crate) fn encode_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub(crate) fn decode_timestamp(column: &str, raw: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| Error::Internal(format!("Failed to parse {}: {}", column, e)))
}

pub(crate) fn encode_json(value: Option<&Value>) -> Result<Option<String>> {
    value
        .map(serde_json::to_string)
        .transpose()
        .map_err(Error::from)
}

/// Decode a JSON TEXT column; text that is not JSON is kept as a string value
pub(crate) fn decode_json(raw: Option<String>) -> Option<Value> {
    raw.map(|text| serde_json::from_str(&text).unwrap_or(Value::String(text)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_init_in_memory_database() {
        let pool = init_database("sqlite::memory:").await.unwrap();

        let tables: Vec<String> = sqlx::query_scalar(
            "SELECT name FROM sqlite_master WHERE type = 'table' ORDER BY name",
        )
        .fetch_all(&pool)
        .await
        .unwrap();

        assert!(tables.contains(&"leads".to_string()));
        assert!(tables.contains(&"companies".to_string()));
    }

    #[tokio::test]
    async fn test_init_file_database_creates_parent_directory() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("nested").join("copilot.db");
        let url = format!("sqlite://{}", db_path.display());

        let pool = init_database(&url).await.unwrap();
        pool.close().await;

        assert!(db_path.exists());
    }

    #[test]
    fn test_timestamp_round_trip_keeps_micros() {
        let now = Utc::now();
        let encoded = encode_timestamp(now);
        let decoded = decode_timestamp("created_at", &encoded).unwrap();
        assert_eq!(decoded.timestamp_micros(), now.timestamp_micros());
    }

    #[test]
    fn test_decode_json_falls_back_to_string() {
        assert_eq!(decode_json(Some("[1,2]".to_string())), Some(json!([1, 2])));
        assert_eq!(
            decode_json(Some("Series A from Ada Capital".to_string())),
            Some(json!("Series A from Ada Capital"))
        );
        assert_eq!(decode_json(None), None);
    }
}
