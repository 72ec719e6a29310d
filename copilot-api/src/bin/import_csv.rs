//! CSV importer
//!
//! Loads a lead or company CSV export into the record store through the
//! same pipeline as `POST /import/csv`.
//!
//! **Usage:**
//! ```bash
//! copilot-import --entity lead [--config FILE] [--database-url URL] leads.csv
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use copilot_common::config::{AppConfig, CliOverrides};
use copilot_common::csv_import::{self, EntityKind};
use copilot_api::logging;
use copilot_common::db::init_database;
use tracing::info;

/// Import leads or companies from a CSV file
#[derive(Parser, Debug)]
#[command(name = "copilot-import")]
#[command(about = "Import leads or companies from a CSV file")]
struct Args {
    /// Entity type in the file: lead or company
    #[arg(long, value_parser = parse_entity)]
    entity: EntityKind,

    /// TOML configuration file
    #[arg(long, env = "COPILOT_CONFIG")]
    config: Option<PathBuf>,

    /// SQLite database URL
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,

    /// CSV file to import
    #[arg(value_name = "FILE")]
    file: PathBuf,
}

fn parse_entity(raw: &str) -> Result<EntityKind, String> {
    raw.parse()
}

#[tokio::main]
async fn main() -> Result<()> {
    let rust_log = logging::rust_log_directives();
    tracing_subscriber::fmt()
        .with_env_filter(logging::startup_filter(rust_log.as_deref(), "warn"))
        .init();

    let args = Args::parse();

    let config = AppConfig::load(&CliOverrides {
        config_path: args.config,
        port: None,
        database_url: args.database_url,
    })
    .context("Failed to load configuration")?;

    let content = std::fs::read_to_string(&args.file)
        .with_context(|| format!("Failed to read {}", args.file.display()))?;

    let pool = init_database(&config.database_url)
        .await
        .with_context(|| format!("Failed to open database {}", config.database_url))?;

    let report = csv_import::import_csv(&pool, args.entity, &content)
        .await
        .with_context(|| format!("Failed to import {}", args.file.display()))?;

    info!(
        entity = %report.entity,
        parsed = report.parsed,
        inserted = report.inserted,
        "Import finished"
    );
    println!("entity:   {}", report.entity);
    println!("parsed:   {}", report.parsed);
    println!("inserted: {}", report.inserted);

    pool.close().await;
    Ok(())
}
