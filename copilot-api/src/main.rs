//! copilot-api - Sales Copilot HTTP service
//!
//! Serves the CRM API used by the dashboard: leads, companies, CSV import,
//! AI enrichment and outreach, company news and discovery calls.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use copilot_common::config::{AppConfig, CliOverrides};
use copilot_common::db::init_database;
use copilot_api::{build_router, logging, AppState};
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, reload};

/// Command-line arguments for copilot-api
#[derive(Parser, Debug)]
#[command(name = "copilot-api")]
#[command(about = "Sales Copilot CRM backend")]
#[command(version)]
struct Args {
    /// TOML configuration file
    #[arg(short, long, env = "COPILOT_CONFIG")]
    config: Option<PathBuf>,

    /// Port to listen on
    #[arg(short, long, env = "COPILOT_PORT")]
    port: Option<u16>,

    /// SQLite database URL
    #[arg(long, env = "DATABASE_URL")]
    database_url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // RUST_LOG wins; otherwise the configured level replaces INFO once loaded
    let rust_log = logging::rust_log_directives();
    let (filter, filter_handle) = reload::Layer::new(logging::startup_filter(
        rust_log.as_deref(),
        logging::STARTUP_LEVEL,
    ));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer())
        .init();

    // Log build identification before anything that can block
    info!(
        "Starting Sales Copilot API (copilot-api) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let args = Args::parse();
    let config = AppConfig::load(&CliOverrides {
        config_path: args.config,
        port: args.port,
        database_url: args.database_url,
    })
    .context("Failed to load configuration")?;

    match &config.config_file {
        Some(path) => info!("Configuration file: {}", path.display()),
        None => info!("No configuration file; using environment and defaults"),
    }
    match logging::configured_filter(rust_log.as_deref(), &config.log_level) {
        Some(filter) => {
            if let Err(e) = filter_handle.reload(filter) {
                warn!("Failed to apply log level {}: {}", config.log_level, e);
            }
            info!("Log level: {}", config.log_level);
        }
        None => info!("Log level: RUST_LOG overrides configured {}", config.log_level),
    }
    info!("Voice provider: {}", config.voice.provider);
    if config.ai.api_key.is_none() {
        info!("OPENAI_API_KEY not set; AI routes will fail until it is configured");
    }

    let pool = match init_database(&config.database_url).await {
        Ok(pool) => {
            info!("✓ Connected to database: {}", config.database_url);
            pool
        }
        Err(e) => {
            error!("Failed to open database {}: {}", config.database_url, e);
            return Err(e.into());
        }
    };

    let state = AppState::from_config(pool, &config);
    let app = build_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("copilot-api listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
