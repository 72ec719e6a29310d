//! copilot-api library - Sales Copilot HTTP service
//!
//! Lead and company records, CSV import, AI enrichment and outreach,
//! company news and discovery calls.

use std::sync::Arc;

use axum::Router;
use chrono::{DateTime, Utc};
use copilot_common::config::{AppConfig, VoiceProvider};
use sqlx::SqlitePool;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod ai_output;
pub mod api;
pub mod clients;
pub mod error;
pub mod logging;
pub mod prompts;

pub use error::{ApiError, ApiResult};

use clients::{MockDialer, OpenAiGenerator, RetellDialer, TextGenerator, VoiceDialer};

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Record store pool
    pub db: SqlitePool,
    /// AI text generator (OpenAI in production)
    pub ai: Arc<dyn TextGenerator>,
    /// Telephony backend for discovery calls
    pub voice: Arc<dyn VoiceDialer>,
    /// Write a fixed placeholder when enrichment gets no AI text
    pub enrichment_placeholder: bool,
    /// Service start time, for uptime reporting
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    /// Create new application state
    pub fn new(db: SqlitePool, ai: Arc<dyn TextGenerator>, voice: Arc<dyn VoiceDialer>) -> Self {
        Self {
            db,
            ai,
            voice,
            enrichment_placeholder: false,
            startup_time: Utc::now(),
        }
    }

    /// State with the production clients selected by `config`
    ///
    /// Clients connect lazily; missing credentials surface on first use.
    pub fn from_config(db: SqlitePool, config: &AppConfig) -> Self {
        let ai: Arc<dyn TextGenerator> = Arc::new(OpenAiGenerator::new(config.ai.clone()));
        let voice: Arc<dyn VoiceDialer> = match config.voice.provider {
            VoiceProvider::Mock => Arc::new(MockDialer),
            VoiceProvider::Retell => Arc::new(RetellDialer::new(config.voice.clone())),
        };

        Self::new(db, ai, voice).with_enrichment_placeholder(config.ai.enrichment_placeholder)
    }

    pub fn with_enrichment_placeholder(mut self, enabled: bool) -> Self {
        self.enrichment_placeholder = enabled;
        self
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .merge(api::health_routes())
        .merge(api::lead_routes())
        .merge(api::company_routes())
        .merge(api::enrichment_routes())
        .merge(api::outreach_routes())
        .merge(api::news_routes())
        .merge(api::call_routes())
        .merge(api::import_routes())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
