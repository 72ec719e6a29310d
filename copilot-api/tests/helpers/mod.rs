//! Test Helper Utilities
//!
//! Shared utilities for testing copilot-api: scripted AI and voice
//! backends, an in-memory record store and request helpers.

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Request},
};
use copilot_api::clients::{
    AiError, CallRequest, GenerationRequest, TextGenerator, VoiceDialer, VoiceError,
};
use copilot_api::{build_router, AppState};
use copilot_common::db::{companies, init_database, leads};
use copilot_common::{NewCompany, NewLead};
use serde_json::Value;
use sqlx::SqlitePool;

/// Generator that replays queued responses and records every request
#[derive(Default)]
pub struct ScriptedGenerator {
    responses: Mutex<VecDeque<Result<String, AiError>>>,
    requests: Mutex<Vec<GenerationRequest>>,
}

impl ScriptedGenerator {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn replying(text: &str) -> Arc<Self> {
        let generator = Self::new();
        generator.push_ok(text);
        generator
    }

    pub fn push_ok(&self, text: &str) {
        self.responses.lock().unwrap().push_back(Ok(text.to_string()));
    }

    pub fn push_err(&self, error: AiError) {
        self.responses.lock().unwrap().push_back(Err(error));
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn requests(&self) -> Vec<GenerationRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    async fn generate(&self, request: GenerationRequest) -> Result<String, AiError> {
        self.requests.lock().unwrap().push(request);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(AiError::Api(500, "no scripted response".to_string())))
    }
}

/// Dialer that records call requests and answers with a fixed id
#[derive(Default)]
pub struct RecordingDialer {
    calls: Mutex<Vec<CallRequest>>,
    failure: Option<String>,
}

impl RecordingDialer {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn failing(message: &str) -> Arc<Self> {
        Arc::new(Self {
            calls: Mutex::new(Vec::new()),
            failure: Some(message.to_string()),
        })
    }

    pub fn calls(&self) -> Vec<CallRequest> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl VoiceDialer for RecordingDialer {
    async fn start_call(&self, request: CallRequest) -> Result<String, VoiceError> {
        self.calls.lock().unwrap().push(request);
        match &self.failure {
            Some(message) => Err(VoiceError::Config(message.clone())),
            None => Ok("call-test-1".to_string()),
        }
    }
}

/// Test harness: app state plus handles on the fakes behind it
pub struct TestApp {
    pub state: AppState,
    pub ai: Arc<ScriptedGenerator>,
    pub voice: Arc<RecordingDialer>,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_clients(ScriptedGenerator::new(), RecordingDialer::new()).await
    }

    pub async fn with_clients(ai: Arc<ScriptedGenerator>, voice: Arc<RecordingDialer>) -> Self {
        let db = create_test_db().await;
        let state = AppState::new(db, ai.clone(), voice.clone());
        Self { state, ai, voice }
    }

    pub fn db(&self) -> &SqlitePool {
        &self.state.db
    }

    pub fn router(&self) -> axum::Router {
        build_router(self.state.clone())
    }
}

/// Fresh in-memory record store with the schema applied
pub async fn create_test_db() -> SqlitePool {
    init_database("sqlite::memory:")
        .await
        .expect("Should open in-memory database")
}

pub async fn seed_lead(pool: &SqlitePool, lead: NewLead) -> String {
    leads::insert_lead(pool, &lead).await.expect("Should insert lead")
}

pub async fn seed_company(pool: &SqlitePool, company: NewCompany) -> String {
    companies::insert_company(pool, &company)
        .await
        .expect("Should insert company")
}

/// Test helper: Create request with an optional JSON body
pub fn test_request(method: &str, uri: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder().method(method).uri(uri);
    match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

/// Test helper: Create request with a raw text body
pub fn text_request(method: &str, uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "text/csv")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Test helper: Extract JSON body from response
pub async fn extract_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Should read body");
    serde_json::from_slice(&bytes).expect("Should parse JSON")
}
