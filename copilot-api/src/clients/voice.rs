//! Voice-call clients
//!
//! [`MockDialer`] returns a synthetic call id without network access;
//! [`RetellDialer`] creates a phone call through the Retell API.

use async_trait::async_trait;
use chrono::Utc;
use copilot_common::config::VoiceConfig;
use once_cell::sync::OnceCell;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

const USER_AGENT: &str = concat!("sales-copilot/", env!("CARGO_PKG_VERSION"));
const RETELL_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Error)]
pub enum VoiceError {
    #[error("Voice client is not configured: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Telephony provider error {0}: {1}")]
    Api(u16, String),

    #[error("Unable to parse telephony provider response: {0}")]
    Parse(String),
}

/// Everything needed to place one discovery call
#[derive(Debug, Clone, PartialEq)]
pub struct CallRequest {
    pub lead_id: String,
    pub phone_number: String,
    pub goal: String,
    /// Discovery script handed to the voice agent
    pub script: String,
}

#[async_trait]
pub trait VoiceDialer: Send + Sync {
    /// Start a call and return its tracking id
    async fn start_call(&self, request: CallRequest) -> Result<String, VoiceError>;
}

/// Dialer that never leaves the process
#[derive(Debug, Default, Clone)]
pub struct MockDialer;

#[async_trait]
impl VoiceDialer for MockDialer {
    async fn start_call(&self, request: CallRequest) -> Result<String, VoiceError> {
        let call_id = format!("mock-call-{}", Utc::now().timestamp_millis());
        info!(
            lead_id = %request.lead_id,
            call_id = %call_id,
            script_chars = request.script.len(),
            "Mock discovery call started"
        );
        Ok(call_id)
    }
}

/// Dialer backed by Retell's create-phone-call endpoint
pub struct RetellDialer {
    config: VoiceConfig,
    http_client: OnceCell<reqwest::Client>,
}

/// Credentials checked on first use
struct RetellCredentials<'a> {
    api_key: &'a str,
    agent_id: &'a str,
    from_number: &'a str,
}

#[derive(Debug, Deserialize)]
struct CreateCallResponse {
    call_id: String,
}

impl RetellDialer {
    pub fn new(config: VoiceConfig) -> Self {
        Self {
            config,
            http_client: OnceCell::new(),
        }
    }

    fn credentials(&self) -> Result<RetellCredentials<'_>, VoiceError> {
        fn required<'a>(value: &'a Option<String>, name: &str) -> Result<&'a str, VoiceError> {
            value
                .as_deref()
                .filter(|v| !v.trim().is_empty())
                .ok_or_else(|| VoiceError::Config(format!("{} is not set", name)))
        }

        Ok(RetellCredentials {
            api_key: required(&self.config.api_key, "RETELL_API_KEY")?,
            agent_id: required(&self.config.agent_id, "RETELL_AGENT_ID")?,
            from_number: required(&self.config.from_number, "RETELL_FROM_NUMBER")?,
        })
    }

    fn client(&self) -> Result<&reqwest::Client, VoiceError> {
        self.http_client.get_or_try_init(|| {
            reqwest::Client::builder()
                .user_agent(USER_AGENT)
                .timeout(RETELL_TIMEOUT)
                .build()
                .map_err(|e| VoiceError::Config(e.to_string()))
        })
    }
}

#[async_trait]
impl VoiceDialer for RetellDialer {
    async fn start_call(&self, request: CallRequest) -> Result<String, VoiceError> {
        let credentials = self.credentials()?;
        let client = self.client()?;
        let url = format!(
            "{}/v2/create-phone-call",
            self.config.base_url.trim_end_matches('/')
        );

        let body = json!({
            "from_number": credentials.from_number,
            "to_number": request.phone_number,
            "override_agent_id": credentials.agent_id,
            "metadata": {
                "leadId": request.lead_id,
                "goal": request.goal,
            },
            "retell_llm_dynamic_variables": {
                "call_script": request.script,
            },
        });

        debug!(lead_id = %request.lead_id, "Creating Retell phone call");

        let response = client
            .post(&url)
            .bearer_auth(credentials.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| VoiceError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(VoiceError::Api(status.as_u16(), body));
        }

        let created: CreateCallResponse = response
            .json()
            .await
            .map_err(|e| VoiceError::Parse(e.to_string()))?;

        info!(lead_id = %request.lead_id, call_id = %created.call_id, "Retell call created");
        Ok(created.call_id)
    }
}
