//! OpenAI Responses API client
//!
//! The HTTP client is built on first use, so a missing API key surfaces as
//! [`AiError::Config`] on the first request rather than at startup.

use async_trait::async_trait;
use copilot_common::config::AiConfig;
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;
use tracing::debug;

const USER_AGENT: &str = concat!("sales-copilot/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Error)]
pub enum AiError {
    #[error("AI client is not configured: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("AI provider rejected the API key")]
    Unauthorized,

    #[error("AI provider error {0}: {1}")]
    Api(u16, String),

    #[error("Unable to parse AI provider response: {0}")]
    Parse(String),

    #[error("AI provider did not return any text output")]
    EmptyOutput,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// JSON-schema constraint on the model output
#[derive(Debug, Clone, PartialEq)]
pub struct OutputFormat {
    pub name: String,
    pub schema: Value,
    pub strict: bool,
}

/// Ordered prompt messages plus an optional output schema
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GenerationRequest {
    pub messages: Vec<Message>,
    pub format: Option<OutputFormat>,
}

impl GenerationRequest {
    pub fn new(messages: Vec<Message>) -> Self {
        Self {
            messages,
            format: None,
        }
    }

    pub fn with_format(mut self, name: &str, schema: Value, strict: bool) -> Self {
        self.format = Some(OutputFormat {
            name: name.to_string(),
            schema,
            strict,
        });
        self
    }
}

/// Text generation backend
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Run one generation and return the output text (never empty)
    async fn generate(&self, request: GenerationRequest) -> Result<String, AiError>;
}

/// Production generator backed by the OpenAI Responses API
pub struct OpenAiGenerator {
    config: AiConfig,
    http_client: OnceCell<reqwest::Client>,
}

impl OpenAiGenerator {
    pub fn new(config: AiConfig) -> Self {
        Self {
            config,
            http_client: OnceCell::new(),
        }
    }

    fn api_key(&self) -> Result<&str, AiError> {
        self.config
            .api_key
            .as_deref()
            .filter(|key| !key.trim().is_empty())
            .ok_or_else(|| AiError::Config("OPENAI_API_KEY is not set".to_string()))
    }

    fn client(&self) -> Result<&reqwest::Client, AiError> {
        self.api_key()?;
        self.http_client.get_or_try_init(|| {
            reqwest::Client::builder()
                .user_agent(USER_AGENT)
                .timeout(self.config.timeout)
                .build()
                .map_err(|e| AiError::Config(e.to_string()))
        })
    }

    fn request_body(&self, request: &GenerationRequest) -> Value {
        let mut body = json!({
            "model": self.config.model,
            "input": request.messages,
        });

        if let Some(format) = &request.format {
            body["text"] = json!({
                "format": {
                    "type": "json_schema",
                    "name": format.name,
                    "schema": format.schema,
                    "strict": format.strict,
                }
            });
        }

        body
    }
}

#[async_trait]
impl TextGenerator for OpenAiGenerator {
    async fn generate(&self, request: GenerationRequest) -> Result<String, AiError> {
        let client = self.client()?;
        let api_key = self.api_key()?;
        let url = format!("{}/responses", self.config.base_url.trim_end_matches('/'));

        debug!(
            model = %self.config.model,
            messages = request.messages.len(),
            schema = request.format.as_ref().map(|f| f.name.as_str()),
            "Sending AI generation request"
        );

        let response = client
            .post(&url)
            .bearer_auth(api_key)
            .json(&self.request_body(&request))
            .send()
            .await
            .map_err(|e| AiError::Network(e.to_string()))?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED {
            return Err(AiError::Unauthorized);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AiError::Api(status.as_u16(), body));
        }

        let body: ResponsesBody = response
            .json()
            .await
            .map_err(|e| AiError::Parse(e.to_string()))?;

        body.text().ok_or(AiError::EmptyOutput)
    }
}

/// Subset of the Responses API body used for text extraction
#[derive(Debug, Deserialize)]
struct ResponsesBody {
    #[serde(default)]
    output_text: Option<String>,
    #[serde(default)]
    output: Vec<OutputItem>,
}

#[derive(Debug, Deserialize)]
struct OutputItem {
    #[serde(default)]
    content: Vec<ContentPart>,
}

#[derive(Debug, Deserialize)]
struct ContentPart {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    text: Option<String>,
}

impl ResponsesBody {
    /// `output_text` when present, else every `output_text` content part joined
    fn text(self) -> Option<String> {
        let text = match self.output_text {
            Some(text) if !text.trim().is_empty() => text,
            _ => self
                .output
                .into_iter()
                .flat_map(|item| item.content)
                .filter(|part| part.kind == "output_text")
                .filter_map(|part| part.text)
                .collect::<String>(),
        };

        (!text.trim().is_empty()).then_some(text)
    }
}
