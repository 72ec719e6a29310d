//! HTTP client tests against a mock server
//!
//! Tests cover:
//! - OpenAI Responses API request shape and text extraction
//! - Error mapping (401, other statuses, empty output)
//! - Retell create-phone-call request and call id parsing

use std::time::Duration;

use copilot_api::clients::{
    AiError, CallRequest, GenerationRequest, Message, OpenAiGenerator, RetellDialer, TextGenerator,
    VoiceDialer, VoiceError,
};
use copilot_common::config::{AiConfig, VoiceConfig, VoiceProvider};
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn ai_config(server: &MockServer) -> AiConfig {
    AiConfig {
        api_key: Some("sk-test".to_string()),
        base_url: server.uri(),
        model: "gpt-4.1-mini".to_string(),
        timeout: Duration::from_secs(5),
        enrichment_placeholder: false,
    }
}

fn voice_config(server: &MockServer) -> VoiceConfig {
    VoiceConfig {
        provider: VoiceProvider::Retell,
        api_key: Some("retell-test".to_string()),
        base_url: server.uri(),
        agent_id: Some("agent-1".to_string()),
        from_number: Some("+15550199".to_string()),
    }
}

fn prompt() -> GenerationRequest {
    GenerationRequest::new(vec![Message::system("Be brief."), Message::user("Hello")])
}

// =============================================================================
// OpenAI
// =============================================================================

#[tokio::test]
async fn test_openai_returns_output_text() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/responses"))
        .and(header("authorization", "Bearer sk-test"))
        .and(body_partial_json(json!({
            "model": "gpt-4.1-mini",
            "input": [
                {"role": "system", "content": "Be brief."},
                {"role": "user", "content": "Hello"}
            ]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"output_text": "Hi there."})))
        .expect(1)
        .mount(&server)
        .await;

    let generator = OpenAiGenerator::new(ai_config(&server));
    let text = generator.generate(prompt()).await.unwrap();

    assert_eq!(text, "Hi there.");
}

#[tokio::test]
async fn test_openai_sends_json_schema_format() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/responses"))
        .and(body_partial_json(json!({
            "text": {"format": {"type": "json_schema", "name": "company_news", "strict": false}}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "output": [
                {"type": "message", "content": [
                    {"type": "output_text", "text": "{\"items\":"},
                    {"type": "refusal", "text": "ignored"},
                    {"type": "output_text", "text": "[]}"}
                ]}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let generator = OpenAiGenerator::new(ai_config(&server));
    let request = prompt().with_format("company_news", json!({"type": "object"}), false);
    let text = generator.generate(request).await.unwrap();

    assert_eq!(text, "{\"items\":[]}");
}

#[tokio::test]
async fn test_openai_unauthorized() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/responses"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({"error": {"message": "bad key"}})),
        )
        .mount(&server)
        .await;

    let generator = OpenAiGenerator::new(ai_config(&server));

    assert!(matches!(
        generator.generate(prompt()).await,
        Err(AiError::Unauthorized)
    ));
}

#[tokio::test]
async fn test_openai_server_error_keeps_status_and_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/responses"))
        .respond_with(ResponseTemplate::new(429).set_body_string("rate limited"))
        .mount(&server)
        .await;

    let generator = OpenAiGenerator::new(ai_config(&server));

    match generator.generate(prompt()).await {
        Err(AiError::Api(status, body)) => {
            assert_eq!(status, 429);
            assert_eq!(body, "rate limited");
        }
        other => panic!("expected Api error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_openai_empty_output() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/responses"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"output_text": "  ", "output": []})),
        )
        .mount(&server)
        .await;

    let generator = OpenAiGenerator::new(ai_config(&server));

    assert!(matches!(
        generator.generate(prompt()).await,
        Err(AiError::EmptyOutput)
    ));
}

#[tokio::test]
async fn test_openai_missing_key_makes_no_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let mut config = ai_config(&server);
    config.api_key = None;
    let generator = OpenAiGenerator::new(config);

    assert!(matches!(
        generator.generate(prompt()).await,
        Err(AiError::Config(_))
    ));
}

// =============================================================================
// Retell
// =============================================================================

#[tokio::test]
async fn test_retell_creates_phone_call() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v2/create-phone-call"))
        .and(header("authorization", "Bearer retell-test"))
        .and(body_partial_json(json!({
            "from_number": "+15550199",
            "to_number": "+15550100",
            "override_agent_id": "agent-1",
            "metadata": {"leadId": "lead-1", "goal": "Book a demo"},
            "retell_llm_dynamic_variables": {"call_script": "Lead details: Ada"}
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({
            "call_id": "call_abc123",
            "call_status": "registered"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let dialer = RetellDialer::new(voice_config(&server));
    let call_id = dialer
        .start_call(CallRequest {
            lead_id: "lead-1".to_string(),
            phone_number: "+15550100".to_string(),
            goal: "Book a demo".to_string(),
            script: "Lead details: Ada".to_string(),
        })
        .await
        .unwrap();

    assert_eq!(call_id, "call_abc123");
}

#[tokio::test]
async fn test_retell_error_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v2/create-phone-call"))
        .respond_with(ResponseTemplate::new(402).set_body_string("insufficient balance"))
        .mount(&server)
        .await;

    let dialer = RetellDialer::new(voice_config(&server));
    let result = dialer
        .start_call(CallRequest {
            lead_id: "lead-1".to_string(),
            phone_number: "+15550100".to_string(),
            goal: "Qualify the lead.".to_string(),
            script: String::new(),
        })
        .await;

    match result {
        Err(VoiceError::Api(status, body)) => {
            assert_eq!(status, 402);
            assert_eq!(body, "insufficient balance");
        }
        other => panic!("expected Api error, got {:?}", other),
    }
}
