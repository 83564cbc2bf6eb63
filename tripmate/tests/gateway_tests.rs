mod common;

use serde_json::{json, Value};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use tripmate::config::LlmConfig;
use tripmate::error::PlannerError;
use tripmate::llm::{LlmBackend, ModelGateway};

use common::{
    chat_path, completion_body, gemini_body, gemini_config, init_test_logger, json_path,
    KYOTO_TRIP,
};

fn openai_config(base_url: String) -> LlmConfig {
    LlmConfig {
        chat_model: "openai/gpt-4o-mini".to_string(),
        structured_model: "openai/gpt-4o-mini".to_string(),
        api_key: Some("test-key".to_string()),
        base_url: Some(base_url),
        gemini_base_url: None,
        timeout_secs: 5,
        enable_web_search: true,
    }
}

async fn request_bodies(server: &MockServer) -> Vec<Value> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .map(|request| serde_json::from_slice(&request.body).unwrap())
        .collect()
}

#[tokio::test]
async fn test_gemini_converse_sends_search_tool_and_returns_text() {
    init_test_logger();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(chat_path()))
        .and(header("x-goog-api-key", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(gemini_body("Kyoto in April is lovely.")))
        .expect(1)
        .mount(&server)
        .await;

    let gateway = ModelGateway::initialize(&gemini_config(&server.uri())).unwrap();
    let reply = gateway.converse("User: Plan 3 days in Kyoto").await.unwrap();

    assert_eq!(reply, "Kyoto in April is lovely.");
    let bodies = request_bodies(&server).await;
    assert_eq!(bodies[0]["tools"], json!([{"google_search": {}}]));
    assert_eq!(
        bodies[0]["contents"][0]["parts"][0]["text"],
        "User: Plan 3 days in Kyoto"
    );
}

#[tokio::test]
async fn test_gemini_structured_requests_json_and_decodes_proposal() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(json_path()))
        .respond_with(ResponseTemplate::new(200).set_body_json(gemini_body(KYOTO_TRIP)))
        .expect(1)
        .mount(&server)
        .await;

    let gateway = ModelGateway::initialize(&gemini_config(&server.uri())).unwrap();
    let proposal = gateway
        .extract_structured_trip("User: Plan 3 days in Kyoto")
        .await
        .unwrap();

    assert_eq!(proposal.root()["trip"]["name"], "Kyoto Getaway");
    let bodies = request_bodies(&server).await;
    assert_eq!(
        bodies[0]["generationConfig"]["responseMimeType"],
        "application/json"
    );
    assert!(bodies[0].get("tools").is_none());
    let prompt = bodies[0]["contents"][0]["parts"][0]["text"].as_str().unwrap();
    assert!(prompt.contains("User: Plan 3 days in Kyoto"));
    assert!(prompt.contains("dailyPlans"));
}

#[tokio::test]
async fn test_gemini_structured_reply_that_is_not_json_is_a_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(json_path()))
        .respond_with(ResponseTemplate::new(200).set_body_json(gemini_body("Sorry, I can't do that")))
        .mount(&server)
        .await;

    let gateway = ModelGateway::initialize(&gemini_config(&server.uri())).unwrap();
    let result = gateway.extract_structured_trip("User: hi").await;

    assert!(matches!(result, Err(PlannerError::Decode(_))));
}

#[tokio::test]
async fn test_gemini_server_error_is_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(chat_path()))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({
            "error": {"code": 500, "message": "Internal error", "status": "INTERNAL"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let gateway = ModelGateway::initialize(&gemini_config(&server.uri())).unwrap();
    let result = gateway.converse("User: hi").await;

    match result {
        Err(PlannerError::Upstream(message)) => assert!(message.contains("Internal error")),
        other => panic!("Expected Upstream error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_gemini_rejected_key_is_reported_as_authentication_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(chat_path()))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "error": {"code": 403, "message": "API key not valid", "status": "PERMISSION_DENIED"}
        })))
        .mount(&server)
        .await;

    let gateway = ModelGateway::initialize(&gemini_config(&server.uri())).unwrap();

    match gateway.converse("User: hi").await {
        Err(PlannerError::Upstream(message)) => {
            assert!(message.contains("Authentication failed"));
            assert!(message.contains("API key not valid"));
        }
        other => panic!("Expected Upstream error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_openai_compatible_chat_and_structured_mode() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_body(KYOTO_TRIP)))
        .expect(2)
        .mount(&server)
        .await;

    let gateway = ModelGateway::initialize(&openai_config(format!("{}/v1", server.uri()))).unwrap();
    assert_eq!(gateway.chat_endpoint().unwrap().backend(), &LlmBackend::OpenAI);
    assert!(!gateway.chat_endpoint().unwrap().web_search_enabled());

    let reply = gateway.converse("User: hi").await.unwrap();
    assert_eq!(reply, KYOTO_TRIP);
    let proposal = gateway.extract_structured_trip("User: hi").await.unwrap();
    assert_eq!(proposal.root()["dailyPlans"][0]["date"], "2025-04-01");

    let bodies = request_bodies(&server).await;
    assert!(bodies[0].get("response_format").is_none());
    assert_eq!(bodies[1]["response_format"]["type"], "json_object");
}

#[tokio::test]
async fn test_openai_rate_limit_is_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .respond_with(ResponseTemplate::new(429).set_body_json(json!({
            "error": {
                "message": "Rate limit reached for requests",
                "type": "requests",
                "param": null,
                "code": "rate_limit_exceeded"
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    let gateway = ModelGateway::initialize(&openai_config(format!("{}/v1", server.uri()))).unwrap();

    match gateway.converse("User: hi").await {
        Err(PlannerError::Upstream(message)) => assert!(message.contains("Rate limit")),
        other => panic!("Expected Upstream error, got {other:?}"),
    }
}
