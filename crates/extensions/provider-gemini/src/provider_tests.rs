use super::*;
use greetbot_config::VisionProviderKind;
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn config(server: &MockServer) -> VisionConfig {
    VisionConfig {
        provider: VisionProviderKind::Gemini,
        api_key: Some("test-key".to_string()),
        base_url: Some(server.uri()),
        timeout_seconds: 5,
        ..VisionConfig::default()
    }
}

fn reply(text: &str) -> serde_json::Value {
    json!({
        "candidates": [{
            "content": {"role": "model", "parts": [{"text": text}]},
            "finishReason": "STOP"
        }]
    })
}

#[test]
fn test_missing_api_key() {
    let config = VisionConfig {
        api_key: Some("  ".to_string()),
        ..VisionConfig::default()
    };
    assert!(matches!(
        GeminiAnalyzer::from_config(&config),
        Err(ProviderError::MissingApiKey)
    ));
}

#[test]
fn test_default_model() {
    let config = VisionConfig {
        api_key: Some("k".to_string()),
        ..VisionConfig::default()
    };
    let analyzer = GeminiAnalyzer::from_config(&config).unwrap();
    assert_eq!(analyzer.model(), "gemini-2.5-flash");
}

#[tokio::test]
async fn test_analyze_candidate_match() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/models/gemini-2.5-flash:generateContent"))
        .and(query_param("key", "test-key"))
        .and(body_partial_json(json!({
            "contents": [{"role": "user", "parts": [
                {"text": "JD要求：Rust"},
                {"inline_data": {"mime_type": "image/png", "data": "iVBORw0KGgo="}}
            ]}],
            "generationConfig": {"topK": 40, "maxOutputTokens": 8192}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(reply(
            "```json\n{\"match\":true,\"confidence\":0.86,\"reason\":\"技能匹配\",\"highlights\":[\"Rust\"]}\n```",
        )))
        .expect(1)
        .mount(&server)
        .await;

    let analyzer = GeminiAnalyzer::from_config(&config(&server)).unwrap();
    let verdict = analyzer
        .analyze_candidate("iVBORw0KGgo=", "JD要求：Rust")
        .await
        .unwrap();

    assert!(verdict.is_match);
    assert!((verdict.confidence - 0.86).abs() < 1e-9);
    assert_eq!(verdict.highlights, vec!["Rust"]);
}

#[tokio::test]
async fn test_unreadable_verdict_degrades_to_no_match() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(reply("我无法判断这位候选人。")))
        .mount(&server)
        .await;

    let analyzer = GeminiAnalyzer::from_config(&config(&server)).unwrap();
    let verdict = analyzer.analyze_candidate("AAAA", "prompt").await.unwrap();

    assert!(!verdict.is_match);
    assert_eq!(verdict.confidence, 0.0);
    assert!(verdict.reason.starts_with("解析AI响应失败"));
}

#[tokio::test]
async fn test_http_error_uses_api_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": {"code": 400, "message": "API key not valid. Please pass a valid API key.", "status": "INVALID_ARGUMENT"}
        })))
        .mount(&server)
        .await;

    let analyzer = GeminiAnalyzer::from_config(&config(&server)).unwrap();
    let err = analyzer.analyze_candidate("AAAA", "prompt").await.unwrap_err();

    match err {
        ProviderError::InvalidRequest(message) => assert!(message.starts_with("API key not valid")),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_key_check_valid() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(body_partial_json(json!({
            "contents": [{"parts": [{"text": TEST_PROMPT}]}]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(reply("OK")))
        .mount(&server)
        .await;

    let analyzer = GeminiAnalyzer::from_config(&config(&server)).unwrap();
    assert_eq!(analyzer.test_api_key().await, KeyCheck::valid());
}

#[tokio::test]
async fn test_key_check_quota_exceeded() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(429).set_body_json(json!({
            "error": {"code": 429, "message": "Resource has been exhausted (e.g. check quota).", "status": "RESOURCE_EXHAUSTED"}
        })))
        .mount(&server)
        .await;

    let analyzer = GeminiAnalyzer::from_config(&config(&server)).unwrap();
    let check = analyzer.test_api_key().await;

    assert!(!check.valid);
    assert!(check.quota_exceeded);
    assert!(check.error.is_some());
}

#[test]
fn test_verdict_from_malformed_body_is_error() {
    assert!(matches!(
        verdict_from_body("<html>502</html>"),
        Err(ProviderError::MalformedReply(_))
    ));
}
