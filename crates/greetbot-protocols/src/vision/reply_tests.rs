use super::*;

const GEMINI_BODY: &str = r#"{
  "candidates": [{
    "content": {"role": "model", "parts": [{"text": "{\"match\":true,\"confidence\":0.82,\"reason\":\"技能匹配\",\"highlights\":[\"Rust\",\"5年\"]}"}]},
    "finishReason": "STOP"
  }]
}"#;

const CHAT_BODY: &str = r#"{
  "id": "chatcmpl-1",
  "choices": [{
    "index": 0,
    "message": {"role": "assistant", "content": "结论如下：{\"match\": false, \"reason\": \"行业不符\"} 以上"},
    "finish_reason": "stop"
  }]
}"#;

#[test]
fn test_parse_gemini_reply() {
    let reply = ProviderReply::parse(ReplySchema::Gemini, GEMINI_BODY).unwrap();
    assert!(matches!(reply, ProviderReply::Gemini(_)));
    let verdict = parse_verdict(reply.require_text().unwrap()).unwrap();
    assert!(verdict.is_match);
    assert!((verdict.confidence - 0.82).abs() < 1e-9);
    assert_eq!(verdict.highlights, vec!["Rust", "5年"]);
}

#[test]
fn test_parse_chat_reply_with_prose() {
    let reply = ProviderReply::parse(ReplySchema::ChatCompletions, CHAT_BODY).unwrap();
    let verdict = parse_verdict(reply.text().unwrap()).unwrap();
    assert!(!verdict.is_match);
    assert_eq!(verdict.confidence, DEFAULT_CONFIDENCE);
    assert_eq!(verdict.reason, "行业不符");
    assert!(verdict.highlights.is_empty());
}

#[test]
fn test_schema_mismatch_is_not_probed() {
    // A chat body read as Gemini has no candidates, so there is no text.
    let reply = ProviderReply::parse(ReplySchema::Gemini, CHAT_BODY).unwrap();
    assert!(reply.text().is_none());
    assert!(matches!(
        reply.require_text(),
        Err(ProviderError::MalformedReply(_))
    ));
}

#[test]
fn test_parse_invalid_body() {
    let err = ProviderReply::parse(ReplySchema::ChatCompletions, "not json").unwrap_err();
    assert!(matches!(err, ProviderError::MalformedReply(_)));
}

#[test]
fn test_extract_json_fenced() {
    let v = extract_json("```json\n{\"match\": true}\n```").unwrap();
    assert_eq!(v["match"], true);
}

#[test]
fn test_extract_json_none() {
    assert!(extract_json("OK").is_none());
}

#[test]
fn test_verdict_requires_boolean_match() {
    let err = parse_verdict(r#"{"match": "yes", "confidence": 0.9}"#).unwrap_err();
    assert!(matches!(err, ProviderError::MalformedReply(_)));
}

#[test]
fn test_verdict_defaults_reason() {
    let v = parse_verdict(r#"{"match": true, "reason": ""}"#).unwrap();
    assert_eq!(v.reason, DEFAULT_REASON);
}

#[test]
fn test_verdict_clamps_confidence() {
    let v = parse_verdict(r#"{"match": true, "confidence": 3}"#).unwrap();
    assert_eq!(v.confidence, 1.0);
}

#[test]
fn test_api_error_message_json() {
    let body = r#"{"error": {"code": 400, "message": "API key not valid", "status": "INVALID_ARGUMENT"}}"#;
    assert_eq!(api_error_message(body), "API key not valid");
}

#[test]
fn test_api_error_message_plain_truncated() {
    let body = "x".repeat(500);
    assert_eq!(api_error_message(&body).len(), 200);
}
