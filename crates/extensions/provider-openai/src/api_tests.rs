use super::*;

#[test]
fn test_api_request_serialization() {
    let request = ApiRequest {
        model: "qwen-vl-plus".to_string(),
        messages: vec![ApiMessage::system("你是HR助手")],
        max_tokens: Some(1024),
        temperature: Some(0.5),
    };

    let json = serde_json::to_value(&request).unwrap();
    assert_eq!(json["model"], "qwen-vl-plus");
    assert_eq!(json["max_tokens"], 1024);
    assert_eq!(json["messages"][0]["role"], "system");
    assert_eq!(json["messages"][0]["content"], "你是HR助手");
}

#[test]
fn test_api_request_skip_none_fields() {
    let request = ApiRequest {
        model: "deepseek-chat".to_string(),
        messages: vec![],
        max_tokens: None,
        temperature: None,
    };

    let json = serde_json::to_value(&request).unwrap();
    assert!(json.get("max_tokens").is_none());
    assert!(json.get("temperature").is_none());
}

#[test]
fn test_multimodal_user_message() {
    let message = ApiMessage::user(MessageContent::Parts(vec![
        ContentPart::Text {
            text: "JD要求".to_string(),
        },
        ContentPart::png("iVBORw0KGgo="),
    ]));

    let json = serde_json::to_value(&message).unwrap();
    assert_eq!(json["content"][0]["type"], "text");
    assert_eq!(json["content"][1]["type"], "image_url");
    assert_eq!(
        json["content"][1]["image_url"]["url"],
        "data:image/png;base64,iVBORw0KGgo="
    );
}
