//! OpenAI-compatible analyzer implementation.

use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};

use greetbot_config::VisionConfig;
use greetbot_protocols::vision::{
    ReplySchema, SYSTEM_PROMPT, TEST_PROMPT, api_error_message, parse_verdict,
};
use greetbot_protocols::{KeyCheck, MatchResult, ProviderError, ProviderReply, VisionAnalyzer};

use crate::api::{ApiMessage, ApiRequest, ContentPart, MessageContent};

/// Vision analyzer for `/chat/completions` endpoints.
pub struct OpenAiCompatAnalyzer {
    provider: String,
    api_key: String,
    api_url: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
    timeout_secs: u64,
    client: reqwest::Client,
}

impl OpenAiCompatAnalyzer {
    pub fn from_config(config: &VisionConfig) -> Result<Self, ProviderError> {
        if !config.provider.is_supported() {
            return Err(ProviderError::Unsupported(config.provider.display_name().to_string()));
        }
        let api_key = config
            .api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .ok_or(ProviderError::MissingApiKey)?;
        let client = reqwest::Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .map_err(|e| ProviderError::Network(e.to_string()))?;

        Ok(Self {
            provider: config.provider.as_str().to_string(),
            api_key,
            api_url: format!(
                "{}/chat/completions",
                config.effective_base_url().trim_end_matches('/')
            ),
            model: config.effective_model().to_string(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
            timeout_secs: config.timeout_seconds,
            client,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    fn build_request(&self, messages: Vec<ApiMessage>) -> ApiRequest {
        ApiRequest {
            model: self.model.clone(),
            messages,
            max_tokens: Some(self.max_tokens),
            temperature: Some(self.temperature),
        }
    }

    /// POST the request and return the raw success body.
    async fn send_request(&self, api_request: &ApiRequest) -> Result<String, ProviderError> {
        debug!("{} chat completion: model={}", self.provider, self.model);

        let response = self
            .client
            .post(&self.api_url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .json(api_request)
            .send()
            .await
            .map_err(|e| ProviderError::from_transport(&e, self.timeout_secs, e.is_timeout()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ProviderError::from_transport(&e, self.timeout_secs, e.is_timeout()))?;

        if !status.is_success() {
            return Err(ProviderError::from_api_response(
                status.as_u16(),
                &api_error_message(&body),
            ));
        }

        Ok(body)
    }
}

/// The combined prompt starts with the system prompt; split it back out so the
/// model receives it as a system message.
fn split_prompt(prompt: &str) -> (&str, &str) {
    match prompt.strip_prefix(SYSTEM_PROMPT) {
        Some(rest) => (SYSTEM_PROMPT, rest.trim_start()),
        None => ("", prompt),
    }
}

#[async_trait]
impl VisionAnalyzer for OpenAiCompatAnalyzer {
    async fn analyze_candidate(
        &self,
        image_base64: &str,
        prompt: &str,
    ) -> Result<MatchResult, ProviderError> {
        let (system, user) = split_prompt(prompt);
        let mut messages = Vec::with_capacity(2);
        if !system.is_empty() {
            messages.push(ApiMessage::system(system));
        }
        messages.push(ApiMessage::user(MessageContent::Parts(vec![
            ContentPart::Text {
                text: user.to_string(),
            },
            ContentPart::png(image_base64),
        ])));

        let body = self.send_request(&self.build_request(messages)).await?;
        let reply = ProviderReply::parse(ReplySchema::ChatCompletions, &body)?;
        Ok(reply.require_text().and_then(parse_verdict).unwrap_or_else(|e| {
            warn!("Unreadable {} verdict: {}", self.provider, e);
            MatchResult::no_match(format!("解析AI响应失败: {}", e))
        }))
    }

    async fn test_api_key(&self) -> KeyCheck {
        let request = self.build_request(vec![ApiMessage::user(MessageContent::Text(
            TEST_PROMPT.to_string(),
        ))]);
        match self.send_request(&request).await {
            Ok(_) => KeyCheck::valid(),
            Err(e) => {
                warn!("{} key check failed: {}", self.provider, e);
                KeyCheck::from_error(&e)
            }
        }
    }
}

#[cfg(test)]
#[path = "provider_tests.rs"]
mod tests;
