//! Gemini vision analyzer.

use async_trait::async_trait;
use tracing::{debug, warn};

use greetbot_config::VisionConfig;
use greetbot_protocols::vision::{ReplySchema, TEST_PROMPT, parse_verdict};
use greetbot_protocols::{KeyCheck, MatchResult, ProviderError, ProviderReply, VisionAnalyzer};

use crate::client::GeminiClient;
use crate::types::*;

/// Vision analyzer backed by Gemini `generateContent`.
pub struct GeminiAnalyzer {
    client: GeminiClient,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

impl GeminiAnalyzer {
    pub fn from_config(config: &VisionConfig) -> Result<Self, ProviderError> {
        let api_key = config
            .api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .ok_or(ProviderError::MissingApiKey)?;
        Ok(Self {
            client: GeminiClient::new(config.effective_base_url(), api_key, config.timeout_seconds)?,
            model: config.effective_model().to_string(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn build_request(&self, prompt: &str, image_base64: Option<&str>) -> GenerateContentRequest {
        let mut parts = vec![Part::text(prompt)];
        if let Some(image) = image_base64 {
            parts.push(Part::png(image));
        }
        GenerateContentRequest::user(
            parts,
            GenerationConfig {
                temperature: Some(self.temperature),
                top_p: Some(0.95),
                top_k: Some(40),
                max_output_tokens: Some(self.max_tokens),
            },
        )
    }
}

/// Reply text to verdict. Unreadable verdicts degrade to a no-match.
pub(crate) fn verdict_from_body(body: &str) -> Result<MatchResult, ProviderError> {
    let reply = ProviderReply::parse(ReplySchema::Gemini, body)?;
    let verdict = reply.require_text().and_then(parse_verdict);
    Ok(verdict.unwrap_or_else(|e| {
        warn!("Unreadable Gemini verdict: {}", e);
        MatchResult::no_match(format!("解析AI响应失败: {}", e))
    }))
}

#[async_trait]
impl VisionAnalyzer for GeminiAnalyzer {
    async fn analyze_candidate(
        &self,
        image_base64: &str,
        prompt: &str,
    ) -> Result<MatchResult, ProviderError> {
        let request = self.build_request(prompt, Some(image_base64));
        let body = self.client.generate_content(&self.model, &request).await?;
        debug!("Gemini reply: {} bytes", body.len());
        verdict_from_body(&body)
    }

    async fn test_api_key(&self) -> KeyCheck {
        let request = self.build_request(TEST_PROMPT, None);
        match self.client.generate_content(&self.model, &request).await {
            Ok(_) => KeyCheck::valid(),
            Err(e) => {
                warn!("Gemini key check failed: {}", e);
                KeyCheck::from_error(&e)
            }
        }
    }
}

#[cfg(test)]
#[path = "provider_tests.rs"]
mod tests;
