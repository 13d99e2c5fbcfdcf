//! Provider reply parsing.
//!
//! Each known reply schema has its own variant; the body is parsed against
//! the schema the provider declares instead of probing for whichever shape
//! happens to fit.

use std::sync::OnceLock;

use regex::Regex;
use serde::Deserialize;
use serde_json::Value;

use crate::error::ProviderError;
use crate::types::{DEFAULT_CONFIDENCE, DEFAULT_REASON, MatchResult};

/// Reply schemas spoken by supported providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplySchema {
    /// Google `generateContent`.
    Gemini,
    /// OpenAI-compatible `chat/completions`.
    ChatCompletions,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeminiReply {
    #[serde(default)]
    pub candidates: Vec<GeminiCandidate>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeminiCandidate {
    pub content: Option<GeminiContent>,
    #[serde(rename = "finishReason")]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeminiContent {
    #[serde(default)]
    pub parts: Vec<GeminiPart>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeminiPart {
    pub text: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatCompletionReply {
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatChoice {
    pub message: ChatReplyMessage,
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatReplyMessage {
    pub content: Option<String>,
}

/// A reply body parsed against one known schema.
#[derive(Debug, Clone)]
pub enum ProviderReply {
    Gemini(GeminiReply),
    ChatCompletions(ChatCompletionReply),
}

impl ProviderReply {
    pub fn parse(schema: ReplySchema, body: &str) -> Result<Self, ProviderError> {
        let reply = match schema {
            ReplySchema::Gemini => serde_json::from_str(body).map(Self::Gemini),
            ReplySchema::ChatCompletions => serde_json::from_str(body).map(Self::ChatCompletions),
        };
        reply.map_err(|e| ProviderError::MalformedReply(format!("{schema:?} reply: {e}")))
    }

    /// Model text of the first candidate/choice.
    pub fn text(&self) -> Option<&str> {
        let text = match self {
            Self::Gemini(r) => r
                .candidates
                .first()
                .and_then(|c| c.content.as_ref())
                .and_then(|c| c.parts.first())
                .and_then(|p| p.text.as_deref()),
            Self::ChatCompletions(r) => r.choices.first().and_then(|c| c.message.content.as_deref()),
        };
        text.filter(|t| !t.trim().is_empty())
    }

    /// Text, or a malformed-reply error when the model returned nothing.
    pub fn require_text(&self) -> Result<&str, ProviderError> {
        self.text()
            .ok_or_else(|| ProviderError::MalformedReply("empty reply".to_string()))
    }
}

fn object_span() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)\{.*\}").expect("valid regex"))
}

/// Pull a JSON value out of model text: the whole text first, then the
/// outermost `{...}` span.
pub fn extract_json(text: &str) -> Option<Value> {
    if let Ok(v) = serde_json::from_str::<Value>(text.trim()) {
        return Some(v);
    }
    let span = object_span().find(text)?;
    serde_json::from_str(span.as_str()).ok()
}

/// Turn model text into a verdict. `match` must be a boolean; other fields
/// fall back to defaults.
pub fn parse_verdict(text: &str) -> Result<MatchResult, ProviderError> {
    let value = extract_json(text)
        .ok_or_else(|| ProviderError::MalformedReply("no JSON object in reply".to_string()))?;
    let is_match = value
        .get("match")
        .and_then(Value::as_bool)
        .ok_or_else(|| ProviderError::MalformedReply("missing boolean `match`".to_string()))?;
    let confidence = value
        .get("confidence")
        .and_then(Value::as_f64)
        .unwrap_or(DEFAULT_CONFIDENCE);
    let reason = value
        .get("reason")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .unwrap_or(DEFAULT_REASON);
    let highlights = value
        .get("highlights")
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default();
    Ok(MatchResult::new(is_match, confidence, reason, highlights))
}

/// Best human-readable message from an error body (`error.message` when JSON).
pub fn api_error_message(body: &str) -> String {
    serde_json::from_str::<Value>(body)
        .ok()
        .and_then(|v| {
            v.pointer("/error/message")
                .and_then(Value::as_str)
                .map(str::to_string)
        })
        .unwrap_or_else(|| body.chars().take(200).collect())
}

#[cfg(test)]
#[path = "reply_tests.rs"]
mod tests;
