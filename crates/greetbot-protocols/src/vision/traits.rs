//! Vision analyzer trait definition.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::ProviderError;
use crate::types::MatchResult;

/// Outcome of a key check against the provider.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyCheck {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub quota_exceeded: bool,
}

impl KeyCheck {
    pub fn valid() -> Self {
        Self {
            valid: true,
            error: None,
            quota_exceeded: false,
        }
    }

    pub fn from_error(err: &ProviderError) -> Self {
        Self {
            valid: false,
            error: Some(err.to_string()),
            quota_exceeded: err.is_quota_exceeded(),
        }
    }
}

/// Remote vision model used to judge a candidate screenshot.
///
/// Implementations make a single HTTP call with a timeout and never retry.
#[async_trait]
pub trait VisionAnalyzer: Send + Sync {
    /// Judge a base64 PNG (no `data:` prefix) against `prompt`.
    async fn analyze_candidate(
        &self,
        image_base64: &str,
        prompt: &str,
    ) -> Result<MatchResult, ProviderError>;

    /// Send a tiny text-only request to check the configured key.
    async fn test_api_key(&self) -> KeyCheck;
}
