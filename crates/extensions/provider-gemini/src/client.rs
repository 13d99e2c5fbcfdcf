//! Gemini API client.

use std::time::Duration;

use reqwest::Client;
use tracing::debug;

use greetbot_protocols::ProviderError;
use greetbot_protocols::vision::api_error_message;

use crate::types::GenerateContentRequest;

/// Gemini API client. One call per request, no retry.
pub struct GeminiClient {
    client: Client,
    base_url: String,
    api_key: String,
    timeout_secs: u64,
}

impl GeminiClient {
    pub fn new(base_url: &str, api_key: String, timeout_secs: u64) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| ProviderError::Network(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            timeout_secs,
        })
    }

    /// POST `generateContent` and return the raw success body.
    pub async fn generate_content(
        &self,
        model: &str,
        request: &GenerateContentRequest,
    ) -> Result<String, ProviderError> {
        let url = format!("{}/models/{}:generateContent", self.base_url, model);

        debug!("Gemini generate_content: model={}", model);

        let response = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(request)
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
