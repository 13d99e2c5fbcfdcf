//! Vision provider errors.

use thiserror::Error;

/// Markers in provider error bodies that mean the account ran out of quota.
const QUOTA_MARKERS: &[&str] = &["quota", "RESOURCE_EXHAUSTED", "配额", "限流"];

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("Provider not supported: {0}")]
    Unsupported(String),

    #[error("API key is not configured")]
    MissingApiKey,

    #[error("API error: {status} - {message}")]
    ApiError { status: u16, message: String },

    #[error("Rate limited or quota exhausted: {0}")]
    QuotaExceeded(String),

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Content filtered: {0}")]
    ContentFiltered(String),

    #[error("Malformed reply: {0}")]
    MalformedReply(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Timeout after {0} seconds")]
    Timeout(u64),
}

impl ProviderError {
    /// Map a non-success HTTP status and its body onto the error taxonomy.
    pub fn from_api_response(status: u16, body: &str) -> Self {
        let message = body.trim().to_string();
        if status == 429 || contains_quota_marker(&message) {
            return Self::QuotaExceeded(message);
        }
        match status {
            400 => Self::InvalidRequest(message),
            401 | 403 => Self::AuthenticationFailed(message),
            _ => Self::ApiError { status, message },
        }
    }

    /// Map a reqwest transport failure, keeping timeouts distinguishable.
    pub fn from_transport(err: &dyn std::error::Error, timeout_secs: u64, is_timeout: bool) -> Self {
        if is_timeout {
            Self::Timeout(timeout_secs)
        } else {
            Self::Network(err.to_string())
        }
    }

    pub fn is_quota_exceeded(&self) -> bool {
        match self {
            Self::QuotaExceeded(_) => true,
            Self::ApiError { status, message } => *status == 429 || contains_quota_marker(message),
            _ => false,
        }
    }
}

fn contains_quota_marker(message: &str) -> bool {
    QUOTA_MARKERS.iter().any(|m| message.contains(m))
}

#[cfg(test)]
#[path = "provider_tests.rs"]
mod tests;
