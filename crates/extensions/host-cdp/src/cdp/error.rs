//! CDP error types.

use greetbot_protocols::HostError;
use thiserror::Error;

/// CDP client errors.
#[derive(Debug, Error)]
pub enum CdpError {
    /// Failed to connect to Chrome.
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    /// Chrome not found or not running with remote debugging.
    #[error("Chrome not available at {0}. Start Chrome with: chrome --remote-debugging-port=9222")]
    ChromeNotAvailable(String),

    #[error("WebSocket error: {0}")]
    WebSocket(String),

    /// Error object returned by the browser.
    #[error("CDP error: {message} (code: {code})")]
    Protocol { code: i64, message: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// HTTP error (for endpoint discovery).
    #[error("HTTP error: {0}")]
    Http(String),

    /// No open tab matched.
    #[error("Page not found: {0}")]
    PageNotFound(String),

    /// A script threw inside the page.
    #[error("JavaScript error: {0}")]
    JavaScript(String),

    #[error("{method} timed out after {ms} ms")]
    Timeout { method: String, ms: u64 },

    #[error("Session closed")]
    SessionClosed,

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl From<tokio_tungstenite::tungstenite::Error> for CdpError {
    fn from(e: tokio_tungstenite::tungstenite::Error) -> Self {
        CdpError::WebSocket(e.to_string())
    }
}

impl From<reqwest::Error> for CdpError {
    fn from(e: reqwest::Error) -> Self {
        CdpError::Http(e.to_string())
    }
}

impl From<url::ParseError> for CdpError {
    fn from(e: url::ParseError) -> Self {
        CdpError::ConnectionFailed(format!("Invalid URL: {}", e))
    }
}

impl From<CdpError> for HostError {
    fn from(e: CdpError) -> Self {
        match e {
            CdpError::Protocol { ref message, .. } if message.contains("Could not find object") => {
                HostError::StaleElement(message.clone())
            }
            CdpError::Protocol { ref message, .. }
                if message.contains("No frame") || message.contains("Cannot find context") =>
            {
                HostError::FrameDetached(message.clone())
            }
            CdpError::JavaScript(message) => HostError::Script(message),
            CdpError::Timeout { ms, .. } => HostError::Timeout(ms),
            CdpError::PageNotFound(_) => HostError::NoActiveTab,
            other => HostError::Transport(other.to_string()),
        }
    }
}
