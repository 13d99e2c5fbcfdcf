//! Error types for the candidate loop.

use thiserror::Error;

use greetbot_capture::CaptureError;

/// Errors that end a run or a session store operation.
#[derive(Debug, Error)]
pub enum RunError {
    /// Another run is active in this process.
    #[error("A run is already in progress")]
    AlreadyRunning,

    /// No candidate card was found in any frame.
    #[error("No candidates found on the page")]
    NoCandidates,

    /// Stop requested by the user. Not a failure.
    #[error("Run cancelled")]
    Cancelled,

    /// A verification challenge is showing; continuing would be flagged.
    #[error("Captcha detected, run stopped")]
    CaptchaDetected,

    #[error("Daily greet limit reached ({limit})")]
    DailyLimitReached { limit: u32 },

    #[error(transparent)]
    Capture(#[from] CaptureError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Result type for run operations.
pub type RunResult<T> = Result<T, RunError>;

/// Session store errors.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid screenshot data: {0}")]
    Screenshot(String),
}
