//! Capture pipeline errors.

use greetbot_protocols::HostError;
use thiserror::Error;

use crate::engine::CaptureStage;

#[derive(Debug, Error)]
pub enum CaptureError {
    /// Expected per frame; the arbiter aggregates these away.
    #[error("Not found in frame: {0}")]
    NotFoundInFrame(String),

    #[error("'{selector}' did not appear within {timeout_ms} ms")]
    NotFoundInTime { selector: String, timeout_ms: u64 },

    #[error("region has zero area ({width}x{height})")]
    ZeroAreaRegion { width: f64, height: f64 },

    /// Both visible-tab capture variants failed.
    #[error("screenshot capture failed: {primary}; fallback: {fallback}")]
    CaptureTransportFailure { primary: String, fallback: String },

    #[error("{stage} failed: {message}")]
    Stage { stage: CaptureStage, message: String },

    /// No frame produced a usable region.
    #[error("{0}")]
    Unresolved(String),

    #[error(transparent)]
    Host(#[from] HostError),
}

impl CaptureError {
    pub(crate) fn stage(stage: CaptureStage, message: impl std::fmt::Display) -> Self {
        Self::Stage {
            stage,
            message: message.to_string(),
        }
    }
}
