//! Browser host errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum HostError {
    /// The frame (or its ancestor) belongs to a different origin.
    #[error("Cross-origin frame access denied: {0}")]
    CrossOrigin(String),

    #[error("Element handle is stale or unknown: {0}")]
    StaleElement(String),

    #[error("Frame detached: {0}")]
    FrameDetached(String),

    #[error("No active tab")]
    NoActiveTab,

    #[error("Capture failed: {0}")]
    Capture(String),

    #[error("Script evaluation failed: {0}")]
    Script(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Timeout after {0} ms")]
    Timeout(u64),
}

impl HostError {
    /// Whether the error means "not reachable from here" rather than a broken host.
    pub fn is_cross_origin(&self) -> bool {
        matches!(self, Self::CrossOrigin(_))
    }
}

#[cfg(test)]
#[path = "host_tests.rs"]
mod tests;
