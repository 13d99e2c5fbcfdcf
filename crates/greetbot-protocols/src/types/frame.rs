//! Per-frame query results.

use serde::{Deserialize, Serialize};

use super::{Rect, ViewportSize};

/// Markers that flag a failure as an intentional skip rather than a real error.
pub const SKIP_MARKERS: &[&str] = &["跳过", "skipped"];

/// Outcome of running one query inside one frame.
///
/// Created once per frame and never mutated. Frames that legitimately do not
/// host the target report a skip via [`FrameQueryResult::skipped`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameQueryResult {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rect: Option<Rect>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub frame_url: String,
    /// Live viewport of the frame that measured `rect`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub viewport: Option<ViewportSize>,
}

impl FrameQueryResult {
    pub fn found(frame_url: impl Into<String>, rect: Rect, viewport: Option<ViewportSize>) -> Self {
        Self {
            success: true,
            rect: Some(rect),
            error: None,
            frame_url: frame_url.into(),
            viewport,
        }
    }

    pub fn failed(frame_url: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            success: false,
            rect: None,
            error: Some(error.into()),
            frame_url: frame_url.into(),
            viewport: None,
        }
    }

    /// A failure that only says "this frame does not hold the target".
    pub fn skipped(frame_url: impl Into<String>, reason: impl AsRef<str>) -> Self {
        Self::failed(frame_url, format!("{}, skipped", reason.as_ref()))
    }

    /// Failure result without frame identity, used for the overall outcome.
    pub fn failure(error: impl Into<String>) -> Self {
        Self::failed(String::new(), error)
    }

    pub fn is_skip(&self) -> bool {
        self.error
            .as_deref()
            .is_some_and(|e| SKIP_MARKERS.iter().any(|m| e.contains(m)))
    }

    /// The rect of a successful, non-empty result.
    pub fn usable_rect(&self) -> Option<Rect> {
        self.rect.filter(|r| self.success && !r.is_empty())
    }
}

#[cfg(test)]
#[path = "frame_tests.rs"]
mod tests;
