//! Multi-frame result arbitration.
//!
//! The same lookup runs in every frame of the tab and the caller cannot know
//! beforehand which frame holds the target. Results are bucketed by where
//! their rect sits: a rect offset past the sidebar comes from the host frame
//! and is already in tab coordinates, a narrow rect at x = 0 is relative to a
//! nested frame's own viewport and is only a last resort.

use greetbot_config::ArbiterConfig;
use greetbot_protocols::FrameQueryResult;
use tracing::debug;

/// Error surfaced when every frame failed or skipped.
pub const NO_FRAME_MATCHED: &str = "operation failed: no frame matched";

/// Positional classification of a successful per-frame result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameRole {
    Host,
    Other,
    Nested,
}

#[derive(Debug, Clone, Copy)]
pub struct Arbiter {
    thresholds: ArbiterConfig,
}

impl Default for Arbiter {
    fn default() -> Self {
        Self::new(ArbiterConfig::default())
    }
}

impl Arbiter {
    pub fn new(thresholds: ArbiterConfig) -> Self {
        Self { thresholds }
    }

    /// Bucket a result. `None` for failures and empty rects, which are never selectable.
    pub fn classify(&self, result: &FrameQueryResult) -> Option<FrameRole> {
        let rect = result.usable_rect()?;
        let role = if rect.x > self.thresholds.host_min_x {
            FrameRole::Host
        } else if rect.x == 0.0 && rect.width <= self.thresholds.nested_max_width {
            FrameRole::Nested
        } else {
            FrameRole::Other
        };
        Some(role)
    }

    /// Pick the authoritative result: host > other > nested. Within the host
    /// and nested buckets the last frame in order wins, within "other" the
    /// first. With no usable result, the first real (non-skip) failure is
    /// returned, else [`NO_FRAME_MATCHED`].
    pub fn arbitrate(&self, results: &[FrameQueryResult]) -> FrameQueryResult {
        for wanted in [FrameRole::Host, FrameRole::Other, FrameRole::Nested] {
            let mut bucket = results.iter().filter(|r| self.classify(r) == Some(wanted));
            let hit = match wanted {
                FrameRole::Other => bucket.next(),
                FrameRole::Host | FrameRole::Nested => bucket.last(),
            };
            if let Some(hit) = hit {
                debug!(role = ?wanted, frame = %hit.frame_url, "Arbiter selected frame result");
                return hit.clone();
            }
        }

        results
            .iter()
            .find(|r| !r.success && r.error.is_some() && !r.is_skip())
            .cloned()
            .unwrap_or_else(|| FrameQueryResult::failure(NO_FRAME_MATCHED))
    }
}

#[cfg(test)]
#[path = "arbiter_tests.rs"]
mod tests;
