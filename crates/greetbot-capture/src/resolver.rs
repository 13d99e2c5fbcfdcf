//! Page-level operations over every frame of the active tab.
//!
//! Region lookups run in all frames at once and go through the [`Arbiter`].
//! Candidate-list operations target the frame holding the most cards. Dialog
//! actions are tried frame by frame until one frame owns the target.

use std::sync::Arc;

use futures::future::{join_all, select_ok};
use tracing::{debug, info};

use greetbot_config::{CaptureConfig, SelectorConfig};
use greetbot_protocols::{BrowserHost, CandidateInfo, FrameDocument, FrameQueryResult};

use crate::arbiter::Arbiter;
use crate::error::CaptureError;
use crate::locator::{ButtonState, GreetOutcome, Locator};

pub struct PageResolver {
    host: Arc<dyn BrowserHost>,
    locator: Locator,
    arbiter: Arbiter,
}

impl PageResolver {
    pub fn new(host: Arc<dyn BrowserHost>, selectors: SelectorConfig, capture: CaptureConfig) -> Self {
        let arbiter = Arbiter::new(capture.arbiter);
        Self {
            host,
            locator: Locator::new(selectors, capture),
            arbiter,
        }
    }

    pub fn locator(&self) -> &Locator {
        &self.locator
    }

    async fn frames(&self) -> Result<Vec<Arc<dyn FrameDocument>>, CaptureError> {
        Ok(self.host.frames().await?)
    }

    /// Locate the resume region in every frame and arbitrate. Only a failure
    /// to enumerate frames is an `Err`; "not found" is a failed result.
    pub async fn resolve_region(&self) -> Result<FrameQueryResult, CaptureError> {
        let frames = self.frames().await?;
        let results = join_all(
            frames
                .iter()
                .map(|frame| self.locator.locate_resume_region(frame.as_ref())),
        )
        .await;

        for r in &results {
            debug!(
                frame = %r.frame_url,
                success = r.success,
                rect = ?r.rect,
                error = ?r.error,
                "Frame region result"
            );
        }
        let chosen = self.arbiter.arbitrate(&results);
        if let Some(role) = self.arbiter.classify(&chosen) {
            debug!(?role, frame = %chosen.frame_url, "Region arbitrated");
        }
        Ok(chosen)
    }

    /// Frame with the most candidate cards, with its count.
    async fn candidate_frame(&self) -> Result<Option<(Arc<dyn FrameDocument>, usize)>, CaptureError> {
        let frames = self.frames().await?;
        let counts = join_all(frames.iter().map(|f| self.locator.count_cards(f.as_ref()))).await;

        let mut best: Option<(Arc<dyn FrameDocument>, usize)> = None;
        for (frame, count) in frames.into_iter().zip(counts) {
            let count = match count {
                Ok(n) => n,
                Err(e) => {
                    debug!(frame = %frame.url(), error = %e, "Card count failed");
                    0
                }
            };
            if count > 0 && best.as_ref().is_none_or(|(_, n)| count > *n) {
                best = Some((frame, count));
            }
        }
        Ok(best)
    }

    pub async fn candidate_count(&self) -> Result<usize, CaptureError> {
        let best = self.candidate_frame().await?;
        let count = best.map(|(_, n)| n).unwrap_or(0);
        info!(count, "Candidate cards found");
        Ok(count)
    }

    pub async fn candidate_info(&self, index: usize) -> Result<CandidateInfo, CaptureError> {
        let (frame, _) = self.require_candidate_frame().await?;
        self.locator.candidate_info(frame.as_ref(), index).await
    }

    pub async fn click_card(&self, index: usize) -> Result<(), CaptureError> {
        let (frame, _) = self.require_candidate_frame().await?;
        self.locator.click_card(frame.as_ref(), index).await
    }

    async fn require_candidate_frame(&self) -> Result<(Arc<dyn FrameDocument>, usize), CaptureError> {
        self.candidate_frame()
            .await?
            .ok_or_else(|| CaptureError::NotFoundInFrame("candidate list".to_string()))
    }

    /// Wait until the detail dialog appears in any frame.
    pub async fn wait_for_detail(&self) -> Result<(), CaptureError> {
        let frames = self.frames().await?;
        if frames.is_empty() {
            return Err(CaptureError::Unresolved("no frames in active tab".to_string()));
        }
        let selector = &self.locator.selectors().detail_dialog;
        let waits = frames
            .iter()
            .map(|f| Box::pin(self.locator.wait_for(f.as_ref(), selector)));
        select_ok(waits).await?;
        Ok(())
    }

    /// Greet in the first frame that holds a greet control.
    pub async fn click_greet(&self) -> Result<GreetOutcome, CaptureError> {
        for frame in self.frames().await? {
            match self.locator.click_greet(frame.as_ref()).await {
                Ok(GreetOutcome::Unavailable(ButtonState::NotFound)) => continue,
                Ok(outcome) => return Ok(outcome),
                Err(e) => debug!(frame = %frame.url(), error = %e, "Greet lookup failed"),
            }
        }
        Ok(GreetOutcome::Unavailable(ButtonState::NotFound))
    }

    /// Close the detail dialog wherever it is open.
    pub async fn close_detail(&self) -> Result<bool, CaptureError> {
        for frame in self.frames().await? {
            match self.locator.close_detail(frame.as_ref()).await {
                Ok(true) => return Ok(true),
                Ok(false) => {}
                Err(e) => debug!(frame = %frame.url(), error = %e, "Close lookup failed"),
            }
        }
        Ok(false)
    }

    /// Drop the element handles collected while working on one candidate.
    pub async fn release_handles(&self) -> Result<(), CaptureError> {
        Ok(self.host.release_handles().await?)
    }

    pub async fn captcha_present(&self) -> Result<bool, CaptureError> {
        for frame in self.frames().await? {
            match self.locator.captcha_present(frame.as_ref()).await {
                Ok(true) => return Ok(true),
                Ok(false) => {}
                Err(e) => debug!(frame = %frame.url(), error = %e, "Captcha check failed"),
            }
        }
        Ok(false)
    }
}

#[cfg(test)]
#[path = "resolver_tests.rs"]
mod tests;
