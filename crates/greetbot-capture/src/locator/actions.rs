//! Candidate list, greet button and page-state lookups within one frame.

use tracing::{debug, info};

use greetbot_protocols::{CandidateInfo, ElementHandle, FrameDocument};

use super::{Locator, SelectorChain};
use crate::error::CaptureError;

const UNKNOWN_NAME: &str = "未知";

/// State of the greet control in the detail dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonState {
    Ready,
    /// The dialog offers "continue chatting" instead; already greeted.
    AlreadyActed,
    Disabled,
    NotFound,
}

/// Result of trying to greet the open candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GreetOutcome {
    Clicked,
    AlreadyGreeted,
    Unavailable(ButtonState),
}

impl GreetOutcome {
    /// Whether the candidate ends up greeted.
    pub fn is_greeted(&self) -> bool {
        matches!(self, Self::Clicked | Self::AlreadyGreeted)
    }
}

impl Locator {
    /// Cards matched by the first card-list selector that matches anything.
    pub async fn cards(&self, frame: &dyn FrameDocument) -> Result<Vec<ElementHandle>, CaptureError> {
        for selector in &self.selectors.card_list {
            let cards = frame.query_all(None, selector).await?;
            if !cards.is_empty() {
                return Ok(cards);
            }
        }
        Ok(Vec::new())
    }

    pub async fn count_cards(&self, frame: &dyn FrameDocument) -> Result<usize, CaptureError> {
        Ok(self.cards(frame).await?.len())
    }

    async fn card(&self, frame: &dyn FrameDocument, index: usize) -> Result<ElementHandle, CaptureError> {
        self.cards(frame)
            .await?
            .into_iter()
            .nth(index)
            .ok_or_else(|| CaptureError::NotFoundInFrame(format!("candidate card {index}")))
    }

    /// Name and base-info line of card `index`.
    pub async fn candidate_info(
        &self,
        frame: &dyn FrameDocument,
        index: usize,
    ) -> Result<CandidateInfo, CaptureError> {
        let card = self.card(frame, index).await?;
        let s = &self.selectors;

        let name = match frame.query(Some(&card), &s.card_name).await? {
            Some(el) => frame.text(&el).await?,
            None => String::new(),
        };
        let name = if name.is_empty() {
            UNKNOWN_NAME.to_string()
        } else {
            name
        };
        let base_info = match frame.query(Some(&card), &s.card_base_info).await? {
            Some(el) => frame.text(&el).await?,
            None => String::new(),
        };
        Ok(CandidateInfo::new(index, name, base_info))
    }

    /// Open the detail dialog for card `index`.
    pub async fn click_card(&self, frame: &dyn FrameDocument, index: usize) -> Result<(), CaptureError> {
        let card = self.card(frame, index).await?;
        let target = frame
            .query(Some(&card), &self.selectors.card_click_target)
            .await?
            .ok_or_else(|| {
                CaptureError::NotFoundInFrame(format!("click target of candidate card {index}"))
            })?;
        frame.click(&target).await?;
        debug!(index, "Candidate card clicked");
        Ok(())
    }

    async fn greet_control(
        &self,
        frame: &dyn FrameDocument,
    ) -> Result<(ButtonState, Option<ElementHandle>), CaptureError> {
        let s = &self.selectors;

        if let Some(el) = frame.query(None, &s.continue_button).await? {
            if frame.text(&el).await?.contains(s.continue_text.as_str()) {
                return Ok((ButtonState::AlreadyActed, None));
            }
        }

        if let Some(found) = self
            .find_first(frame, None, &SelectorChain::css(&s.greet_button))
            .await?
        {
            let state = if frame.is_disabled(&found.element).await? {
                ButtonState::Disabled
            } else {
                ButtonState::Ready
            };
            return Ok((state, Some(found.element)));
        }

        // Fall back to scanning buttons by label.
        let dialog = frame.query(None, &s.detail_dialog).await?;
        for button in frame.query_all(dialog.as_ref(), "button").await? {
            let text = frame.text(&button).await?;
            if text.contains(s.continue_text.as_str()) {
                return Ok((ButtonState::AlreadyActed, None));
            }
            if text.contains(s.greet_text.as_str()) {
                let state = if frame.is_disabled(&button).await? {
                    ButtonState::Disabled
                } else {
                    ButtonState::Ready
                };
                return Ok((state, Some(button)));
            }
        }
        Ok((ButtonState::NotFound, None))
    }

    pub async fn greet_button_state(&self, frame: &dyn FrameDocument) -> Result<ButtonState, CaptureError> {
        Ok(self.greet_control(frame).await?.0)
    }

    /// Click the greet button when it is ready.
    pub async fn click_greet(&self, frame: &dyn FrameDocument) -> Result<GreetOutcome, CaptureError> {
        match self.greet_control(frame).await? {
            (ButtonState::Ready, Some(button)) => {
                frame.click(&button).await?;
                info!(frame = %frame.url(), "Greet button clicked");
                Ok(GreetOutcome::Clicked)
            }
            (ButtonState::AlreadyActed, _) => Ok(GreetOutcome::AlreadyGreeted),
            (state, _) => Ok(GreetOutcome::Unavailable(state)),
        }
    }

    /// Close the detail dialog. Returns `false` when no dialog is open here.
    pub async fn close_detail(&self, frame: &dyn FrameDocument) -> Result<bool, CaptureError> {
        if frame.query(None, &self.selectors.detail_dialog).await?.is_none() {
            return Ok(false);
        }
        match self
            .find_first(frame, None, &SelectorChain::css(&self.selectors.close_button))
            .await?
        {
            Some(found) => frame.click(&found.element).await?,
            None => {
                debug!("No close button, sending Escape");
                frame.press_escape().await?;
            }
        }
        Ok(true)
    }

    /// Whether a verification challenge is showing in this frame.
    pub async fn captcha_present(&self, frame: &dyn FrameDocument) -> Result<bool, CaptureError> {
        for selector in &self.selectors.captcha {
            if frame.query(None, selector).await?.is_some() {
                return Ok(true);
            }
        }
        let body = frame.body_text().await?;
        Ok(self
            .selectors
            .captcha_texts
            .iter()
            .any(|t| body.contains(t.as_str())))
    }
}
