//! Frame-relative element lookup.
//!
//! A [`SelectorChain`] lists strategies most-specific first; the first one
//! that matches wins. Lookups run inside a single frame. Targets that may
//! live in the top-level document are retried there, and a cross-origin
//! denial only means "not in this scope".

mod actions;
mod region;

use std::sync::Arc;
use std::time::Duration;

use tokio::time::{Instant, sleep};
use tracing::debug;

use greetbot_config::{CaptureConfig, SelectorConfig};
use greetbot_protocols::{ElementHandle, FrameDocument, HostError, Rect};

use crate::error::CaptureError;

pub use actions::{ButtonState, GreetOutcome};

const WAIT_POLL_INTERVAL: Duration = Duration::from_millis(200);

/// One way of finding an element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SelectorStrategy {
    /// Plain CSS selector.
    Css(String),
    /// Elements matching `selector` whose text contains `contains`.
    Text { selector: String, contains: String },
}

/// Ordered fallbacks for one logical target.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SelectorChain(Vec<SelectorStrategy>);

impl SelectorChain {
    pub fn css<S: AsRef<str>>(selectors: &[S]) -> Self {
        Self(
            selectors
                .iter()
                .map(|s| SelectorStrategy::Css(s.as_ref().to_string()))
                .collect(),
        )
    }

    pub fn then_text(mut self, selector: impl Into<String>, contains: impl Into<String>) -> Self {
        self.0.push(SelectorStrategy::Text {
            selector: selector.into(),
            contains: contains.into(),
        });
        self
    }

    pub fn strategies(&self) -> &[SelectorStrategy] {
        &self.0
    }
}

/// Element found by a chain, with the index of the strategy that matched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Found {
    pub element: ElementHandle,
    pub strategy: usize,
}

/// Element found either in the querying frame or in the top document.
pub struct CrossFrameHit {
    pub element: ElementHandle,
    /// `Some` when the element lives in the top-level document.
    pub top: Option<Arc<dyn FrameDocument>>,
}

impl CrossFrameHit {
    pub async fn bounding_rect(&self, current: &dyn FrameDocument) -> Result<Rect, HostError> {
        match &self.top {
            Some(doc) => doc.bounding_rect(&self.element).await,
            None => current.bounding_rect(&self.element).await,
        }
    }
}

/// Per-frame DOM lookups for the recruiting page.
#[derive(Debug, Clone)]
pub struct Locator {
    selectors: SelectorConfig,
    capture: CaptureConfig,
}

impl Locator {
    pub fn new(selectors: SelectorConfig, capture: CaptureConfig) -> Self {
        Self { selectors, capture }
    }

    pub fn selectors(&self) -> &SelectorConfig {
        &self.selectors
    }

    /// First element matched by the chain within `scope`.
    pub async fn find_first(
        &self,
        frame: &dyn FrameDocument,
        scope: Option<&ElementHandle>,
        chain: &SelectorChain,
    ) -> Result<Option<Found>, HostError> {
        for (strategy, s) in chain.strategies().iter().enumerate() {
            let element = match s {
                SelectorStrategy::Css(selector) => frame.query(scope, selector).await?,
                SelectorStrategy::Text { selector, contains } => {
                    let mut hit = None;
                    for el in frame.query_all(scope, selector).await? {
                        if frame.text(&el).await?.contains(contains.as_str()) {
                            hit = Some(el);
                            break;
                        }
                    }
                    hit
                }
            };
            if let Some(element) = element {
                return Ok(Some(Found { element, strategy }));
            }
        }
        Ok(None)
    }

    /// Look in `frame` first, then in the top document. Any failure to reach
    /// the top document is treated as "not found there".
    pub async fn find_with_top_fallback(
        &self,
        frame: &dyn FrameDocument,
        chain: &SelectorChain,
    ) -> Result<Option<CrossFrameHit>, HostError> {
        if let Some(found) = self.find_first(frame, None, chain).await? {
            return Ok(Some(CrossFrameHit {
                element: found.element,
                top: None,
            }));
        }
        if frame.is_top() {
            return Ok(None);
        }

        let top = match frame.top_document().await {
            Ok(top) => top,
            Err(e) => {
                debug!(frame = %frame.url(), error = %e, "Top document not reachable");
                return Ok(None);
            }
        };
        match self.find_first(top.as_ref(), None, chain).await {
            Ok(Some(found)) => Ok(Some(CrossFrameHit {
                element: found.element,
                top: Some(top),
            })),
            Ok(None) => Ok(None),
            Err(e) => {
                debug!(frame = %frame.url(), error = %e, "Lookup in top document failed");
                Ok(None)
            }
        }
    }

    /// Poll until `selector` matches or the configured timeout elapses.
    pub async fn wait_for(
        &self,
        frame: &dyn FrameDocument,
        selector: &str,
    ) -> Result<ElementHandle, CaptureError> {
        let timeout_ms = self.capture.wait_timeout_ms;
        let deadline = Instant::now() + Duration::from_millis(timeout_ms);
        loop {
            if let Some(el) = frame.query(None, selector).await? {
                return Ok(el);
            }
            if Instant::now() >= deadline {
                return Err(CaptureError::NotFoundInTime {
                    selector: selector.to_string(),
                    timeout_ms,
                });
            }
            sleep(WAIT_POLL_INTERVAL).await;
        }
    }

    /// Force a lazily rendered scroll container (the element's parent, or the
    /// element itself) to its bottom and let it settle before layout is read.
    pub async fn settle_lazy_container(
        &self,
        frame: &dyn FrameDocument,
        element: &ElementHandle,
    ) -> Result<(), HostError> {
        let container = frame
            .parent(element)
            .await?
            .unwrap_or_else(|| element.clone());
        let metrics = frame.scroll_metrics(&container).await?;
        if !metrics.is_scrollable() {
            return Ok(());
        }

        debug!(
            scroll_height = metrics.scroll_height,
            client_height = metrics.client_height,
            "Scrolling lazy container to bottom"
        );
        frame.set_scroll_top(&container, metrics.scroll_height).await?;
        sleep(Duration::from_millis(self.capture.scroll_settle_ms)).await;

        let metrics = frame.scroll_metrics(&container).await?;
        frame.set_scroll_top(&container, metrics.scroll_height).await?;
        sleep(Duration::from_millis(self.capture.confirm_settle_ms)).await;
        Ok(())
    }
}

#[cfg(test)]
#[path = "locator_tests.rs"]
mod tests;
