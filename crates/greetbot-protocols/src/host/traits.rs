//! Browser host and frame document traits.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::HostError;
use crate::types::{Rect, ViewportSize};

/// Opaque reference to a DOM element inside one frame.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ElementHandle(pub String);

impl ElementHandle {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Scroll geometry of a scroll container.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ScrollMetrics {
    pub scroll_top: f64,
    pub scroll_height: f64,
    pub client_height: f64,
}

impl ScrollMetrics {
    pub fn is_scrollable(&self) -> bool {
        self.scroll_height > self.client_height
    }
}

/// Which window the visible-tab capture should target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureTarget {
    /// Whatever window currently has focus.
    CurrentWindow,
    /// An explicit window.
    Window(u64),
}

/// DOM primitives scoped to a single frame.
///
/// Selectors are CSS selectors. A `scope` of `None` searches the whole
/// document; `Some(el)` searches `el`'s subtree.
#[async_trait]
pub trait FrameDocument: Send + Sync {
    /// URL of the frame's document.
    fn url(&self) -> &str;

    /// Whether this is the tab's top-level frame.
    fn is_top(&self) -> bool;

    /// First element matching `selector`.
    async fn query(
        &self,
        scope: Option<&ElementHandle>,
        selector: &str,
    ) -> Result<Option<ElementHandle>, HostError>;

    /// All elements matching `selector`, in document order.
    async fn query_all(
        &self,
        scope: Option<&ElementHandle>,
        selector: &str,
    ) -> Result<Vec<ElementHandle>, HostError>;

    /// Parent element, if any.
    async fn parent(&self, element: &ElementHandle) -> Result<Option<ElementHandle>, HostError>;

    /// Trimmed `textContent`.
    async fn text(&self, element: &ElementHandle) -> Result<String, HostError>;

    /// `getBoundingClientRect()` in this frame's viewport.
    async fn bounding_rect(&self, element: &ElementHandle) -> Result<Rect, HostError>;

    async fn scroll_metrics(&self, element: &ElementHandle) -> Result<ScrollMetrics, HostError>;

    async fn set_scroll_top(&self, element: &ElementHandle, value: f64) -> Result<(), HostError>;

    /// Numeric DOM property such as a canvas's intrinsic `height`. `None` when absent.
    async fn numeric_property(
        &self,
        element: &ElementHandle,
        name: &str,
    ) -> Result<Option<f64>, HostError>;

    async fn is_disabled(&self, element: &ElementHandle) -> Result<bool, HostError>;

    async fn click(&self, element: &ElementHandle) -> Result<(), HostError>;

    /// Dispatch an Escape key press to the document.
    async fn press_escape(&self) -> Result<(), HostError>;

    /// Live `innerWidth`/`innerHeight`.
    async fn viewport(&self) -> Result<ViewportSize, HostError>;

    async fn scroll_window_to(&self, x: f64, y: f64) -> Result<(), HostError>;

    /// Visible text of the whole document body.
    async fn body_text(&self) -> Result<String, HostError>;

    /// The tab's top-level document. Fails with [`HostError::CrossOrigin`] when
    /// this frame may not reach it.
    async fn top_document(&self) -> Result<Arc<dyn FrameDocument>, HostError>;

    /// The document loaded by an `<iframe>` element of this frame. Fails with
    /// [`HostError::CrossOrigin`] when the child is on another origin.
    async fn child_frame(&self, iframe: &ElementHandle) -> Result<Arc<dyn FrameDocument>, HostError>;
}

/// Tab-level browser primitives.
#[async_trait]
pub trait BrowserHost: Send + Sync {
    /// Window id of the active tab.
    async fn active_window(&self) -> Result<u64, HostError>;

    /// Every frame of the active tab, top frame first.
    async fn frames(&self) -> Result<Vec<Arc<dyn FrameDocument>>, HostError>;

    /// Capture the visible part of the active tab as a `data:image/png;base64,` URL.
    async fn capture_visible_tab(&self, target: CaptureTarget) -> Result<String, HostError>;

    /// Drop every element handle handed out so far. Handles obtained before
    /// the call are invalid afterwards.
    async fn release_handles(&self) -> Result<(), HostError> {
        Ok(())
    }
}
