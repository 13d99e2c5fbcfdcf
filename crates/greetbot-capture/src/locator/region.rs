//! Resume region lookup.
//!
//! The detail dialog is rendered in the host frame and embeds the resume as
//! a canvas inside a nested frame. The host frame reports the region right
//! of the sidebar, sized by the canvas's intrinsic height when the nested
//! frame is reachable. The nested frame reports the canvas box in its own
//! viewport after forcing lazy content to load.

use std::time::Duration;

use tokio::time::sleep;
use tracing::debug;

use greetbot_protocols::{ElementHandle, FrameDocument, FrameQueryResult, Rect, ViewportSize};

use super::{Locator, SelectorChain};
use crate::error::CaptureError;

impl Locator {
    /// Resume region as seen from `frame`. Never fails; errors become a
    /// failed result so the arbiter can weigh them.
    pub async fn locate_resume_region(&self, frame: &dyn FrameDocument) -> FrameQueryResult {
        match self.resume_region(frame).await {
            Ok(result) => result,
            Err(e) => FrameQueryResult::failed(frame.url(), e.to_string()),
        }
    }

    async fn resume_region(&self, frame: &dyn FrameDocument) -> Result<FrameQueryResult, CaptureError> {
        let is_resume_frame = frame.url().contains(&self.capture.resume_frame_marker);

        if !is_resume_frame {
            if let Some(dialog) = frame.query(None, &self.selectors.detail_dialog).await? {
                return self.host_region(frame, &dialog).await;
            }
            return Ok(FrameQueryResult::skipped(
                frame.url(),
                "no detail dialog in this frame and not a resume frame",
            ));
        }
        self.nested_region(frame).await
    }

    async fn host_region(
        &self,
        frame: &dyn FrameDocument,
        dialog: &ElementHandle,
    ) -> Result<FrameQueryResult, CaptureError> {
        let s = &self.selectors;
        let dialog_rect = frame.bounding_rect(dialog).await?;
        let viewport = frame.viewport().await.ok();

        let sidebar_rect = match self
            .find_with_top_fallback(frame, &SelectorChain::css(&s.sidebar))
            .await?
        {
            Some(hit) => hit.bounding_rect(frame).await.ok(),
            None => None,
        };

        let region = match frame.query(Some(dialog), &s.resume_iframe).await? {
            Some(iframe) => {
                let iframe_rect = frame.bounding_rect(&iframe).await?;
                let canvas_height = self.embedded_canvas_height(frame, &iframe).await;
                let base = self.base_region(frame, dialog).await?.unwrap_or(iframe_rect);
                self.shape_region(base, dialog_rect, iframe_rect, sidebar_rect, canvas_height)
            }
            None => {
                let content = frame.query(Some(dialog), &s.dialog_content).await?;
                match content {
                    Some(c) => frame.bounding_rect(&c).await?,
                    None => dialog_rect,
                }
            }
        };

        debug!(frame = %frame.url(), %region, sidebar = sidebar_rect.is_some(), "Host frame region");
        self.bring_into_view(frame, region, viewport).await?;

        if region.is_empty() {
            return Err(CaptureError::ZeroAreaRegion {
                width: region.width,
                height: region.height,
            });
        }
        Ok(FrameQueryResult::found(frame.url(), region, viewport))
    }

    /// Middle wrap, else the left content area, inside the dialog layout.
    async fn base_region(
        &self,
        frame: &dyn FrameDocument,
        dialog: &ElementHandle,
    ) -> Result<Option<Rect>, CaptureError> {
        let s = &self.selectors;
        let layout = frame.query(Some(dialog), &s.layout_wrap).await?;

        if let Some(ref layout) = layout {
            if let Some(middle) = frame.query(Some(layout), &s.middle_wrap).await? {
                return Ok(Some(frame.bounding_rect(&middle).await?));
            }
        }

        let left_chain = SelectorChain::css(&s.left_area);
        let mut left = None;
        if let Some(ref layout) = layout {
            left = self.find_first(frame, Some(layout), &left_chain).await?;
        }
        if left.is_none() {
            left = self.find_first(frame, Some(dialog), &left_chain).await?;
        }
        match left {
            Some(found) => Ok(Some(frame.bounding_rect(&found.element).await?)),
            None => Ok(None),
        }
    }

    /// Horizontal extent from the sidebar's right edge to the dialog's right
    /// edge; height from the embedded canvas, the iframe, or the dialog.
    fn shape_region(
        &self,
        base: Rect,
        dialog: Rect,
        iframe: Rect,
        sidebar: Option<Rect>,
        canvas_height: Option<f64>,
    ) -> Rect {
        let max_height = self.capture.max_height;
        let min_size = self.capture.min_region_size;
        let base = base.clip_origin();

        let (x, mut width) = match sidebar {
            Some(sb) => (sb.right(), dialog.right() - sb.right()),
            None => (dialog.x, dialog.width),
        };

        let mut height = match canvas_height {
            Some(h) if h > 0.0 => h.min(max_height),
            _ if iframe.height > 0.0 => iframe.height.min(max_height),
            _ => dialog.height.min(max_height),
        };

        if width < min_size {
            width = dialog.width.max(min_size);
        }
        if height < min_size {
            let fallback = if iframe.height > 0.0 { iframe.height } else { dialog.height };
            height = fallback.max(min_size);
        }

        Rect::new(x, base.y, width, height)
    }

    /// Intrinsic height of the resume canvas inside the iframe, when the
    /// iframe's document is reachable from this frame.
    async fn embedded_canvas_height(
        &self,
        frame: &dyn FrameDocument,
        iframe: &ElementHandle,
    ) -> Option<f64> {
        let child = match frame.child_frame(iframe).await {
            Ok(child) => child,
            Err(e) => {
                debug!(error = %e, "Resume iframe not reachable, using iframe height");
                return None;
            }
        };
        let canvas = child
            .query(None, &self.selectors.iframe_canvas)
            .await
            .ok()
            .flatten()?;

        let intrinsic = child
            .numeric_property(&canvas, "height")
            .await
            .ok()
            .flatten()
            .filter(|h| *h > 0.0);
        if intrinsic.is_some() {
            return intrinsic;
        }

        let container = child.parent(&canvas).await.ok().flatten();
        if let Some(container) = container {
            if let Ok(m) = child.scroll_metrics(&container).await {
                if m.scroll_height > 0.0 {
                    return Some(m.scroll_height);
                }
            }
        }
        child
            .bounding_rect(&canvas)
            .await
            .ok()
            .map(|r| r.height)
            .filter(|h| *h > 0.0)
    }

    async fn bring_into_view(
        &self,
        frame: &dyn FrameDocument,
        region: Rect,
        viewport: Option<ViewportSize>,
    ) -> Result<(), CaptureError> {
        let Some(vp) = viewport else {
            return Ok(());
        };
        let outside = region.y < 0.0 || region.y > vp.height || region.x < 0.0 || region.x > vp.width;
        if outside {
            debug!(%region, "Region outside viewport, scrolling window");
            frame
                .scroll_window_to(region.x.max(0.0), region.y.max(0.0))
                .await?;
            sleep(Duration::from_millis(self.capture.window_scroll_settle_ms)).await;
        }
        Ok(())
    }

    async fn nested_region(&self, frame: &dyn FrameDocument) -> Result<FrameQueryResult, CaptureError> {
        let chain = SelectorChain::css(&self.selectors.resume_canvas);
        let Some(canvas) = self.find_first(frame, None, &chain).await? else {
            return Ok(FrameQueryResult::failed(
                frame.url(),
                "canvas not found in resume frame",
            ));
        };

        self.settle_lazy_container(frame, &canvas.element).await?;

        let rect = frame.bounding_rect(&canvas.element).await?;
        if rect.is_empty() {
            return Err(CaptureError::ZeroAreaRegion {
                width: rect.width,
                height: rect.height,
            });
        }
        let viewport = frame.viewport().await.ok();
        Ok(FrameQueryResult::found(frame.url(), rect, viewport))
    }
}
