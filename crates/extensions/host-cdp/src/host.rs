//! The attached recruiting tab as a [`BrowserHost`].

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;
use tracing::{debug, info};

use greetbot_config::BrowserConfig;
use greetbot_protocols::{BrowserHost, CaptureTarget, FrameDocument, HostError};

use crate::cdp::protocol::{FrameTree, ScreenshotFormat};
use crate::cdp::{CdpClient, CdpError, CdpTransport};
use crate::frame::{CdpFrame, OBJECT_GROUP, WorldCache};

/// Browser host backed by one CDP page session.
pub struct CdpHost {
    transport: Arc<dyn CdpTransport>,
    worlds: Arc<WorldCache>,
    /// Keeps the WebSocket reader alive for the session's lifetime.
    _client: Option<CdpClient>,
}

impl CdpHost {
    /// Connect to Chrome and attach to the first tab matching `page_url_contains`.
    pub async fn connect(config: &BrowserConfig) -> Result<Self, CdpError> {
        let client = CdpClient::connect(
            &config.cdp_url,
            Duration::from_millis(config.command_timeout_ms),
        )
        .await?;
        let page = client.find_page(&config.page_url_contains).await?;
        info!("Attaching to tab: {} ({})", page.title, page.url);

        let session = client.attach_page(&page.id).await?;
        Ok(Self {
            transport: Arc::new(session),
            worlds: Arc::default(),
            _client: Some(client),
        })
    }

    /// Host over an already attached transport.
    pub fn with_transport(transport: Arc<dyn CdpTransport>) -> Self {
        Self {
            transport,
            worlds: Arc::default(),
            _client: None,
        }
    }

    /// Number of frames with a cached isolated world.
    pub fn cached_worlds(&self) -> usize {
        self.worlds.len()
    }
}

#[async_trait]
impl BrowserHost for CdpHost {
    async fn active_window(&self) -> Result<u64, HostError> {
        let result = self
            .transport
            .call_browser(
                "Browser.getWindowForTarget",
                Some(json!({ "targetId": self.transport.target_id() })),
            )
            .await?;
        result["windowId"]
            .as_u64()
            .ok_or_else(|| HostError::Transport("Missing windowId".to_string()))
    }

    async fn frames(&self) -> Result<Vec<Arc<dyn FrameDocument>>, HostError> {
        let result = self.transport.call("Page.getFrameTree", None).await?;
        let tree: FrameTree = serde_json::from_value(result["frameTree"].clone()).map_err(CdpError::from)?;
        let frames = Arc::new(tree.flatten());
        debug!("Frame tree has {} frame(s)", frames.len());
        self.worlds.retain(&frames);

        Ok(frames
            .iter()
            .map(|info| {
                Arc::new(CdpFrame::new(
                    self.transport.clone(),
                    info.clone(),
                    frames.clone(),
                    self.worlds.clone(),
                )) as Arc<dyn FrameDocument>
            })
            .collect())
    }

    /// Release every element handle handed out so far.
    async fn release_handles(&self) -> Result<(), HostError> {
        self.transport
            .call(
                "Runtime.releaseObjectGroup",
                Some(json!({ "objectGroup": OBJECT_GROUP })),
            )
            .await?;
        Ok(())
    }

    async fn capture_visible_tab(&self, target: CaptureTarget) -> Result<String, HostError> {
        if let CaptureTarget::Window(window_id) = target {
            let ours = self.active_window().await?;
            if ours != window_id {
                return Err(HostError::Capture(format!(
                    "window {} does not hold the attached tab (window {})",
                    window_id, ours
                )));
            }
        }

        let result = self
            .transport
            .call(
                "Page.captureScreenshot",
                Some(json!({
                    "format": ScreenshotFormat::Png,
                    "fromSurface": true,
                    "captureBeyondViewport": false,
                })),
            )
            .await
            .map_err(|e| HostError::Capture(e.to_string()))?;

        let data = result["data"]
            .as_str()
            .ok_or_else(|| HostError::Capture("Missing screenshot data".to_string()))?;
        Ok(format!("data:image/png;base64,{}", data))
    }
}

#[cfg(test)]
#[path = "host_tests.rs"]
mod tests;
