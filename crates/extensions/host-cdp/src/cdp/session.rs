//! Page session and the transport seam used by the host.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use super::client::Connection;
use super::error::CdpError;

/// Command channel to one attached page.
#[async_trait]
pub trait CdpTransport: Send + Sync {
    /// Target ID of the attached page.
    fn target_id(&self) -> &str;

    /// Send a command scoped to the page session.
    async fn call(&self, method: &str, params: Option<Value>) -> Result<Value, CdpError>;

    /// Send a browser-level command (e.g. `Browser.*`).
    async fn call_browser(&self, method: &str, params: Option<Value>) -> Result<Value, CdpError>;
}

/// A flattened session attached to a single page target.
pub struct PageSession {
    target_id: String,
    session_id: String,
    conn: Arc<Connection>,
}

impl PageSession {
    pub(crate) fn new(target_id: String, session_id: String, conn: Arc<Connection>) -> Self {
        Self {
            target_id,
            session_id,
            conn,
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Enable required CDP domains.
    pub(crate) async fn enable_domains(&self) -> Result<(), CdpError> {
        self.call("Page.enable", None).await?;
        self.call("DOM.enable", None).await?;
        self.call("Runtime.enable", None).await?;

        debug!("Enabled CDP domains for session {}", self.session_id);
        Ok(())
    }
}

#[async_trait]
impl CdpTransport for PageSession {
    fn target_id(&self) -> &str {
        &self.target_id
    }

    async fn call(&self, method: &str, params: Option<Value>) -> Result<Value, CdpError> {
        self.conn.send(method, params, Some(&self.session_id)).await
    }

    async fn call_browser(&self, method: &str, params: Option<Value>) -> Result<Value, CdpError> {
        self.conn.send(method, params, None).await
    }
}
