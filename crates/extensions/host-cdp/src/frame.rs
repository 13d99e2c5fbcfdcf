//! One frame of the attached page as a [`FrameDocument`].

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Value, json};
use parking_lot::Mutex;
use tracing::trace;

use greetbot_protocols::{ElementHandle, FrameDocument, HostError, Rect, ScrollMetrics, ViewportSize};

use crate::cdp::protocol::{DomNode, ExceptionDetails, FrameInfo, KeyEventType, PropertyDescriptor, RemoteObject};
use crate::cdp::{CdpError, CdpTransport};

/// Isolated world created in every frame we touch.
const WORLD_NAME: &str = "greetbot";
/// Object group for handles, released together by [`crate::CdpHost::release_handles`].
pub(crate) const OBJECT_GROUP: &str = "greetbot";

/// Origin used for same-origin checks: the browser-reported security origin,
/// else the one parsed from the URL.
pub fn frame_origin(info: &FrameInfo) -> String {
    match info.security_origin.as_deref() {
        Some(origin) if !origin.is_empty() => origin.to_string(),
        _ => url::Url::parse(&info.url)
            .map(|u| u.origin().ascii_serialization())
            .unwrap_or_else(|_| info.url.clone()),
    }
}

/// Isolated-world execution context ids by frame id, shared by every
/// listing of the page's frames.
#[derive(Debug, Default)]
pub(crate) struct WorldCache {
    contexts: Mutex<HashMap<String, i64>>,
}

impl WorldCache {
    fn get(&self, frame_id: &str) -> Option<i64> {
        self.contexts.lock().get(frame_id).copied()
    }

    fn insert(&self, frame_id: &str, context_id: i64) {
        self.contexts.lock().insert(frame_id.to_string(), context_id);
    }

    fn forget(&self, frame_id: &str) {
        self.contexts.lock().remove(frame_id);
    }

    /// Drop entries for frames missing from `live`.
    pub(crate) fn retain(&self, live: &[FrameInfo]) {
        self.contexts
            .lock()
            .retain(|id, _| live.iter().any(|f| &f.id == id));
    }

    pub(crate) fn len(&self) -> usize {
        self.contexts.lock().len()
    }
}

/// A frame of the attached page. Element handles are Runtime object ids.
pub struct CdpFrame {
    transport: Arc<dyn CdpTransport>,
    info: FrameInfo,
    /// Frame tree snapshot taken when this frame was listed.
    tree: Arc<Vec<FrameInfo>>,
    worlds: Arc<WorldCache>,
}

impl CdpFrame {
    pub(crate) fn new(
        transport: Arc<dyn CdpTransport>,
        info: FrameInfo,
        tree: Arc<Vec<FrameInfo>>,
        worlds: Arc<WorldCache>,
    ) -> Self {
        Self {
            transport,
            info,
            tree,
            worlds,
        }
    }

    pub fn frame_id(&self) -> &str {
        &self.info.id
    }

    pub fn origin(&self) -> String {
        frame_origin(&self.info)
    }

    /// Another frame from the same snapshot, if this frame's origin may reach it.
    fn reach(&self, info: &FrameInfo, what: &str) -> Result<Arc<dyn FrameDocument>, HostError> {
        let theirs = frame_origin(info);
        if theirs != self.origin() {
            return Err(HostError::CrossOrigin(format!("{} ({})", what, theirs)));
        }
        Ok(Arc::new(CdpFrame::new(
            self.transport.clone(),
            info.clone(),
            self.tree.clone(),
            self.worlds.clone(),
        )))
    }

    async fn context_id(&self) -> Result<i64, CdpError> {
        if let Some(id) = self.worlds.get(&self.info.id) {
            return Ok(id);
        }
        let result = self
            .transport
            .call(
                "Page.createIsolatedWorld",
                Some(json!({
                    "frameId": self.info.id,
                    "worldName": WORLD_NAME,
                })),
            )
            .await?;
        trace!("Isolated world for frame {}: {}", self.info.id, result);
        let id = result["executionContextId"]
            .as_i64()
            .ok_or_else(|| CdpError::InvalidResponse("Missing executionContextId".to_string()))?;
        self.worlds.insert(&self.info.id, id);
        Ok(id)
    }

    async fn evaluate(&self, expression: &str, by_value: bool) -> Result<RemoteObject, CdpError> {
        let context_id = self.context_id().await?;
        let result = self
            .transport
            .call(
                "Runtime.evaluate",
                Some(json!({
                    "expression": expression,
                    "contextId": context_id,
                    "returnByValue": by_value,
                    "objectGroup": OBJECT_GROUP,
                })),
            )
            .await;
        match result {
            Ok(result) => remote_result(result),
            Err(e) => {
                // A navigation destroys the world; the next call creates a new one.
                if is_stale_context(&e) {
                    self.worlds.forget(&self.info.id);
                }
                Err(e)
            }
        }
    }

    async fn evaluate_value(&self, expression: &str) -> Result<Value, CdpError> {
        Ok(self.evaluate(expression, true).await?.value.unwrap_or(Value::Null))
    }

    async fn call_on(
        &self,
        element: &ElementHandle,
        function: &str,
        args: Vec<Value>,
        by_value: bool,
    ) -> Result<RemoteObject, CdpError> {
        let arguments: Vec<Value> = args.into_iter().map(|v| json!({ "value": v })).collect();
        let result = self
            .transport
            .call(
                "Runtime.callFunctionOn",
                Some(json!({
                    "objectId": element.as_str(),
                    "functionDeclaration": function,
                    "arguments": arguments,
                    "returnByValue": by_value,
                    "objectGroup": OBJECT_GROUP,
                })),
            )
            .await?;
        remote_result(result)
    }

    async fn call_value(
        &self,
        element: &ElementHandle,
        function: &str,
        args: Vec<Value>,
    ) -> Result<Value, CdpError> {
        Ok(self
            .call_on(element, function, args, true)
            .await?
            .value
            .unwrap_or(Value::Null))
    }

    /// Element handles held by a remote array, in index order.
    async fn array_elements(&self, array: RemoteObject) -> Result<Vec<ElementHandle>, CdpError> {
        let Some(array_id) = array.object_id else {
            return Ok(Vec::new());
        };
        let result = self
            .transport
            .call(
                "Runtime.getProperties",
                Some(json!({ "objectId": array_id, "ownProperties": true })),
            )
            .await?;
        let properties: Vec<PropertyDescriptor> = serde_json::from_value(result["result"].clone())?;

        let mut indexed: Vec<(usize, ElementHandle)> = properties
            .into_iter()
            .filter_map(|p| {
                let index = p.name.parse::<usize>().ok()?;
                let id = p.value?.object_id?;
                Some((index, ElementHandle::new(id)))
            })
            .collect();
        indexed.sort_by_key(|(index, _)| *index);

        let _ = self
            .transport
            .call("Runtime.releaseObject", Some(json!({ "objectId": array_id })))
            .await;
        Ok(indexed.into_iter().map(|(_, handle)| handle).collect())
    }
}

/// Unwrap a `Runtime.evaluate`/`callFunctionOn` reply, surfacing thrown exceptions.
fn remote_result(result: Value) -> Result<RemoteObject, CdpError> {
    if let Some(exception) = result.get("exceptionDetails") {
        let details: ExceptionDetails = serde_json::from_value(exception.clone())?;
        return Err(CdpError::JavaScript(details.message()));
    }
    Ok(serde_json::from_value(result["result"].clone())?)
}

fn is_stale_context(err: &CdpError) -> bool {
    matches!(err, CdpError::Protocol { message, .. } if message.contains("Cannot find context"))
}

fn element_of(object: RemoteObject) -> Option<ElementHandle> {
    if object.is_nullish() {
        return None;
    }
    object.object_id.map(ElementHandle::new)
}

fn js_string(s: &str) -> String {
    Value::String(s.to_string()).to_string()
}

#[async_trait]
impl FrameDocument for CdpFrame {
    fn url(&self) -> &str {
        &self.info.url
    }

    fn is_top(&self) -> bool {
        self.info.is_top()
    }

    async fn query(
        &self,
        scope: Option<&ElementHandle>,
        selector: &str,
    ) -> Result<Option<ElementHandle>, HostError> {
        let object = match scope {
            Some(el) => {
                self.call_on(
                    el,
                    "function(s) { return this.querySelector(s); }",
                    vec![json!(selector)],
                    false,
                )
                .await?
            }
            None => {
                self.evaluate(&format!("document.querySelector({})", js_string(selector)), false)
                    .await?
            }
        };
        Ok(element_of(object))
    }

    async fn query_all(
        &self,
        scope: Option<&ElementHandle>,
        selector: &str,
    ) -> Result<Vec<ElementHandle>, HostError> {
        let array = match scope {
            Some(el) => {
                self.call_on(
                    el,
                    "function(s) { return Array.from(this.querySelectorAll(s)); }",
                    vec![json!(selector)],
                    false,
                )
                .await?
            }
            None => {
                self.evaluate(
                    &format!("Array.from(document.querySelectorAll({}))", js_string(selector)),
                    false,
                )
                .await?
            }
        };
        Ok(self.array_elements(array).await?)
    }

    async fn parent(&self, element: &ElementHandle) -> Result<Option<ElementHandle>, HostError> {
        let object = self
            .call_on(element, "function() { return this.parentElement; }", vec![], false)
            .await?;
        Ok(element_of(object))
    }

    async fn text(&self, element: &ElementHandle) -> Result<String, HostError> {
        let value = self
            .call_value(
                element,
                "function() { return (this.textContent || '').trim(); }",
                vec![],
            )
            .await?;
        Ok(value.as_str().unwrap_or_default().to_string())
    }

    async fn bounding_rect(&self, element: &ElementHandle) -> Result<Rect, HostError> {
        let value = self
            .call_value(
                element,
                "function() { const r = this.getBoundingClientRect(); \
                 return { x: r.left, y: r.top, width: r.width, height: r.height }; }",
                vec![],
            )
            .await?;
        let rect: Rect = serde_json::from_value(value).map_err(CdpError::from)?;
        Ok(Rect::new(rect.x, rect.y, rect.width, rect.height))
    }

    async fn scroll_metrics(&self, element: &ElementHandle) -> Result<ScrollMetrics, HostError> {
        let value = self
            .call_value(
                element,
                "function() { return { scroll_top: this.scrollTop, \
                 scroll_height: this.scrollHeight, client_height: this.clientHeight }; }",
                vec![],
            )
            .await?;
        Ok(serde_json::from_value(value).map_err(CdpError::from)?)
    }

    async fn set_scroll_top(&self, element: &ElementHandle, value: f64) -> Result<(), HostError> {
        self.call_on(element, "function(v) { this.scrollTop = v; }", vec![json!(value)], true)
            .await?;
        Ok(())
    }

    async fn numeric_property(
        &self,
        element: &ElementHandle,
        name: &str,
    ) -> Result<Option<f64>, HostError> {
        let value = self
            .call_value(
                element,
                "function(n) { const v = this[n]; return typeof v === 'number' ? v : null; }",
                vec![json!(name)],
            )
            .await?;
        Ok(value.as_f64())
    }

    async fn is_disabled(&self, element: &ElementHandle) -> Result<bool, HostError> {
        let value = self
            .call_value(
                element,
                "function() { return !!this.disabled || this.classList.contains('disabled'); }",
                vec![],
            )
            .await?;
        Ok(value.as_bool().unwrap_or(false))
    }

    async fn click(&self, element: &ElementHandle) -> Result<(), HostError> {
        self.call_on(element, "function() { this.click(); }", vec![], true)
            .await?;
        Ok(())
    }

    async fn press_escape(&self) -> Result<(), HostError> {
        for event in [KeyEventType::KeyDown, KeyEventType::KeyUp] {
            self.transport
                .call(
                    "Input.dispatchKeyEvent",
                    Some(json!({
                        "type": event,
                        "key": "Escape",
                        "code": "Escape",
                        "windowsVirtualKeyCode": 27,
                    })),
                )
                .await?;
        }
        Ok(())
    }

    async fn viewport(&self) -> Result<ViewportSize, HostError> {
        let value = self
            .evaluate_value("({ width: window.innerWidth, height: window.innerHeight })")
            .await?;
        Ok(serde_json::from_value(value).map_err(CdpError::from)?)
    }

    async fn scroll_window_to(&self, x: f64, y: f64) -> Result<(), HostError> {
        self.evaluate_value(&format!("window.scrollTo({}, {})", x, y))
            .await?;
        Ok(())
    }

    async fn body_text(&self) -> Result<String, HostError> {
        let value = self
            .evaluate_value("document.body ? document.body.innerText : ''")
            .await?;
        Ok(value.as_str().unwrap_or_default().to_string())
    }

    async fn top_document(&self) -> Result<Arc<dyn FrameDocument>, HostError> {
        let top = self
            .tree
            .iter()
            .find(|f| f.is_top())
            .ok_or_else(|| HostError::FrameDetached("top frame missing from tree".to_string()))?;
        self.reach(top, "top document")
    }

    async fn child_frame(&self, iframe: &ElementHandle) -> Result<Arc<dyn FrameDocument>, HostError> {
        let result = self
            .transport
            .call("DOM.describeNode", Some(json!({ "objectId": iframe.as_str() })))
            .await?;
        let node: DomNode = serde_json::from_value(result["node"].clone()).map_err(CdpError::from)?;
        let frame_id = node
            .frame_id
            .ok_or_else(|| HostError::Script(format!("<{}> hosts no frame", node.node_name.to_lowercase())))?;

        match self.tree.iter().find(|f| f.id == frame_id) {
            Some(child) => self.reach(child, "child frame"),
            // Out-of-process iframes are site-isolated and never share our origin.
            None => Err(HostError::CrossOrigin(format!("child frame {}", frame_id))),
        }
    }
}

#[cfg(test)]
#[path = "frame_tests.rs"]
mod tests;
