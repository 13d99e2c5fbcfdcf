//! Scripted transport for host and frame tests.

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{Value, json};

use crate::cdp::{CdpError, CdpTransport};
use crate::cdp::protocol::FrameInfo;

type Handler = Box<dyn Fn(&str, &Value) -> Result<Value, CdpError> + Send + Sync>;

pub(crate) struct ScriptedTransport {
    handler: Handler,
    calls: Mutex<Vec<(String, Value)>>,
}

impl ScriptedTransport {
    pub(crate) fn new(
        handler: impl Fn(&str, &Value) -> Result<Value, CdpError> + Send + Sync + 'static,
    ) -> Arc<Self> {
        Arc::new(Self {
            handler: Box::new(handler),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub(crate) fn calls_to(&self, method: &str) -> Vec<Value> {
        self.calls
            .lock()
            .iter()
            .filter(|(m, _)| m == method)
            .map(|(_, p)| p.clone())
            .collect()
    }

    fn dispatch(&self, method: &str, params: Option<Value>) -> Result<Value, CdpError> {
        let params = params.unwrap_or(Value::Null);
        self.calls.lock().push((method.to_string(), params.clone()));
        (self.handler)(method, &params)
    }
}

#[async_trait]
impl CdpTransport for ScriptedTransport {
    fn target_id(&self) -> &str {
        "TARGET-1"
    }

    async fn call(&self, method: &str, params: Option<Value>) -> Result<Value, CdpError> {
        self.dispatch(method, params)
    }

    async fn call_browser(&self, method: &str, params: Option<Value>) -> Result<Value, CdpError> {
        self.dispatch(method, params)
    }
}

/// Recruiting tab with a same-origin recommend frame, a nested resume frame
/// and a third-party ad frame.
pub(crate) fn frame_tree() -> Value {
    json!({
        "frameTree": {
            "frame": {"id": "top", "url": "https://www.zhipin.com/web/chat/recommend", "securityOrigin": "https://www.zhipin.com"},
            "childFrames": [
                {
                    "frame": {"id": "recommend", "parentId": "top", "url": "https://www.zhipin.com/web/frame/recommend/", "securityOrigin": "https://www.zhipin.com"},
                    "childFrames": [
                        {"frame": {"id": "resume", "parentId": "recommend", "url": "https://www.zhipin.com/web/frame/c-resume/"}}
                    ]
                },
                {"frame": {"id": "ads", "parentId": "top", "url": "https://ads.example.net/slot", "securityOrigin": "https://ads.example.net"}}
            ]
        }
    })
}

pub(crate) fn frame_infos() -> Vec<FrameInfo> {
    let tree: crate::cdp::protocol::FrameTree =
        serde_json::from_value(frame_tree()["frameTree"].clone()).unwrap();
    tree.flatten()
}

pub(crate) fn node(object_id: &str) -> Value {
    json!({"result": {"type": "object", "subtype": "node", "className": "HTMLDivElement", "objectId": object_id}})
}

pub(crate) fn by_value(value: Value) -> Value {
    json!({"result": {"type": "object", "value": value}})
}
