use super::*;
use crate::testing::{ScriptedTransport, by_value, frame_infos, node};

fn frame(transport: Arc<ScriptedTransport>, id: &str) -> CdpFrame {
    let tree = Arc::new(frame_infos());
    let info = tree.iter().find(|f| f.id == id).unwrap().clone();
    CdpFrame::new(transport, info, tree, Arc::default())
}

fn world(method: &str) -> Option<Value> {
    (method == "Page.createIsolatedWorld").then(|| json!({"executionContextId": 42}))
}

#[tokio::test]
async fn test_query_creates_isolated_world_once() {
    let transport = ScriptedTransport::new(|method, _| match world(method) {
        Some(reply) => Ok(reply),
        None => Ok(node("card-list")),
    });
    let frame = frame(transport.clone(), "recommend");

    let first = frame.query(None, ".card-list").await.unwrap();
    let second = frame.query(None, "#container").await.unwrap();

    assert_eq!(first, Some(ElementHandle::new("card-list")));
    assert!(second.is_some());
    assert_eq!(transport.calls_to("Page.createIsolatedWorld").len(), 1);
    let evaluations = transport.calls_to("Runtime.evaluate");
    assert_eq!(evaluations[0]["contextId"], 42);
    assert_eq!(evaluations[0]["expression"], "document.querySelector(\".card-list\")");
    assert_eq!(evaluations[1]["expression"], "document.querySelector(\"#container\")");
}

#[tokio::test]
async fn test_query_null_result_is_none() {
    let transport = ScriptedTransport::new(|method, _| match world(method) {
        Some(reply) => Ok(reply),
        None => Ok(json!({"result": {"type": "object", "subtype": "null", "value": null}})),
    });
    let frame = frame(transport, "recommend");
    assert_eq!(frame.query(None, ".missing").await.unwrap(), None);
}

#[tokio::test]
async fn test_scoped_query_runs_on_scope_element() {
    let transport = ScriptedTransport::new(|_, _| Ok(node("btn-greet")));
    let frame = frame(transport.clone(), "recommend");
    let scope = ElementHandle::new("card-3");

    let found = frame.query(Some(&scope), "button.btn-greet").await.unwrap();

    assert_eq!(found, Some(ElementHandle::new("btn-greet")));
    let call = &transport.calls_to("Runtime.callFunctionOn")[0];
    assert_eq!(call["objectId"], "card-3");
    assert_eq!(call["arguments"][0]["value"], "button.btn-greet");
    assert_eq!(call["returnByValue"], false);
    assert!(transport.calls_to("Page.createIsolatedWorld").is_empty());
}

#[tokio::test]
async fn test_query_all_orders_elements_by_index() {
    let transport = ScriptedTransport::new(|method, _| match method {
        "Page.createIsolatedWorld" => Ok(json!({"executionContextId": 7})),
        "Runtime.evaluate" => Ok(json!({"result": {"type": "object", "subtype": "array", "objectId": "arr"}})),
        "Runtime.getProperties" => Ok(json!({"result": [
            {"name": "1", "value": {"type": "object", "subtype": "node", "objectId": "card-b"}},
            {"name": "length", "value": {"type": "number", "value": 2}},
            {"name": "0", "value": {"type": "object", "subtype": "node", "objectId": "card-a"}},
            {"name": "__proto__", "value": {"type": "object", "objectId": "proto"}}
        ]})),
        _ => Ok(json!({})),
    });
    let frame = frame(transport.clone(), "recommend");

    let cards = frame.query_all(None, ".candidate-card-wrap").await.unwrap();

    assert_eq!(cards, vec![ElementHandle::new("card-a"), ElementHandle::new("card-b")]);
    assert_eq!(transport.calls_to("Runtime.releaseObject")[0]["objectId"], "arr");
}

#[tokio::test]
async fn test_geometry_reads() {
    let transport = ScriptedTransport::new(|_, params| {
        let function = params["functionDeclaration"].as_str().unwrap_or_default();
        if function.contains("getBoundingClientRect") {
            Ok(by_value(json!({"x": 600.5, "y": 60.0, "width": 420.0, "height": -3.0})))
        } else if function.contains("scrollHeight") {
            Ok(by_value(json!({"scroll_top": 0.0, "scroll_height": 2400.0, "client_height": 700.0})))
        } else {
            Ok(by_value(json!(null)))
        }
    });
    let frame = frame(transport, "recommend");
    let el = ElementHandle::new("dialog");

    let rect = frame.bounding_rect(&el).await.unwrap();
    assert_eq!(rect, Rect::new(600.5, 60.0, 420.0, 0.0));

    let metrics = frame.scroll_metrics(&el).await.unwrap();
    assert_eq!(metrics.scroll_height, 2400.0);
    assert_eq!(metrics.client_height, 700.0);

    assert_eq!(frame.numeric_property(&el, "height").await.unwrap(), None);
}

#[tokio::test]
async fn test_script_exception_maps_to_script_error() {
    let transport = ScriptedTransport::new(|_, _| {
        Ok(json!({
            "result": {"type": "object", "subtype": "error"},
            "exceptionDetails": {
                "exceptionId": 1, "text": "Uncaught", "lineNumber": 0, "columnNumber": 0,
                "exception": {"type": "object", "subtype": "error", "description": "TypeError: this.click is not a function"}
            }
        }))
    });
    let frame = frame(transport, "recommend");

    let err = frame.click(&ElementHandle::new("text-node")).await.unwrap_err();
    assert!(matches!(err, HostError::Script(ref m) if m.contains("this.click")));
}

#[tokio::test]
async fn test_released_handle_is_stale() {
    let transport = ScriptedTransport::new(|_, _| {
        Err(CdpError::Protocol {
            code: -32000,
            message: "Could not find object with given id".to_string(),
        })
    });
    let frame = frame(transport, "recommend");

    let err = frame.text(&ElementHandle::new("gone")).await.unwrap_err();
    assert!(matches!(err, HostError::StaleElement(_)));
}

#[tokio::test]
async fn test_top_document_respects_origin() {
    let transport = ScriptedTransport::new(|_, _| Ok(json!({})));

    let same = frame(transport.clone(), "resume");
    let top = same.top_document().await.unwrap();
    assert!(top.is_top());
    assert_eq!(top.url(), "https://www.zhipin.com/web/chat/recommend");

    let foreign = frame(transport, "ads");
    let err = foreign.top_document().await.err().unwrap();
    assert!(err.is_cross_origin());
}

#[tokio::test]
async fn test_child_frame_resolution() {
    let transport = ScriptedTransport::new(|_, params| match params["objectId"].as_str() {
        Some("resume-iframe") => Ok(json!({"node": {"nodeName": "IFRAME", "frameId": "resume"}})),
        Some("ads-iframe") => Ok(json!({"node": {"nodeName": "IFRAME", "frameId": "ads"}})),
        Some("oopif") => Ok(json!({"node": {"nodeName": "IFRAME", "frameId": "remote-42"}})),
        _ => Ok(json!({"node": {"nodeName": "DIV"}})),
    });
    let frame = frame(transport, "recommend");

    let child = frame.child_frame(&ElementHandle::new("resume-iframe")).await.unwrap();
    assert_eq!(child.url(), "https://www.zhipin.com/web/frame/c-resume/");
    assert!(!child.is_top());

    let ads = frame.child_frame(&ElementHandle::new("ads-iframe")).await.err().unwrap();
    assert!(ads.is_cross_origin());

    let remote = frame.child_frame(&ElementHandle::new("oopif")).await.err().unwrap();
    assert!(remote.is_cross_origin());

    let not_iframe = frame.child_frame(&ElementHandle::new("div")).await.err().unwrap();
    assert!(matches!(not_iframe, HostError::Script(_)));
}

#[tokio::test]
async fn test_press_escape_sends_key_down_and_up() {
    let transport = ScriptedTransport::new(|_, _| Ok(json!({})));
    let frame = frame(transport.clone(), "recommend");

    frame.press_escape().await.unwrap();

    let events = transport.calls_to("Input.dispatchKeyEvent");
    assert_eq!(events.len(), 2);
    assert_eq!(events[0]["type"], "keyDown");
    assert_eq!(events[1]["type"], "keyUp");
    assert_eq!(events[0]["windowsVirtualKeyCode"], 27);
}

#[tokio::test]
async fn test_window_reads() {
    let transport = ScriptedTransport::new(|method, params| match world(method) {
        Some(reply) => Ok(reply),
        None if params["expression"].as_str().unwrap_or_default().contains("innerWidth") => {
            Ok(by_value(json!({"width": 1280.0, "height": 720.0})))
        }
        None => Ok(by_value(json!("张三 28岁 本科"))),
    });
    let frame = frame(transport, "top");

    assert_eq!(frame.viewport().await.unwrap(), ViewportSize::new(1280.0, 720.0));
    assert_eq!(frame.body_text().await.unwrap(), "张三 28岁 本科");
}

#[test]
fn test_frame_origin_falls_back_to_url() {
    let infos = frame_infos();
    let resume = infos.iter().find(|f| f.id == "resume").unwrap();
    assert_eq!(frame_origin(resume), "https://www.zhipin.com");

    let blank = FrameInfo {
        id: "b".to_string(),
        parent_id: Some("top".to_string()),
        url: "not a url".to_string(),
        security_origin: Some(String::new()),
    };
    assert_eq!(frame_origin(&blank), "not a url");
}
