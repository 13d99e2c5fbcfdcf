use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};

use super::*;
use crate::testing::{ScriptedTransport, by_value, frame_tree};

fn host(transport: Arc<ScriptedTransport>) -> CdpHost {
    CdpHost::with_transport(transport)
}

fn tab(method: &str, _: &serde_json::Value) -> Result<serde_json::Value, CdpError> {
    match method {
        "Page.getFrameTree" => Ok(frame_tree()),
        "Browser.getWindowForTarget" => Ok(json!({"windowId": 17, "bounds": {}})),
        "Page.captureScreenshot" => Ok(json!({"data": "iVBORw0KGgo="})),
        _ => Ok(json!({})),
    }
}

#[tokio::test]
async fn test_frames_listed_top_first() {
    let host = host(ScriptedTransport::new(tab));

    let frames = host.frames().await.unwrap();

    assert_eq!(frames.len(), 4);
    assert!(frames[0].is_top());
    assert!(frames[1..].iter().all(|f| !f.is_top()));
    assert_eq!(frames[2].url(), "https://www.zhipin.com/web/frame/c-resume/");
}

#[tokio::test]
async fn test_active_window_uses_attached_target() {
    let transport = ScriptedTransport::new(tab);
    let host = host(transport.clone());

    assert_eq!(host.active_window().await.unwrap(), 17);
    assert_eq!(
        transport.calls_to("Browser.getWindowForTarget")[0]["targetId"],
        "TARGET-1"
    );
}

#[tokio::test]
async fn test_capture_returns_png_data_url() {
    let transport = ScriptedTransport::new(tab);
    let host = host(transport.clone());

    let url = host.capture_visible_tab(CaptureTarget::CurrentWindow).await.unwrap();
    assert_eq!(url, "data:image/png;base64,iVBORw0KGgo=");

    let params = &transport.calls_to("Page.captureScreenshot")[0];
    assert_eq!(params["format"], "png");
    assert_eq!(params["captureBeyondViewport"], false);

    assert!(host.capture_visible_tab(CaptureTarget::Window(17)).await.is_ok());
}

#[tokio::test]
async fn test_capture_rejects_foreign_window() {
    let transport = ScriptedTransport::new(tab);
    let host = host(transport.clone());

    let err = host.capture_visible_tab(CaptureTarget::Window(3)).await.unwrap_err();
    assert!(matches!(err, HostError::Capture(_)));
    assert!(transport.calls_to("Page.captureScreenshot").is_empty());
}

#[tokio::test]
async fn test_capture_failure_is_capture_error() {
    let host = host(ScriptedTransport::new(|_, _| {
        Err(CdpError::Timeout {
            method: "Page.captureScreenshot".to_string(),
            ms: 30_000,
        })
    }));

    let err = host.capture_visible_tab(CaptureTarget::CurrentWindow).await.unwrap_err();
    assert!(matches!(err, HostError::Capture(_)));
}

#[tokio::test]
async fn test_release_handles_releases_object_group() {
    let transport = ScriptedTransport::new(tab);
    let host = host(transport.clone());

    host.release_handles().await.unwrap();
    assert_eq!(
        transport.calls_to("Runtime.releaseObjectGroup")[0]["objectGroup"],
        "greetbot"
    );
}

/// Tab whose worlds get increasing context ids, starting at 42.
fn tab_with_worlds(
    next_context: Arc<AtomicI64>,
) -> impl Fn(&str, &serde_json::Value) -> Result<serde_json::Value, CdpError> + Send + Sync + 'static {
    move |method, params| match method {
        "Page.createIsolatedWorld" => Ok(json!({
            "executionContextId": next_context.fetch_add(1, Ordering::SeqCst)
        })),
        "Runtime.evaluate" => Ok(by_value(json!("推荐牛人"))),
        other => tab(other, params),
    }
}

#[tokio::test]
async fn test_isolated_world_reused_across_frame_listings() {
    let transport = ScriptedTransport::new(tab_with_worlds(Arc::new(AtomicI64::new(42))));
    let host = host(transport.clone());

    for _ in 0..3 {
        let frames = host.frames().await.unwrap();
        assert_eq!(frames[1].body_text().await.unwrap(), "推荐牛人");
    }

    let worlds = transport.calls_to("Page.createIsolatedWorld");
    assert_eq!(worlds.len(), 1);
    assert_eq!(worlds[0]["frameId"], "recommend");
    assert!(transport.calls_to("Runtime.evaluate").iter().all(|p| p["contextId"] == 42));
    assert_eq!(host.cached_worlds(), 1);
}

#[tokio::test]
async fn test_destroyed_world_is_recreated() {
    let worlds = tab_with_worlds(Arc::new(AtomicI64::new(42)));
    let transport = ScriptedTransport::new(move |method, params| {
        if method == "Runtime.evaluate" && params["contextId"] == 42 {
            return Err(CdpError::Protocol {
                code: -32000,
                message: "Cannot find context with specified id".to_string(),
            });
        }
        worlds(method, params)
    });
    let host = host(transport.clone());

    let frames = host.frames().await.unwrap();
    let err = frames[0].body_text().await.unwrap_err();
    assert!(matches!(err, HostError::FrameDetached(_)));
    assert_eq!(host.cached_worlds(), 0);

    let frames = host.frames().await.unwrap();
    assert_eq!(frames[0].body_text().await.unwrap(), "推荐牛人");
    assert_eq!(transport.calls_to("Page.createIsolatedWorld").len(), 2);
}

#[tokio::test]
async fn test_worlds_of_removed_frames_are_dropped() {
    let navigated = Arc::new(AtomicBool::new(false));
    let worlds = tab_with_worlds(Arc::new(AtomicI64::new(1)));
    let flag = navigated.clone();
    let transport = ScriptedTransport::new(move |method, params| {
        if method == "Page.getFrameTree" && flag.load(Ordering::SeqCst) {
            return Ok(json!({"frameTree": {
                "frame": {"id": "top", "url": "https://www.zhipin.com/web/chat/index", "securityOrigin": "https://www.zhipin.com"}
            }}));
        }
        worlds(method, params)
    });
    let host = host(transport);

    let frames = host.frames().await.unwrap();
    frames[0].body_text().await.unwrap();
    frames[1].body_text().await.unwrap();
    assert_eq!(host.cached_worlds(), 2);

    navigated.store(true, Ordering::SeqCst);
    assert_eq!(host.frames().await.unwrap().len(), 1);
    assert_eq!(host.cached_worlds(), 1);
}
