//! In-memory browser host for tests.
//!
//! Frames hold a flat element table; selectors are registered explicitly per
//! scope instead of being matched, so a test states exactly which selector
//! finds which element.

use std::collections::{HashMap, VecDeque};
use std::io::Cursor;
use std::sync::Arc;

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use image::{ImageFormat, Rgba, RgbaImage};
use parking_lot::Mutex;

use greetbot_protocols::{
    BrowserHost, CaptureTarget, ElementHandle, FrameDocument, HostError, Rect, ScrollMetrics,
    ViewportSize,
};

/// A PNG data URL of the given size with a position-dependent pattern.
pub fn png_data_url(width: u32, height: u32) -> String {
    let img = RgbaImage::from_fn(width, height, |x, y| {
        Rgba([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8, 255])
    });
    let mut buf = Cursor::new(Vec::new());
    img.write_to(&mut buf, ImageFormat::Png)
        .expect("encode test png");
    format!("data:image/png;base64,{}", STANDARD.encode(buf.into_inner()))
}

#[derive(Debug, Clone, Default)]
pub struct FakeElement {
    pub rect: Rect,
    pub text: String,
    pub parent: Option<ElementHandle>,
    pub scroll: ScrollMetrics,
    pub props: HashMap<String, f64>,
    pub disabled: bool,
    /// Rect reported once the element has been scrolled to its bottom.
    pub loaded_rect: Option<Rect>,
}

impl FakeElement {
    pub fn new(rect: Rect) -> Self {
        Self {
            rect,
            ..Default::default()
        }
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn scroll(mut self, scroll_height: f64, client_height: f64) -> Self {
        self.scroll = ScrollMetrics {
            scroll_top: 0.0,
            scroll_height,
            client_height,
        };
        self
    }

    pub fn prop(mut self, name: &str, value: f64) -> Self {
        self.props.insert(name.to_string(), value);
        self
    }

    pub fn disabled(mut self) -> Self {
        self.disabled = true;
        self
    }

    pub fn loaded_rect(mut self, rect: Rect) -> Self {
        self.loaded_rect = Some(rect);
        self
    }
}

#[derive(Clone)]
enum Link {
    Frame(Arc<FakeFrame>),
    CrossOrigin,
}

#[derive(Default)]
struct FrameState {
    next_id: usize,
    elements: HashMap<ElementHandle, FakeElement>,
    index: HashMap<(Option<ElementHandle>, String), Vec<ElementHandle>>,
    top: Option<Link>,
    children: HashMap<ElementHandle, Link>,
    body_text: String,
    clicks: Vec<ElementHandle>,
    escapes: usize,
    window_scrolls: Vec<(f64, f64)>,
}

pub struct FakeFrame {
    url: String,
    is_top: bool,
    viewport: Option<ViewportSize>,
    state: Mutex<FrameState>,
}

impl FakeFrame {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            is_top: false,
            viewport: Some(ViewportSize::new(945.0, 817.0)),
            state: Mutex::new(FrameState::default()),
        }
    }

    pub fn top(url: impl Into<String>) -> Self {
        Self {
            is_top: true,
            ..Self::new(url)
        }
    }

    /// `None` makes `viewport()` fail, as a frame that cannot report one.
    pub fn with_viewport(mut self, viewport: Option<ViewportSize>) -> Self {
        self.viewport = viewport;
        self
    }

    /// Add an element findable by `selector` within `scope`.
    pub fn add(
        &self,
        scope: Option<&ElementHandle>,
        selector: &str,
        mut element: FakeElement,
    ) -> ElementHandle {
        let mut state = self.state.lock();
        state.next_id += 1;
        let handle = ElementHandle::new(format!("node-{}", state.next_id));
        if element.parent.is_none() {
            element.parent = scope.cloned();
        }
        state.elements.insert(handle.clone(), element);
        state
            .index
            .entry((scope.cloned(), selector.to_string()))
            .or_default()
            .push(handle.clone());
        handle
    }

    /// Make an existing element findable by another selector.
    pub fn alias(&self, scope: Option<&ElementHandle>, selector: &str, handle: &ElementHandle) {
        self.state
            .lock()
            .index
            .entry((scope.cloned(), selector.to_string()))
            .or_default()
            .push(handle.clone());
    }

    pub fn set_top(&self, top: Arc<FakeFrame>) {
        self.state.lock().top = Some(Link::Frame(top));
    }

    pub fn set_top_cross_origin(&self) {
        self.state.lock().top = Some(Link::CrossOrigin);
    }

    pub fn attach_child(&self, iframe: &ElementHandle, child: Arc<FakeFrame>) {
        self.state
            .lock()
            .children
            .insert(iframe.clone(), Link::Frame(child));
    }

    pub fn attach_cross_origin_child(&self, iframe: &ElementHandle) {
        self.state
            .lock()
            .children
            .insert(iframe.clone(), Link::CrossOrigin);
    }

    pub fn set_body_text(&self, text: impl Into<String>) {
        self.state.lock().body_text = text.into();
    }

    pub fn clicks(&self) -> Vec<ElementHandle> {
        self.state.lock().clicks.clone()
    }

    pub fn escapes(&self) -> usize {
        self.state.lock().escapes
    }

    pub fn window_scrolls(&self) -> Vec<(f64, f64)> {
        self.state.lock().window_scrolls.clone()
    }

    pub fn element(&self, handle: &ElementHandle) -> Option<FakeElement> {
        self.state.lock().elements.get(handle).cloned()
    }

    fn with_element<T>(
        &self,
        handle: &ElementHandle,
        f: impl FnOnce(&mut FakeElement) -> T,
    ) -> Result<T, HostError> {
        let mut state = self.state.lock();
        state
            .elements
            .get_mut(handle)
            .map(f)
            .ok_or_else(|| HostError::StaleElement(handle.0.clone()))
    }
}

fn link_to_frame(link: Option<Link>, what: &str) -> Result<Arc<dyn FrameDocument>, HostError> {
    match link {
        Some(Link::Frame(frame)) => Ok(frame as Arc<dyn FrameDocument>),
        Some(Link::CrossOrigin) => Err(HostError::CrossOrigin(what.to_string())),
        None => Err(HostError::FrameDetached(what.to_string())),
    }
}

#[async_trait]
impl FrameDocument for FakeFrame {
    fn url(&self) -> &str {
        &self.url
    }

    fn is_top(&self) -> bool {
        self.is_top
    }

    async fn query(
        &self,
        scope: Option<&ElementHandle>,
        selector: &str,
    ) -> Result<Option<ElementHandle>, HostError> {
        Ok(self.query_all(scope, selector).await?.into_iter().next())
    }

    async fn query_all(
        &self,
        scope: Option<&ElementHandle>,
        selector: &str,
    ) -> Result<Vec<ElementHandle>, HostError> {
        let state = self.state.lock();
        Ok(state
            .index
            .get(&(scope.cloned(), selector.to_string()))
            .cloned()
            .unwrap_or_default())
    }

    async fn parent(&self, element: &ElementHandle) -> Result<Option<ElementHandle>, HostError> {
        self.with_element(element, |e| e.parent.clone())
    }

    async fn text(&self, element: &ElementHandle) -> Result<String, HostError> {
        self.with_element(element, |e| e.text.trim().to_string())
    }

    async fn bounding_rect(&self, element: &ElementHandle) -> Result<Rect, HostError> {
        self.with_element(element, |e| e.rect)
    }

    async fn scroll_metrics(&self, element: &ElementHandle) -> Result<ScrollMetrics, HostError> {
        self.with_element(element, |e| e.scroll)
    }

    async fn set_scroll_top(&self, element: &ElementHandle, value: f64) -> Result<(), HostError> {
        let (at_bottom, loaded) = self.with_element(element, |e| {
            let max = (e.scroll.scroll_height - e.scroll.client_height).max(0.0);
            e.scroll.scroll_top = value.min(max);
            (e.scroll.scroll_top >= max, e.loaded_rect)
        })?;
        if at_bottom {
            // Lazy content shows up on the container's children once at the bottom.
            let mut state = self.state.lock();
            for el in state.elements.values_mut() {
                if el.parent.as_ref() == Some(element) {
                    if let Some(rect) = el.loaded_rect {
                        el.rect = rect;
                    }
                }
            }
            if let Some(rect) = loaded {
                if let Some(el) = state.elements.get_mut(element) {
                    el.rect = rect;
                }
            }
        }
        Ok(())
    }

    async fn numeric_property(
        &self,
        element: &ElementHandle,
        name: &str,
    ) -> Result<Option<f64>, HostError> {
        self.with_element(element, |e| e.props.get(name).copied())
    }

    async fn is_disabled(&self, element: &ElementHandle) -> Result<bool, HostError> {
        self.with_element(element, |e| e.disabled)
    }

    async fn click(&self, element: &ElementHandle) -> Result<(), HostError> {
        self.with_element(element, |_| ())?;
        self.state.lock().clicks.push(element.clone());
        Ok(())
    }

    async fn press_escape(&self) -> Result<(), HostError> {
        self.state.lock().escapes += 1;
        Ok(())
    }

    async fn viewport(&self) -> Result<ViewportSize, HostError> {
        self.viewport
            .ok_or_else(|| HostError::Script("innerWidth unavailable".to_string()))
    }

    async fn scroll_window_to(&self, x: f64, y: f64) -> Result<(), HostError> {
        self.state.lock().window_scrolls.push((x, y));
        Ok(())
    }

    async fn body_text(&self) -> Result<String, HostError> {
        Ok(self.state.lock().body_text.clone())
    }

    async fn top_document(&self) -> Result<Arc<dyn FrameDocument>, HostError> {
        let link = self.state.lock().top.clone();
        link_to_frame(link, &self.url)
    }

    async fn child_frame(&self, iframe: &ElementHandle) -> Result<Arc<dyn FrameDocument>, HostError> {
        let link = self.state.lock().children.get(iframe).cloned();
        link_to_frame(link, iframe.as_str())
    }
}

/// Host over a fixed set of fake frames with scripted capture outcomes.
pub struct FakeHost {
    frames: Vec<Arc<FakeFrame>>,
    window_id: u64,
    capture_results: Mutex<VecDeque<Result<String, HostError>>>,
    default_capture: Option<String>,
    capture_calls: Mutex<Vec<CaptureTarget>>,
    releases: Mutex<usize>,
}

impl FakeHost {
    pub fn new(frames: Vec<Arc<FakeFrame>>) -> Self {
        Self {
            frames,
            window_id: 1,
            capture_results: Mutex::new(VecDeque::new()),
            default_capture: None,
            capture_calls: Mutex::new(Vec::new()),
            releases: Mutex::new(0),
        }
    }

    /// Every capture returns this data URL unless a scripted result is queued.
    pub fn with_capture(mut self, data_url: String) -> Self {
        self.default_capture = Some(data_url);
        self
    }

    /// Queue one capture outcome, consumed in order.
    pub fn push_capture_result(&self, result: Result<String, HostError>) {
        self.capture_results.lock().push_back(result);
    }

    pub fn capture_calls(&self) -> Vec<CaptureTarget> {
        self.capture_calls.lock().clone()
    }

    /// Number of `release_handles` calls.
    pub fn releases(&self) -> usize {
        *self.releases.lock()
    }

    pub fn frame(&self, index: usize) -> Arc<FakeFrame> {
        Arc::clone(&self.frames[index])
    }
}

#[async_trait]
impl BrowserHost for FakeHost {
    async fn active_window(&self) -> Result<u64, HostError> {
        Ok(self.window_id)
    }

    async fn frames(&self) -> Result<Vec<Arc<dyn FrameDocument>>, HostError> {
        Ok(self
            .frames
            .iter()
            .map(|f| Arc::clone(f) as Arc<dyn FrameDocument>)
            .collect())
    }

    async fn capture_visible_tab(&self, target: CaptureTarget) -> Result<String, HostError> {
        self.capture_calls.lock().push(target);
        if let Some(result) = self.capture_results.lock().pop_front() {
            return result;
        }
        self.default_capture
            .clone()
            .ok_or_else(|| HostError::Capture("no capture configured".to_string()))
    }

    async fn release_handles(&self) -> Result<(), HostError> {
        *self.releases.lock() += 1;
        Ok(())
    }
}
