//! Region capture and page selector configuration.

use serde::{Deserialize, Serialize};

/// Capture pipeline configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptureConfig {
    /// Safety ceiling on the requested region height, in CSS pixels.
    #[serde(default = "default_max_height")]
    pub max_height: f64,

    /// Reference viewport used when the querying frame reported none.
    #[serde(default = "default_fallback_viewport_width")]
    pub fallback_viewport_width: f64,

    #[serde(default = "default_fallback_viewport_height")]
    pub fallback_viewport_height: f64,

    /// Chunk size for base64 encoding; must be a multiple of 3.
    #[serde(default = "default_base64_chunk_bytes")]
    pub base64_chunk_bytes: usize,

    /// Settle after forcing a lazy container to its bottom.
    #[serde(default = "default_scroll_settle_ms")]
    pub scroll_settle_ms: u64,

    /// Confirmatory settle after the second forced scroll.
    #[serde(default = "default_confirm_settle_ms")]
    pub confirm_settle_ms: u64,

    /// Settle after scrolling the window to bring the region into view.
    #[serde(default = "default_window_scroll_settle_ms")]
    pub window_scroll_settle_ms: u64,

    /// Timeout for waiting on an element to appear.
    #[serde(default = "default_wait_timeout_ms")]
    pub wait_timeout_ms: u64,

    /// Minimum region side, in CSS pixels.
    #[serde(default = "default_min_region_size")]
    pub min_region_size: f64,

    /// URL fragment identifying the embedded resume frame.
    #[serde(default = "default_resume_frame_marker")]
    pub resume_frame_marker: String,

    #[serde(default)]
    pub arbiter: ArbiterConfig,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            max_height: default_max_height(),
            fallback_viewport_width: default_fallback_viewport_width(),
            fallback_viewport_height: default_fallback_viewport_height(),
            base64_chunk_bytes: default_base64_chunk_bytes(),
            scroll_settle_ms: default_scroll_settle_ms(),
            confirm_settle_ms: default_confirm_settle_ms(),
            window_scroll_settle_ms: default_window_scroll_settle_ms(),
            wait_timeout_ms: default_wait_timeout_ms(),
            min_region_size: default_min_region_size(),
            resume_frame_marker: default_resume_frame_marker(),
            arbiter: ArbiterConfig::default(),
        }
    }
}

fn default_max_height() -> f64 {
    10_000.0
}

fn default_fallback_viewport_width() -> f64 {
    945.0
}

fn default_fallback_viewport_height() -> f64 {
    817.0
}

fn default_base64_chunk_bytes() -> usize {
    8190
}

fn default_scroll_settle_ms() -> u64 {
    1500
}

fn default_confirm_settle_ms() -> u64 {
    500
}

fn default_window_scroll_settle_ms() -> u64 {
    300
}

fn default_wait_timeout_ms() -> u64 {
    10_000
}

fn default_min_region_size() -> f64 {
    100.0
}

fn default_resume_frame_marker() -> String {
    "/c-resume/".to_string()
}

/// Positional thresholds used to classify per-frame rects.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ArbiterConfig {
    /// Rects whose x-origin exceeds this come from the host frame.
    #[serde(default = "default_host_min_x")]
    pub host_min_x: f64,

    /// Rects at x = 0 no wider than this come from a nested frame.
    #[serde(default = "default_nested_max_width")]
    pub nested_max_width: f64,
}

impl Default for ArbiterConfig {
    fn default() -> Self {
        Self {
            host_min_x: default_host_min_x(),
            nested_max_width: default_nested_max_width(),
        }
    }
}

fn default_host_min_x() -> f64 {
    100.0
}

fn default_nested_max_width() -> f64 {
    650.0
}

/// CSS selectors for the recruiting page. Lists are tried in order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectorConfig {
    pub card_list: Vec<String>,
    pub card_name: String,
    pub card_base_info: String,
    pub card_click_target: String,

    pub detail_dialog: String,
    pub sidebar: Vec<String>,
    pub layout_wrap: String,
    pub middle_wrap: String,
    pub left_area: Vec<String>,
    pub resume_iframe: String,
    pub iframe_canvas: String,
    pub resume_canvas: Vec<String>,
    pub dialog_content: String,

    pub greet_button: Vec<String>,
    pub continue_button: String,
    pub greet_text: String,
    pub continue_text: String,
    pub close_button: Vec<String>,

    pub captcha: Vec<String>,
    pub captcha_texts: Vec<String>,
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            card_list: strings(&["ul.card-list li.card-item", "li.card-item", "#recommend-list li"]),
            card_name: ".name".to_string(),
            card_base_info: ".base-info".to_string(),
            card_click_target: ".card-inner".to_string(),

            detail_dialog: r#"[class*="dialog-lib-resume"]"#.to_string(),
            sidebar: strings(&[
                "#wrap > div.side-wrap.side-wrap-v2",
                "div.side-wrap.side-wrap-v2",
                ".side-wrap-v2",
                ".side-wrap",
                "#wrap div.side-wrap",
                "body > div.side-wrap",
            ]),
            layout_wrap: ".resume-layout-wrap".to_string(),
            middle_wrap: ".resume-middle-wrap".to_string(),
            left_area: strings(&[".resume-left-side", r#"[class*="left"]"#, r#"[class*="left-side"]"#]),
            resume_iframe: r#"iframe[src*="c-resume"]"#.to_string(),
            iframe_canvas: "#resume".to_string(),
            resume_canvas: strings(&["canvas#resume", "canvas", "#resume"]),
            dialog_content: ".boss-popup__content".to_string(),

            greet_button: strings(&[
                "button.btn-greet",
                "button.btn-sure-v2.btn-greet",
                "button.btn-v2.btn-sure-v2.btn-greet",
            ]),
            continue_button: "button.btn-outline-v2".to_string(),
            greet_text: "打招呼".to_string(),
            continue_text: "继续沟通".to_string(),
            close_button: strings(&[".boss-popup__close .icon-close", ".icon-close"]),

            captcha: strings(&[r#"[class*="captcha"]"#, "#captcha-container"]),
            captcha_texts: strings(&["请完成验证", "安全验证", "滑动验证"]),
        }
    }
}
