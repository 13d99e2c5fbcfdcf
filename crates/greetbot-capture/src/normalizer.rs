//! CSS pixel to device pixel conversion.
//!
//! The visible-tab capture is in device pixels (device pixel ratio and page
//! zoom applied), while located rects are in CSS pixels of the frame that
//! measured them. Each axis is scaled independently by
//! `bitmap dimension / reference viewport dimension`.

use greetbot_config::CaptureConfig;
use greetbot_protocols::{BitmapSize, CropSpec, Rect, ViewportSize};

/// Per-axis device pixels per CSS pixel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleFactors {
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, Copy)]
pub struct Normalizer {
    fallback_viewport: ViewportSize,
    max_height: f64,
}

impl Normalizer {
    pub fn new(fallback_viewport: ViewportSize, max_height: f64) -> Self {
        Self {
            fallback_viewport,
            max_height,
        }
    }

    pub fn from_config(config: &CaptureConfig) -> Self {
        Self::new(
            ViewportSize::new(config.fallback_viewport_width, config.fallback_viewport_height),
            config.max_height,
        )
    }

    /// The measured viewport when usable, the configured fallback otherwise.
    pub fn reference_viewport(&self, measured: Option<ViewportSize>) -> ViewportSize {
        measured
            .filter(ViewportSize::is_usable)
            .unwrap_or(self.fallback_viewport)
    }

    pub fn scale(&self, bitmap: BitmapSize, measured: Option<ViewportSize>) -> ScaleFactors {
        let reference = self.reference_viewport(measured);
        ScaleFactors {
            x: bitmap.width as f64 / reference.width,
            y: bitmap.height as f64 / reference.height,
        }
    }

    /// Convert a CSS-pixel rect into device pixels. A negative origin is
    /// clipped to zero first and the height is capped at the safety ceiling.
    pub fn normalize(&self, rect: Rect, bitmap: BitmapSize, measured: Option<ViewportSize>) -> Rect {
        let clipped = rect.clip_origin();
        let height = clipped.height.min(self.max_height);
        let scale = self.scale(bitmap, measured);
        Rect::new(
            clipped.x * scale.x,
            clipped.y * scale.y,
            clipped.width * scale.x,
            height * scale.y,
        )
    }

    /// Clamp a device-pixel rect into `[0, w) x [0, h)`. Oversized requests
    /// shrink to what the bitmap holds; they are never rejected.
    pub fn clamp_to_bitmap(device: Rect, bitmap: BitmapSize) -> CropSpec {
        let (crop_x, crop_width) = clamp_axis(device.x, device.width, bitmap.width);
        let (crop_y, crop_height) = clamp_axis(device.y, device.height, bitmap.height);
        CropSpec {
            crop_x,
            crop_y,
            crop_width,
            crop_height,
        }
    }

    /// [`normalize`](Self::normalize) followed by [`clamp_to_bitmap`](Self::clamp_to_bitmap).
    pub fn crop_spec(&self, rect: Rect, bitmap: BitmapSize, measured: Option<ViewportSize>) -> CropSpec {
        Self::clamp_to_bitmap(self.normalize(rect, bitmap, measured), bitmap)
    }
}

fn clamp_axis(origin: f64, extent: f64, limit: u32) -> (u32, u32) {
    if limit == 0 {
        return (0, 0);
    }
    // `as` saturates: NaN and negatives become 0.
    let start = (origin.round() as u32).min(limit - 1);
    let len = (extent.round() as u32).min(limit - start);
    (start, len)
}

#[cfg(test)]
#[path = "normalizer_tests.rs"]
mod tests;
