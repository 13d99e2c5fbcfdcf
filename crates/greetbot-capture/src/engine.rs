//! Capture & crop engine.
//!
//! One capture walks `Idle -> CapturingTab -> DecodingBitmap -> Cropping ->
//! Encoding -> Done`, dropping to `Failed` from any stage. The decoded bitmap
//! is owned by a single capture and released as soon as the crop is taken.

use std::io::Cursor;
use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use image::{DynamicImage, GenericImageView, ImageFormat};
use parking_lot::Mutex;
use tracing::{debug, warn};

use greetbot_config::CaptureConfig;
use greetbot_protocols::{BitmapSize, BrowserHost, CaptureTarget, CropSpec, Rect, ViewportSize};

use crate::error::CaptureError;
use crate::normalizer::Normalizer;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CaptureStage {
    Idle,
    CapturingTab,
    DecodingBitmap,
    Cropping,
    Encoding,
    Done,
    Failed,
}

impl std::fmt::Display for CaptureStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Idle => "idle",
            Self::CapturingTab => "capturing tab",
            Self::DecodingBitmap => "decoding bitmap",
            Self::Cropping => "cropping",
            Self::Encoding => "encoding",
            Self::Done => "done",
            Self::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// A finished crop.
#[derive(Debug, Clone)]
pub struct CapturedImage {
    /// PNG bytes, base64 encoded, without a `data:` prefix.
    pub base64_png: String,
    pub crop: CropSpec,
    /// Dimensions of the full capture the crop was taken from.
    pub bitmap: BitmapSize,
}

pub struct CaptureEngine {
    host: Arc<dyn BrowserHost>,
    normalizer: Normalizer,
    chunk_bytes: usize,
    stage: Mutex<CaptureStage>,
}

impl CaptureEngine {
    pub fn new(host: Arc<dyn BrowserHost>, config: &CaptureConfig) -> Self {
        Self {
            host,
            normalizer: Normalizer::from_config(config),
            chunk_bytes: config.base64_chunk_bytes,
            stage: Mutex::new(CaptureStage::Idle),
        }
    }

    /// Stage reached by the most recent capture.
    pub fn stage(&self) -> CaptureStage {
        *self.stage.lock()
    }

    fn enter(&self, stage: CaptureStage) {
        debug!(%stage, "Capture stage");
        *self.stage.lock() = stage;
    }

    /// Capture the visible tab and crop `region` (CSS pixels, measured against
    /// `viewport`) out of it.
    pub async fn capture(
        &self,
        region: Rect,
        viewport: Option<ViewportSize>,
    ) -> Result<CapturedImage, CaptureError> {
        self.enter(CaptureStage::Idle);
        let result = self.run(region, viewport).await;
        match &result {
            Ok(img) => {
                self.enter(CaptureStage::Done);
                debug!(
                    width = img.crop.crop_width,
                    height = img.crop.crop_height,
                    bytes = img.base64_png.len(),
                    "Region captured"
                );
            }
            Err(e) => {
                warn!(stage = %self.stage(), error = %e, "Capture failed");
                self.enter(CaptureStage::Failed);
            }
        }
        result
    }

    async fn run(
        &self,
        region: Rect,
        viewport: Option<ViewportSize>,
    ) -> Result<CapturedImage, CaptureError> {
        if region.is_empty() {
            return Err(CaptureError::ZeroAreaRegion {
                width: region.width,
                height: region.height,
            });
        }

        self.enter(CaptureStage::CapturingTab);
        let data_url = self.capture_tab().await?;

        self.enter(CaptureStage::DecodingBitmap);
        let bitmap = decode_data_url(&data_url)?;
        drop(data_url);
        let (width, height) = bitmap.dimensions();
        let bitmap_size = BitmapSize::new(width, height);

        self.enter(CaptureStage::Cropping);
        let crop = self.normalizer.crop_spec(region, bitmap_size, viewport);
        let cropped = crop_bitmap(bitmap, crop)?;

        self.enter(CaptureStage::Encoding);
        let png = encode_png(&cropped)?;
        let base64_png = encode_base64_chunked(&png, self.chunk_bytes);

        Ok(CapturedImage {
            base64_png,
            crop,
            bitmap: bitmap_size,
        })
    }

    /// Current-window capture, then the explicit-window variant. Both
    /// failing is terminal; there is no retry.
    async fn capture_tab(&self) -> Result<String, CaptureError> {
        let primary = match self.host.capture_visible_tab(CaptureTarget::CurrentWindow).await {
            Ok(url) => return Ok(url),
            Err(e) => e.to_string(),
        };
        debug!(error = %primary, "Current-window capture failed, trying explicit window");

        let fallback = match self.host.active_window().await {
            Ok(window) => self.host.capture_visible_tab(CaptureTarget::Window(window)).await,
            Err(e) => Err(e),
        };
        fallback.map_err(|e| CaptureError::CaptureTransportFailure {
            primary,
            fallback: e.to_string(),
        })
    }
}

/// Decode a `data:image/...;base64,` URL (or bare base64) into a bitmap.
pub fn decode_data_url(data_url: &str) -> Result<DynamicImage, CaptureError> {
    let payload = match data_url.split_once(',') {
        Some((header, body)) if header.starts_with("data:") => body,
        _ => data_url,
    };
    let bytes = STANDARD
        .decode(payload.trim())
        .map_err(|e| CaptureError::stage(CaptureStage::DecodingBitmap, e))?;
    image::load_from_memory(&bytes).map_err(|e| CaptureError::stage(CaptureStage::DecodingBitmap, e))
}

/// Copy the clamped region 1:1 onto a new canvas of exactly the clamped
/// size. Consumes the bitmap so it is released right after the crop.
pub fn crop_bitmap(bitmap: DynamicImage, crop: CropSpec) -> Result<DynamicImage, CaptureError> {
    if crop.crop_width == 0 || crop.crop_height == 0 {
        return Err(CaptureError::ZeroAreaRegion {
            width: crop.crop_width as f64,
            height: crop.crop_height as f64,
        });
    }
    let (width, height) = bitmap.dimensions();
    if !crop.fits_within(BitmapSize::new(width, height)) {
        return Err(CaptureError::stage(
            CaptureStage::Cropping,
            format!("crop {crop:?} outside {width}x{height} bitmap"),
        ));
    }
    Ok(bitmap.crop_imm(crop.crop_x, crop.crop_y, crop.crop_width, crop.crop_height))
}

pub fn encode_png(img: &DynamicImage) -> Result<Vec<u8>, CaptureError> {
    let mut buffer = Cursor::new(Vec::new());
    img.write_to(&mut buffer, ImageFormat::Png)
        .map_err(|e| CaptureError::stage(CaptureStage::Encoding, e))?;
    Ok(buffer.into_inner())
}

/// Base64-encode in fixed-size pieces. The chunk is rounded down to a
/// multiple of 3 so the output equals a one-shot encode.
pub fn encode_base64_chunked(bytes: &[u8], chunk_bytes: usize) -> String {
    let chunk = (chunk_bytes / 3).max(1) * 3;
    let mut out = String::with_capacity(bytes.len().div_ceil(3) * 4);
    for piece in bytes.chunks(chunk) {
        STANDARD.encode_string(piece, &mut out);
    }
    out
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
