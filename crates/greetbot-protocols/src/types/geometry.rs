//! Rectangles and sizes in CSS and device pixel space.

use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle in CSS pixels, relative to a frame viewport.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    /// Create a rect. Negative sizes are floored at zero.
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width: width.max(0.0),
            height: height.max(0.0),
        }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    /// True when either dimension is zero (or not a number).
    pub fn is_empty(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }

    /// Clip a negative origin to zero, shrinking the matching dimension by the overflow.
    pub fn clip_origin(self) -> Self {
        let (x, width) = if self.x < 0.0 {
            (0.0, (self.width + self.x).max(0.0))
        } else {
            (self.x, self.width)
        };
        let (y, height) = if self.y < 0.0 {
            (0.0, (self.height + self.y).max(0.0))
        } else {
            (self.y, self.height)
        };
        Self { x, y, width, height }
    }
}

impl std::fmt::Display for Rect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "({}, {}) {}x{}",
            self.x, self.y, self.width, self.height
        )
    }
}

/// Viewport dimensions in CSS pixels, measured in the frame that produced a rect.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewportSize {
    pub width: f64,
    pub height: f64,
}

impl ViewportSize {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    /// A viewport is usable as a scale reference only if both sides are positive.
    pub fn is_usable(&self) -> bool {
        self.width > 0.0 && self.height > 0.0
    }
}

/// Decoded capture dimensions in device pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BitmapSize {
    pub width: u32,
    pub height: u32,
}

impl BitmapSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// Crop rectangle in device pixels, always inside the bitmap it was clamped to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CropSpec {
    pub crop_x: u32,
    pub crop_y: u32,
    pub crop_width: u32,
    pub crop_height: u32,
}

impl CropSpec {
    pub fn fits_within(&self, bitmap: BitmapSize) -> bool {
        self.crop_x < bitmap.width.max(1)
            && self.crop_y < bitmap.height.max(1)
            && self.crop_x + self.crop_width <= bitmap.width
            && self.crop_y + self.crop_height <= bitmap.height
    }
}

#[cfg(test)]
#[path = "geometry_tests.rs"]
mod tests;
