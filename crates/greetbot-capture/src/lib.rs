//! # greetbot Capture
//!
//! Locates the resume region across the frames of the active tab, picks the
//! authoritative per-frame answer, and crops that region out of a visible-tab
//! capture as a base64 PNG.
//!
//! - [`locator`] - per-frame DOM lookup with ordered selector strategies
//! - [`arbiter`] - choosing one result among per-frame results
//! - [`normalizer`] - CSS pixel to device pixel conversion and clamping
//! - [`engine`] - capture, decode, crop and encode
//! - [`resolver`] - runs a lookup in every frame and arbitrates

pub mod arbiter;
pub mod engine;
mod error;
pub mod locator;
pub mod normalizer;
pub mod resolver;

#[cfg(any(test, feature = "test-support"))]
pub mod fake;

pub use arbiter::{Arbiter, FrameRole};
pub use engine::{CaptureEngine, CaptureStage, CapturedImage};
pub use error::CaptureError;
pub use locator::{ButtonState, GreetOutcome, Locator, SelectorChain, SelectorStrategy};
pub use normalizer::{Normalizer, ScaleFactors};
pub use resolver::PageResolver;
