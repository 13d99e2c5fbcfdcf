//! # greetbot Protocols
//!
//! Shared data model and collaborator traits for greetbot.
//! Contains only interface definitions and pure helpers, no I/O.
//!
//! ## Core Traits
//!
//! - [`BrowserHost`] - Tab-level browser primitives (frames, visible-tab capture)
//! - [`FrameDocument`] - DOM primitives scoped to one frame
//! - [`VisionAnalyzer`] - Remote vision model judging a resume screenshot

pub mod error;
pub mod host;
pub mod types;
pub mod vision;

pub use error::{HostError, ProviderError};
pub use host::{BrowserHost, CaptureTarget, ElementHandle, FrameDocument, ScrollMetrics};
pub use types::*;
pub use vision::{KeyCheck, ProviderReply, VisionAnalyzer};
