//! Browser host protocol definitions.
//!
//! A host exposes the active tab's frames as [`FrameDocument`]s and can
//! capture the visible tab as a PNG. Every DOM read or write goes through
//! a frame, so cross-origin boundaries are explicit.

mod traits;

pub use traits::*;
