//! Common types used across greetbot.

mod geometry;
mod frame;
mod candidate;
mod session;

pub use geometry::*;
pub use frame::*;
pub use candidate::*;
pub use session::*;
