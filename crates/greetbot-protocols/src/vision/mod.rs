//! Vision analysis protocol definitions.
//!
//! Analyzers send one screenshot plus a prompt to a remote model and turn
//! its free-text answer into a [`MatchResult`](crate::MatchResult).

mod prompt;
mod reply;
mod traits;

pub use prompt::*;
pub use reply::*;
pub use traits::*;
