//! Error types for the greetbot protocol layer.

mod host;
mod provider;

pub use host::*;
pub use provider::*;
