//! # greetbot Provider - Gemini
//!
//! Google Gemini `generateContent` vision analyzer.

mod client;
mod provider;
mod types;

pub use provider::GeminiAnalyzer;
pub use types::*;
