//! OpenAI-compatible chat completions vision analyzer.
//!
//! Serves every provider that speaks `/chat/completions` with `image_url`
//! parts: Qwen (compatible mode), Kimi, DeepSeek and Zhipu.

mod api;
mod provider;

pub use provider::OpenAiCompatAnalyzer;
