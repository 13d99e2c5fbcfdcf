//! # greetbot RunLoop
//!
//! The sequential candidate loop and everything around it.
//!
//! - [`CandidateRunner`]: open, capture, analyze and greet each candidate
//! - [`Pacer`] / [`BreakSchedule`]: randomized, cancellable pauses
//! - [`DailyBudget`]: per-day greet limit
//! - [`SessionStore`]: session logs, screenshots and daily stats

pub mod error;
pub mod pacing;
pub mod risk;
pub mod runner;
pub mod store;

pub use error::{RunError, RunResult, StoreError};
pub use pacing::{BreakSchedule, Pacer, draw_delay};
pub use risk::DailyBudget;
pub use runner::{CandidateRunner, RunnerConfig};
pub use store::{FileSessionStore, MemorySessionStore, SessionStore, render_text};

// Re-export CancellationToken for convenience
pub use tokio_util::sync::CancellationToken;
