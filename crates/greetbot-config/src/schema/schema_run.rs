//! Run loop and pacing configuration.

use serde::{Deserialize, Serialize};

use super::default_true;

/// A closed range of milliseconds a randomized delay is drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DelayRange {
    pub min_ms: u64,
    pub max_ms: u64,
}

impl DelayRange {
    pub const fn new(min_ms: u64, max_ms: u64) -> Self {
        Self { min_ms, max_ms }
    }

    pub fn is_valid(&self) -> bool {
        self.min_ms <= self.max_ms
    }
}

/// A closed range of counts, e.g. candidates between breaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CountRange {
    pub min: u32,
    pub max: u32,
}

/// Candidate loop configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    #[serde(default)]
    pub job_description: String,

    /// Maximum candidates processed in one run.
    #[serde(default = "default_candidate_limit")]
    pub candidate_limit: u32,

    /// Maximum greetings per calendar day across runs.
    #[serde(default = "default_daily_limit")]
    pub daily_limit: u32,

    #[serde(default = "default_true")]
    pub auto_greet: bool,

    /// Attempts at resolving the resume region before giving up on a candidate.
    #[serde(default = "default_rect_attempts")]
    pub rect_attempts: u32,

    #[serde(default = "default_rect_retry_interval_ms")]
    pub rect_retry_interval_ms: u64,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            job_description: String::new(),
            candidate_limit: default_candidate_limit(),
            daily_limit: default_daily_limit(),
            auto_greet: true,
            rect_attempts: default_rect_attempts(),
            rect_retry_interval_ms: default_rect_retry_interval_ms(),
        }
    }
}

fn default_candidate_limit() -> u32 {
    50
}

fn default_daily_limit() -> u32 {
    100
}

fn default_rect_attempts() -> u32 {
    5
}

fn default_rect_retry_interval_ms() -> u64 {
    1000
}

/// Randomized pauses between UI steps.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PacingConfig {
    #[serde(default = "default_between_candidates")]
    pub between_candidates: DelayRange,

    #[serde(default = "default_before_click")]
    pub before_click: DelayRange,

    #[serde(default = "default_after_click")]
    pub after_click: DelayRange,

    #[serde(default = "default_before_greet")]
    pub before_greet: DelayRange,

    #[serde(default = "default_before_close")]
    pub before_close: DelayRange,

    #[serde(default = "default_break_every")]
    pub break_every: CountRange,

    #[serde(default = "default_break_duration")]
    pub break_duration: DelayRange,
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            between_candidates: default_between_candidates(),
            before_click: default_before_click(),
            after_click: default_after_click(),
            before_greet: default_before_greet(),
            before_close: default_before_close(),
            break_every: default_break_every(),
            break_duration: default_break_duration(),
        }
    }
}

impl PacingConfig {
    /// Every delay range, labelled for validation messages.
    pub fn ranges(&self) -> [(&'static str, DelayRange); 6] {
        [
            ("between_candidates", self.between_candidates),
            ("before_click", self.before_click),
            ("after_click", self.after_click),
            ("before_greet", self.before_greet),
            ("before_close", self.before_close),
            ("break_duration", self.break_duration),
        ]
    }
}

fn default_between_candidates() -> DelayRange {
    DelayRange::new(3000, 8000)
}

fn default_before_click() -> DelayRange {
    DelayRange::new(1000, 3000)
}

fn default_after_click() -> DelayRange {
    DelayRange::new(1500, 2500)
}

fn default_before_greet() -> DelayRange {
    DelayRange::new(500, 1500)
}

fn default_before_close() -> DelayRange {
    DelayRange::new(1000, 3000)
}

fn default_break_every() -> CountRange {
    CountRange { min: 20, max: 30 }
}

fn default_break_duration() -> DelayRange {
    DelayRange::new(30_000, 60_000)
}
