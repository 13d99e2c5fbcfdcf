//! Candidate cards and analysis verdicts.

use serde::{Deserialize, Serialize};

/// Reason recorded when the model's verdict carries none.
pub const DEFAULT_REASON: &str = "未提供原因";

/// Confidence assumed when the model omits it.
pub const DEFAULT_CONFIDENCE: f64 = 0.5;

/// A candidate card as read from the recommendation list.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidateInfo {
    pub index: usize,
    pub name: String,
    /// Raw `|`-separated line, e.g. `28岁 | 3年 | 硕士 | 在职-月内到岗`.
    pub base_info: String,
}

impl CandidateInfo {
    pub fn new(index: usize, name: impl Into<String>, base_info: impl Into<String>) -> Self {
        Self {
            index,
            name: name.into(),
            base_info: base_info.into(),
        }
    }

    fn base_part(&self, i: usize) -> Option<&str> {
        self.base_info
            .split('|')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .nth(i)
    }

    pub fn age(&self) -> Option<&str> {
        self.base_part(0)
    }

    pub fn work_years(&self) -> Option<&str> {
        self.base_part(1)
    }

    pub fn education(&self) -> Option<&str> {
        self.base_part(2)
    }

    pub fn status(&self) -> Option<&str> {
        self.base_part(3)
    }
}

/// Verdict of the vision model for one candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    #[serde(rename = "match")]
    pub is_match: bool,
    pub confidence: f64,
    pub reason: String,
    #[serde(default)]
    pub highlights: Vec<String>,
}

impl MatchResult {
    /// Build a verdict, clamping confidence into `[0, 1]`.
    pub fn new(is_match: bool, confidence: f64, reason: impl Into<String>, highlights: Vec<String>) -> Self {
        let confidence = if confidence.is_finite() {
            confidence.clamp(0.0, 1.0)
        } else {
            0.0
        };
        Self {
            is_match,
            confidence,
            reason: reason.into(),
            highlights,
        }
    }

    /// Fallback verdict used whenever analysis could not produce one.
    pub fn no_match(reason: impl Into<String>) -> Self {
        Self::new(false, 0.0, reason, Vec::new())
    }
}

#[cfg(test)]
#[path = "candidate_tests.rs"]
mod tests;
