//! Run sessions, per-candidate logs and counters.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{CandidateInfo, MatchResult};

/// What happened to a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogAction {
    Greeted,
    Skipped,
    Error,
}

impl std::fmt::Display for LogAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Greeted => "greeted",
            Self::Skipped => "skipped",
            Self::Error => "error",
        };
        f.write_str(s)
    }
}

/// Candidate summary stored with each log entry.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CandidateSummary {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub education: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<String>,
}

impl From<&CandidateInfo> for CandidateSummary {
    fn from(info: &CandidateInfo) -> Self {
        Self {
            age: info.age().map(str::to_string),
            education: info.education().map(str::to_string),
            company: None,
            position: None,
        }
    }
}

/// One entry in the user-facing operation log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationLog {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub candidate_name: String,
    pub candidate_info: CandidateSummary,
    pub match_result: bool,
    pub match_confidence: f64,
    pub match_reason: String,
    pub action: LogAction,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    /// Base64 PNG without the `data:` prefix.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub screenshot_base64: Option<String>,
}

impl OperationLog {
    pub fn new(candidate: &CandidateInfo, verdict: &MatchResult, action: LogAction) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            candidate_name: candidate.name.clone(),
            candidate_info: CandidateSummary::from(candidate),
            match_result: verdict.is_match,
            match_confidence: verdict.confidence,
            match_reason: verdict.reason.clone(),
            action,
            error_message: None,
            screenshot_base64: None,
        }
    }

    /// Entry for a candidate whose processing failed outright.
    pub fn error(candidate: &CandidateInfo, message: impl Into<String>) -> Self {
        let message = message.into();
        let mut log = Self::new(candidate, &MatchResult::no_match(message.clone()), LogAction::Error);
        log.error_message = Some(message);
        log
    }

    pub fn with_screenshot(mut self, base64_png: Option<String>) -> Self {
        self.screenshot_base64 = base64_png;
        self
    }

    /// One human-readable line, used for the plain-text export.
    pub fn to_text_line(&self) -> String {
        let mut line = format!(
            "[{}] {} | {} | match={} ({:.0}%) | {}",
            self.timestamp.format("%Y-%m-%d %H:%M:%S"),
            self.candidate_name,
            self.action,
            self.match_result,
            self.match_confidence * 100.0,
            self.match_reason
        );
        if let Some(ref err) = self.error_message {
            line.push_str(" | error: ");
            line.push_str(err);
        }
        line
    }
}

/// Counters for one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RunStats {
    pub processed: u32,
    pub matched: u32,
    pub greeted: u32,
    pub skipped: u32,
    pub errors: u32,
}

impl RunStats {
    pub fn record(&mut self, log: &OperationLog) {
        self.processed += 1;
        if log.match_result {
            self.matched += 1;
        }
        match log.action {
            LogAction::Greeted => self.greeted += 1,
            LogAction::Skipped => self.skipped += 1,
            LogAction::Error => self.errors += 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Idle,
    Running,
    Completed,
    Stopped,
    Error,
}

/// A run session as persisted to disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionLog {
    pub session_id: String,
    pub start_time: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<DateTime<Utc>>,
    pub status: RunStatus,
    pub stats: RunStats,
    pub logs: Vec<OperationLog>,
}

impl SessionLog {
    pub fn start() -> Self {
        let start_time = Utc::now();
        Self {
            session_id: format!("session_{}", start_time.format("%Y%m%d_%H%M%S")),
            start_time,
            end_time: None,
            status: RunStatus::Running,
            stats: RunStats::default(),
            logs: Vec::new(),
        }
    }

    pub fn push(&mut self, log: OperationLog) {
        self.stats.record(&log);
        self.logs.push(log);
    }

    pub fn finish(&mut self, status: RunStatus) {
        self.status = status;
        self.end_time = Some(Utc::now());
    }
}

/// Per-day totals used for the daily greeting limit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyStats {
    pub date: NaiveDate,
    pub total_processed: u32,
    pub total_greeted: u32,
}

impl DailyStats {
    pub fn for_date(date: NaiveDate) -> Self {
        Self {
            date,
            total_processed: 0,
            total_greeted: 0,
        }
    }
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
