//! Daily greet budget.

use chrono::NaiveDate;

use greetbot_protocols::{DailyStats, LogAction, OperationLog};

/// Greetings left for the day, tracked against a persisted [`DailyStats`].
#[derive(Debug, Clone)]
pub struct DailyBudget {
    stats: DailyStats,
    limit: u32,
}

impl DailyBudget {
    pub fn new(stats: DailyStats, limit: u32) -> Self {
        Self { stats, limit }
    }

    pub fn stats(&self) -> &DailyStats {
        &self.stats
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    pub fn remaining(&self) -> u32 {
        self.limit.saturating_sub(self.stats.total_greeted)
    }

    pub fn is_exhausted(&self) -> bool {
        self.remaining() == 0
    }

    /// Start a fresh count when the calendar day changed mid-run.
    pub fn roll_over(&mut self, today: NaiveDate) {
        if self.stats.date != today {
            self.stats = DailyStats::for_date(today);
        }
    }

    pub fn record(&mut self, log: &OperationLog) {
        self.stats.total_processed += 1;
        if log.action == LogAction::Greeted {
            self.stats.total_greeted += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use greetbot_protocols::{CandidateInfo, MatchResult};

    fn log(action: LogAction) -> OperationLog {
        OperationLog::new(
            &CandidateInfo::new(0, "李四", ""),
            &MatchResult::new(true, 0.8, "ok", vec![]),
            action,
        )
    }

    #[test]
    fn test_budget_counts_only_greetings() {
        let date = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();
        let mut budget = DailyBudget::new(DailyStats::for_date(date), 2);

        budget.record(&log(LogAction::Skipped));
        assert_eq!(budget.remaining(), 2);
        budget.record(&log(LogAction::Greeted));
        budget.record(&log(LogAction::Greeted));
        assert!(budget.is_exhausted());
        assert_eq!(budget.stats().total_processed, 3);
        assert_eq!(budget.stats().total_greeted, 2);
    }

    #[test]
    fn test_budget_rolls_over_at_midnight() {
        let day = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();
        let mut stats = DailyStats::for_date(day);
        stats.total_greeted = 100;
        let mut budget = DailyBudget::new(stats, 100);
        assert!(budget.is_exhausted());

        budget.roll_over(day);
        assert!(budget.is_exhausted());

        budget.roll_over(day.succ_opt().unwrap());
        assert_eq!(budget.remaining(), 100);
    }
}
