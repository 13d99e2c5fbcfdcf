//! Randomized, cancellable pauses between UI steps.

use std::future::Future;
use std::time::Duration;

use rand::Rng;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use greetbot_config::{CountRange, DelayRange};

use crate::error::{RunError, RunResult};

/// Draw a delay uniformly from `range`. An inverted range yields its minimum.
pub fn draw_delay(range: DelayRange) -> Duration {
    let ms = if range.max_ms > range.min_ms {
        rand::thread_rng().gen_range(range.min_ms..=range.max_ms)
    } else {
        range.min_ms
    };
    Duration::from_millis(ms)
}

/// Sleeps that end early when the run is cancelled.
#[derive(Clone)]
pub struct Pacer {
    cancel: CancellationToken,
}

impl Pacer {
    pub fn new(cancel: CancellationToken) -> Self {
        Self { cancel }
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Fails with [`RunError::Cancelled`] if a stop was requested.
    pub fn checkpoint(&self) -> RunResult<()> {
        if self.cancel.is_cancelled() {
            return Err(RunError::Cancelled);
        }
        Ok(())
    }

    /// Sleep for a delay drawn from `range`.
    pub async fn pause(&self, label: &str, range: DelayRange) -> RunResult<()> {
        let delay = draw_delay(range);
        debug!(step = label, delay_ms = delay.as_millis() as u64, "Pausing");
        self.sleep(delay).await
    }

    /// Run `step` unless a stop arrives first; an abandoned step is dropped.
    pub async fn guard<T, E>(&self, step: impl Future<Output = Result<T, E>>) -> RunResult<T>
    where
        RunError: From<E>,
    {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(RunError::Cancelled),
            result = step => Ok(result?),
        }
    }

    pub async fn sleep(&self, delay: Duration) -> RunResult<()> {
        tokio::select! {
            _ = self.cancel.cancelled() => Err(RunError::Cancelled),
            _ = tokio::time::sleep(delay) => Ok(()),
        }
    }
}

/// Decides when to take a long break: after a random number of processed
/// candidates drawn from the configured range, then redrawn.
#[derive(Debug)]
pub struct BreakSchedule {
    range: CountRange,
    since_break: u32,
    next: u32,
}

impl BreakSchedule {
    pub fn new(range: CountRange) -> Self {
        let mut schedule = Self {
            range,
            since_break: 0,
            next: 0,
        };
        schedule.next = schedule.draw();
        schedule
    }

    fn draw(&self) -> u32 {
        let CountRange { min, max } = self.range;
        if max > min {
            rand::thread_rng().gen_range(min..=max)
        } else {
            min
        }
    }

    /// Count one processed candidate; `true` when a break is due now.
    pub fn record(&mut self) -> bool {
        if self.next == 0 {
            return false;
        }
        self.since_break += 1;
        if self.since_break >= self.next {
            self.since_break = 0;
            self.next = self.draw();
            return true;
        }
        false
    }

    pub fn remaining(&self) -> u32 {
        self.next.saturating_sub(self.since_break)
    }
}

#[cfg(test)]
#[path = "pacing_tests.rs"]
mod tests;
