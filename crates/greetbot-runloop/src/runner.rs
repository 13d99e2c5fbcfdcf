//! Sequential candidate loop.
//!
//! Per candidate: read the card, open it, resolve the resume region, capture
//! it, ask the analyzer, greet on a match, close the dialog. Each step is
//! followed by a randomized pause. A stop request lets the step in flight
//! finish, records the candidate, and starts nothing new.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use chrono::Local;
use parking_lot::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use greetbot_capture::arbiter::NO_FRAME_MATCHED;
use greetbot_capture::{CaptureEngine, CaptureError, GreetOutcome, PageResolver};
use greetbot_config::{Config, PacingConfig, RunConfig};
use greetbot_protocols::{
    BrowserHost, CandidateInfo, DailyStats, LogAction, MatchResult, OperationLog, Rect, RunStats,
    RunStatus, SessionLog, ViewportSize, VisionAnalyzer,
};
use greetbot_protocols::vision::build_prompt;

use crate::error::{RunError, RunResult};
use crate::pacing::{BreakSchedule, Pacer};
use crate::risk::DailyBudget;
use crate::store::SessionStore;

const UNKNOWN_NAME: &str = "未知";
const STOPPED_REASON: &str = "运行已停止";

/// Settings the runner needs from the full configuration.
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    pub run: RunConfig,
    pub pacing: PacingConfig,
    pub save_screenshots: bool,
}

impl RunnerConfig {
    pub fn from_config(config: &Config) -> Self {
        Self {
            run: config.run.clone(),
            pacing: config.pacing.clone(),
            save_screenshots: config.storage.save_screenshots,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct RunState {
    status: RunStatus,
    stats: RunStats,
}

pub struct CandidateRunner {
    resolver: PageResolver,
    engine: CaptureEngine,
    analyzer: Arc<dyn VisionAnalyzer>,
    store: Arc<dyn SessionStore>,
    config: RunnerConfig,
    prompt: String,
    state: Mutex<RunState>,
    running: AtomicBool,
}

impl CandidateRunner {
    pub fn new(
        host: Arc<dyn BrowserHost>,
        config: &Config,
        analyzer: Arc<dyn VisionAnalyzer>,
        store: Arc<dyn SessionStore>,
    ) -> Self {
        Self {
            resolver: PageResolver::new(
                Arc::clone(&host),
                config.selectors.clone(),
                config.capture.clone(),
            ),
            engine: CaptureEngine::new(host, &config.capture),
            analyzer,
            store,
            config: RunnerConfig::from_config(config),
            prompt: build_prompt(&config.run.job_description),
            state: Mutex::new(RunState {
                status: RunStatus::Idle,
                stats: RunStats::default(),
            }),
            running: AtomicBool::new(false),
        }
    }

    pub fn status(&self) -> RunStatus {
        self.state.lock().status
    }

    pub fn stats(&self) -> RunStats {
        self.state.lock().stats
    }

    fn set_status(&self, status: RunStatus) {
        self.state.lock().status = status;
    }

    /// Run one session until the candidate list or a limit is exhausted, or
    /// `cancel` fires. A cancelled run returns `Ok` with status `Stopped`.
    pub async fn run(&self, cancel: CancellationToken) -> RunResult<SessionLog> {
        if self.running.swap(true, Ordering::SeqCst) {
            return Err(RunError::AlreadyRunning);
        }
        let result = self.run_session(Pacer::new(cancel)).await;
        self.running.store(false, Ordering::SeqCst);
        result
    }

    async fn run_session(&self, pacer: Pacer) -> RunResult<SessionLog> {
        let mut session = SessionLog::start();
        *self.state.lock() = RunState {
            status: RunStatus::Running,
            stats: RunStats::default(),
        };
        info!(session = %session.session_id, "Run started");

        let today = Local::now().date_naive();
        let stats = match self.store.load_daily_stats(today).await {
            Ok(stats) => stats,
            Err(e) => {
                warn!(error = %e, "Failed to load daily stats, starting from zero");
                DailyStats::for_date(today)
            }
        };
        let mut budget = DailyBudget::new(stats, self.config.run.daily_limit);
        if budget.is_exhausted() {
            let limit = budget.limit();
            return self
                .abort(session, RunStatus::Stopped, RunError::DailyLimitReached { limit })
                .await;
        }

        match self.resolver.captcha_present().await {
            Ok(false) => {}
            Ok(true) => return self.abort(session, RunStatus::Error, RunError::CaptchaDetected).await,
            Err(e) => return self.abort(session, RunStatus::Error, e.into()).await,
        }

        let count = match self.resolver.candidate_count().await {
            Ok(count) => count,
            Err(e) => return self.abort(session, RunStatus::Error, e.into()).await,
        };
        if count == 0 {
            return self.abort(session, RunStatus::Error, RunError::NoCandidates).await;
        }
        let total = count.min(self.config.run.candidate_limit as usize);
        info!(count, total, remaining_today = budget.remaining(), "Candidates to process");

        let pacing = &self.config.pacing;
        let mut breaks = BreakSchedule::new(pacing.break_every);
        let mut status = RunStatus::Completed;

        for index in 0..total {
            if pacer.is_cancelled() {
                status = RunStatus::Stopped;
                break;
            }
            budget.roll_over(Local::now().date_naive());
            if budget.is_exhausted() {
                info!(limit = budget.limit(), "Daily greet limit reached, stopping");
                status = RunStatus::Stopped;
                break;
            }
            if self.resolver.captcha_present().await.unwrap_or(false) {
                return self.abort(session, RunStatus::Error, RunError::CaptchaDetected).await;
            }

            let log = self.process_candidate(index, &pacer).await;
            self.record(&mut session, &mut budget, log).await;

            if pacer.is_cancelled() {
                status = RunStatus::Stopped;
                break;
            }
            if index + 1 == total {
                break;
            }
            if breaks.record() {
                info!(processed = index + 1, "Taking a break");
                if pacer.pause("break", pacing.break_duration).await.is_err() {
                    status = RunStatus::Stopped;
                    break;
                }
            }
            if pacer
                .pause("between_candidates", pacing.between_candidates)
                .await
                .is_err()
            {
                status = RunStatus::Stopped;
                break;
            }
        }

        if status == RunStatus::Stopped && pacer.is_cancelled() {
            info!("Run stopped by user");
        }
        Ok(self.finish(session, status).await)
    }

    async fn process_candidate(&self, index: usize, pacer: &Pacer) -> OperationLog {
        let info = match self.resolver.candidate_info(index).await {
            Ok(info) => info,
            Err(e) => {
                warn!(index, error = %e, "Failed to read candidate card");
                return OperationLog::error(&CandidateInfo::new(index, UNKNOWN_NAME, ""), e.to_string());
            }
        };
        info!(index, name = %info.name, base_info = %info.base_info, "Processing candidate");

        let mut screenshot = None;
        let log = match self.evaluate(index, pacer, &mut screenshot).await {
            Ok((verdict, action)) => OperationLog::new(&info, &verdict, action),
            Err(RunError::Cancelled) => {
                OperationLog::new(&info, &MatchResult::no_match(STOPPED_REASON), LogAction::Skipped)
            }
            Err(e) => {
                warn!(index, name = %info.name, error = %e, "Candidate failed");
                OperationLog::error(&info, e.to_string())
            }
        };

        self.close_detail(pacer).await;
        if let Err(e) = self.resolver.release_handles().await {
            warn!(error = %e, "Failed to release element handles");
        }
        info!(
            name = %info.name,
            action = %log.action,
            is_match = log.match_result,
            confidence = log.match_confidence,
            "Candidate done"
        );
        let screenshot = screenshot.filter(|_| self.config.save_screenshots);
        log.with_screenshot(screenshot)
    }

    /// Steps from opening the card through greeting. `screenshot` is filled
    /// as soon as a capture exists so it is kept even if a later step fails.
    async fn evaluate(
        &self,
        index: usize,
        pacer: &Pacer,
        screenshot: &mut Option<String>,
    ) -> RunResult<(MatchResult, LogAction)> {
        let pacing = &self.config.pacing;

        pacer.pause("before_click", pacing.before_click).await?;
        self.resolver.click_card(index).await?;
        pacer.pause("after_click", pacing.after_click).await?;
        pacer.guard(self.resolver.wait_for_detail()).await?;
        pacer.checkpoint()?;

        let (rect, viewport) = self.locate_region(pacer).await?;
        pacer.checkpoint()?;
        let image = self.engine.capture(rect, viewport).await?;
        *screenshot = Some(image.base64_png.clone());
        pacer.checkpoint()?;

        let verdict = self.analyze(&image.base64_png).await;
        drop(image);
        if !verdict.is_match || !self.config.run.auto_greet {
            return Ok((verdict, LogAction::Skipped));
        }

        if pacer.pause("before_greet", pacing.before_greet).await.is_err() {
            return Ok((verdict, LogAction::Skipped));
        }
        let action = match self.resolver.click_greet().await? {
            outcome if outcome.is_greeted() => {
                if outcome == GreetOutcome::AlreadyGreeted {
                    debug!("Candidate was already greeted");
                }
                LogAction::Greeted
            }
            outcome => {
                warn!(?outcome, "Greet button not usable");
                LogAction::Skipped
            }
        };
        Ok((verdict, action))
    }

    /// Resolve the region, retrying while the dialog finishes rendering.
    async fn locate_region(&self, pacer: &Pacer) -> RunResult<(Rect, Option<ViewportSize>)> {
        let attempts = self.config.run.rect_attempts.max(1);
        let interval = Duration::from_millis(self.config.run.rect_retry_interval_ms);
        let mut last_error = NO_FRAME_MATCHED.to_string();

        for attempt in 1..=attempts {
            pacer.checkpoint()?;
            let result = self.resolver.resolve_region().await?;
            if let Some(rect) = result.usable_rect() {
                debug!(attempt, %rect, frame = %result.frame_url, "Region resolved");
                return Ok((rect, result.viewport));
            }
            if let Some(err) = result.error {
                last_error = err;
            }
            debug!(attempt, attempts, error = %last_error, "Region not resolved");
            if attempt < attempts {
                pacer.sleep(interval).await?;
            }
        }
        Err(CaptureError::Unresolved(last_error).into())
    }

    /// Analysis failures degrade to a no-match carrying the reason.
    async fn analyze(&self, image_base64: &str) -> MatchResult {
        match self.analyzer.analyze_candidate(image_base64, &self.prompt).await {
            Ok(verdict) => verdict,
            Err(e) => {
                warn!(error = %e, quota = e.is_quota_exceeded(), "Analysis failed, treating as no match");
                MatchResult::no_match(format!("分析失败: {e}"))
            }
        }
    }

    /// Also runs after a stop request, so a stopped run leaves no dialog open.
    /// Only the pause before it is skipped then.
    async fn close_detail(&self, pacer: &Pacer) {
        if !pacer.is_cancelled() {
            let _ = pacer.pause("before_close", self.config.pacing.before_close).await;
        }
        match self.resolver.close_detail().await {
            Ok(true) => {}
            Ok(false) => debug!("No detail dialog to close"),
            Err(e) => warn!(error = %e, "Failed to close detail dialog"),
        }
    }

    /// Persist one log entry. Store failures are logged and ignored.
    async fn record(&self, session: &mut SessionLog, budget: &mut DailyBudget, log: OperationLog) {
        if let Some(ref png) = log.screenshot_base64 {
            if let Err(e) = self.store.save_screenshot(&session.session_id, &log.id, png).await {
                warn!(error = %e, "Failed to save screenshot");
            }
        }

        budget.record(&log);
        if let Err(e) = self.store.save_daily_stats(budget.stats()).await {
            warn!(error = %e, "Failed to save daily stats");
        }

        session.push(log);
        self.state.lock().stats = session.stats;
        if let Err(e) = self.store.save_session(session).await {
            warn!(error = %e, "Failed to save session");
        }
    }

    async fn finish(&self, mut session: SessionLog, status: RunStatus) -> SessionLog {
        session.finish(status);
        self.set_status(status);
        if let Err(e) = self.store.save_session(&session).await {
            warn!(error = %e, "Failed to save session");
        }
        if let Err(e) = self.store.export_text(&session).await {
            warn!(error = %e, "Failed to export session log");
        }
        let s = session.stats;
        info!(
            session = %session.session_id,
            ?status,
            processed = s.processed,
            matched = s.matched,
            greeted = s.greeted,
            skipped = s.skipped,
            errors = s.errors,
            "Run finished"
        );
        session
    }

    async fn abort(&self, session: SessionLog, status: RunStatus, err: RunError) -> RunResult<SessionLog> {
        error!(error = %err, "Run aborted");
        self.finish(session, status).await;
        Err(err)
    }
}

#[cfg(test)]
#[path = "runner_tests.rs"]
mod tests;
