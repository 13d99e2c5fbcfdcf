//! Subcommand handlers for greetbot.

use std::path::Path;
use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use tracing::{info, warn};

use greetbot_capture::{CaptureEngine, CaptureError, PageResolver};
use greetbot_config::{Config, ConfigValidator};
use greetbot_runloop::{CancellationToken, CandidateRunner, FileSessionStore};

use crate::register::{build_analyzer, connect_host};

type CmdResult = Result<(), Box<dyn std::error::Error>>;

/// Overrides from the `run` flags.
pub(crate) struct RunOverrides {
    pub job: Option<String>,
    pub limit: Option<u32>,
    pub no_greet: bool,
}

impl RunOverrides {
    pub(crate) fn apply(self, config: &mut Config) {
        if let Some(job) = self.job {
            config.run.job_description = job;
        }
        if let Some(limit) = self.limit {
            config.run.candidate_limit = limit;
        }
        if self.no_greet {
            config.run.auto_greet = false;
        }
    }
}

/// Log warnings, fail on the first error.
fn validate(config: &Config) -> CmdResult {
    let result = ConfigValidator::validate(config);
    for warning in &result.warnings {
        warn!("{}: {}", warning.path, warning.message);
    }
    match result.into_error() {
        Some(err) => Err(err.into()),
        None => Ok(()),
    }
}

/// Process the candidate list until done, stopped, or limited.
pub(crate) async fn run(mut config: Config, overrides: RunOverrides) -> CmdResult {
    overrides.apply(&mut config);
    validate(&config)?;

    let analyzer = build_analyzer(&config.vision)?;
    let host = connect_host(&config.browser).await?;
    let data_dir = config.storage.resolved_data_dir();
    let store = Arc::new(FileSessionStore::new(&data_dir).await?);
    info!("Session data: {}", data_dir.display());

    let runner = CandidateRunner::new(host, &config, analyzer, store);

    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Stop requested, finishing the current step");
                cancel.cancel();
            }
        });
    }

    let session = runner.run(cancel).await?;
    let s = &session.stats;
    println!(
        "{} {:?}: processed={} matched={} greeted={} skipped={} errors={}",
        session.session_id, session.status, s.processed, s.matched, s.greeted, s.skipped, s.errors
    );
    Ok(())
}

/// Print the arbitrated resume region as JSON.
pub(crate) async fn locate(config: Config) -> CmdResult {
    let host = connect_host(&config.browser).await?;
    let resolver = PageResolver::new(host, config.selectors, config.capture);
    let result = resolver.resolve_region().await?;
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

/// Resolve the resume region and write its crop to `output`.
pub(crate) async fn capture(config: Config, output: &Path) -> CmdResult {
    let host = connect_host(&config.browser).await?;
    let engine = CaptureEngine::new(Arc::clone(&host), &config.capture);
    let resolver = PageResolver::new(host, config.selectors, config.capture);

    let result = resolver.resolve_region().await?;
    let rect = result.usable_rect().ok_or_else(|| {
        CaptureError::Unresolved(result.error.clone().unwrap_or_else(|| "no region".to_string()))
    })?;
    let image = engine.capture(rect, result.viewport).await?;

    tokio::fs::write(output, STANDARD.decode(&image.base64_png)?).await?;
    println!(
        "{} ({}x{} from {}x{} capture)",
        output.display(),
        image.crop.crop_width,
        image.crop.crop_height,
        image.bitmap.width,
        image.bitmap.height
    );
    Ok(())
}

pub(crate) async fn test_key(config: Config) -> CmdResult {
    let analyzer = build_analyzer(&config.vision)?;
    let check = analyzer.test_api_key().await;
    if check.valid {
        println!("API key OK ({})", config.vision.provider.display_name());
        return Ok(());
    }
    if check.quota_exceeded {
        println!("Quota exhausted; wait for it to reset or upgrade the plan");
    }
    Err(check.error.unwrap_or_else(|| "API key check failed".to_string()).into())
}

pub(crate) fn check_config(config: &Config) -> CmdResult {
    validate(config)?;
    println!("Configuration OK");
    Ok(())
}
