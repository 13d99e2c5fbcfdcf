//! greetbot - recruiting-page greeting assistant
//!
//! Main entry point for the greetbot CLI.

mod cli;
mod commands;
mod register;

use clap::Parser;
use tracing::info;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use greetbot_config::ConfigLoader;

use crate::cli::{Cli, Commands};
use crate::commands::RunOverrides;
use crate::register::greetbot_dir;

/// Initialize tracing with console and file output.
///
/// Log files are written to ~/.greetbot/debug/ with daily rotation.
fn init_tracing() -> Result<(), Box<dyn std::error::Error>> {
    let log_dir = greetbot_dir().join("debug");
    std::fs::create_dir_all(&log_dir)?;

    let file_appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix("greetbot")
        .filename_suffix("log")
        .max_log_files(30)
        .build(&log_dir)?;

    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    // The guard flushes the file writer on drop, so it lives for the whole process.
    static GUARD: std::sync::OnceLock<tracing_appender::non_blocking::WorkerGuard> =
        std::sync::OnceLock::new();
    let _ = GUARD.set(guard);

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_target(true).with_ansi(true))
        .with(fmt::layer().with_writer(non_blocking).with_ansi(false))
        .init();

    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing()?;

    let cli = Cli::parse();
    let config = ConfigLoader::load_or_default(cli.config.as_deref())?;
    info!("greetbot v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Commands::Run { job, limit, no_greet } => {
            commands::run(config, RunOverrides { job, limit, no_greet }).await
        }
        Commands::Locate => commands::locate(config).await,
        Commands::Capture { output } => commands::capture(config, &output).await,
        Commands::TestKey => commands::test_key(config).await,
        Commands::CheckConfig => commands::check_config(&config),
    }
}
