//! CLI definitions for greetbot.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// greetbot CLI.
#[derive(Parser)]
#[command(name = "greetbot")]
#[command(about = "Screens recruiting-page candidates with a vision model and greets the matches")]
#[command(version)]
pub(crate) struct Cli {
    /// Configuration file path (default: ~/.greetbot/config.toml)
    #[arg(short, long, global = true, env = "GREETBOT_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Process the recommendation list in the attached tab
    Run {
        /// Job description the candidates are judged against (overrides config)
        #[arg(short, long)]
        job: Option<String>,

        /// Maximum candidates to process (overrides config)
        #[arg(short, long)]
        limit: Option<u32>,

        /// Analyze only, never press the greet button
        #[arg(long)]
        no_greet: bool,
    },

    /// Resolve the resume region of the open detail dialog and print it
    Locate,

    /// Resolve and capture the resume region to a PNG file
    Capture {
        /// Output file
        #[arg(short, long, default_value = "resume.png")]
        output: PathBuf,
    },

    /// Send a tiny request to check the configured API key
    TestKey,

    /// Validate the configuration file
    CheckConfig,
}
