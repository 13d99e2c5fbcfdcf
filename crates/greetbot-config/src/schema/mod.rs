//! Configuration schema definitions.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

mod schema_capture;
mod schema_run;
mod schema_vision;

pub use schema_capture::*;
pub use schema_run::*;
pub use schema_vision::*;

/// Shared default helper used by submodules.
pub(crate) fn default_true() -> bool {
    true
}

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub browser: BrowserConfig,

    #[serde(default)]
    pub vision: VisionConfig,

    #[serde(default)]
    pub run: RunConfig,

    #[serde(default)]
    pub pacing: PacingConfig,

    #[serde(default)]
    pub capture: CaptureConfig,

    #[serde(default)]
    pub selectors: SelectorConfig,

    #[serde(default)]
    pub storage: StorageConfig,
}

/// Browser connection configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowserConfig {
    /// Chrome remote debugging endpoint.
    #[serde(default = "default_cdp_url")]
    pub cdp_url: String,

    /// Attach to the first page whose URL contains this.
    #[serde(default = "default_page_url_contains")]
    pub page_url_contains: String,

    #[serde(default = "default_command_timeout_ms")]
    pub command_timeout_ms: u64,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            cdp_url: default_cdp_url(),
            page_url_contains: default_page_url_contains(),
            command_timeout_ms: default_command_timeout_ms(),
        }
    }
}

fn default_cdp_url() -> String {
    "http://127.0.0.1:9222".to_string()
}

fn default_page_url_contains() -> String {
    "zhipin.com".to_string()
}

fn default_command_timeout_ms() -> u64 {
    30_000
}

/// Session log and screenshot storage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    #[serde(default = "default_true")]
    pub save_screenshots: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            save_screenshots: true,
        }
    }
}

impl StorageConfig {
    /// `data_dir` with `~` expanded.
    pub fn resolved_data_dir(&self) -> PathBuf {
        PathBuf::from(shellexpand::tilde(&self.data_dir.to_string_lossy()).to_string())
    }
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("~/.greetbot")
}

#[cfg(test)]
#[path = "schema_tests.rs"]
mod tests;
