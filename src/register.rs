//! Building the browser host and vision analyzer from configuration.

use std::path::PathBuf;
use std::sync::Arc;

use tracing::info;

use greetbot_config::{BrowserConfig, VisionConfig, VisionProviderKind};
use greetbot_host_cdp::{CdpError, CdpHost};
use greetbot_protocols::{BrowserHost, ProviderError, VisionAnalyzer};
use greetbot_provider_gemini::GeminiAnalyzer;
use greetbot_provider_openai::OpenAiCompatAnalyzer;

/// Get the greetbot home directory (~/.greetbot).
pub(crate) fn greetbot_dir() -> PathBuf {
    dirs::home_dir()
        .map(|h| h.join(".greetbot"))
        .unwrap_or_else(|| PathBuf::from(".greetbot"))
}

/// Analyzer for the configured provider. Built per run, never cached.
pub(crate) fn build_analyzer(config: &VisionConfig) -> Result<Arc<dyn VisionAnalyzer>, ProviderError> {
    let analyzer: Arc<dyn VisionAnalyzer> = match config.provider {
        VisionProviderKind::Gemini => Arc::new(GeminiAnalyzer::from_config(config)?),
        VisionProviderKind::Wenxin => {
            return Err(ProviderError::Unsupported(
                config.provider.display_name().to_string(),
            ));
        }
        VisionProviderKind::Qwen
        | VisionProviderKind::Kimi
        | VisionProviderKind::Deepseek
        | VisionProviderKind::Zhipu => Arc::new(OpenAiCompatAnalyzer::from_config(config)?),
    };
    info!(
        "Vision provider: {} ({})",
        config.provider.display_name(),
        config.effective_model()
    );
    Ok(analyzer)
}

/// Attach to the recruiting tab over CDP.
pub(crate) async fn connect_host(config: &BrowserConfig) -> Result<Arc<dyn BrowserHost>, CdpError> {
    let host = CdpHost::connect(config).await?;
    info!("Attached to browser at {}", config.cdp_url);
    Ok(Arc::new(host))
}
