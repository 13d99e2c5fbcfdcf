//! Vision provider configuration.

use serde::{Deserialize, Serialize};

/// Vision providers the assistant knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VisionProviderKind {
    #[default]
    Gemini,
    Qwen,
    Kimi,
    Deepseek,
    Wenxin,
    Zhipu,
}

impl VisionProviderKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Gemini => "gemini",
            Self::Qwen => "qwen",
            Self::Kimi => "kimi",
            Self::Deepseek => "deepseek",
            Self::Wenxin => "wenxin",
            Self::Zhipu => "zhipu",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Gemini => "Google Gemini",
            Self::Qwen => "通义千问 (Qwen)",
            Self::Kimi => "Kimi Chat",
            Self::Deepseek => "DeepSeek",
            Self::Wenxin => "文心一言",
            Self::Zhipu => "智谱GLM",
        }
    }

    /// Base URL; Gemini appends `/models/{model}:generateContent`, the
    /// others append `/chat/completions`.
    pub fn default_base_url(&self) -> &'static str {
        match self {
            Self::Gemini => "https://generativelanguage.googleapis.com/v1beta",
            Self::Qwen => "https://dashscope.aliyuncs.com/compatible-mode/v1",
            Self::Kimi => "https://api.moonshot.cn/v1",
            Self::Deepseek => "https://api.deepseek.com/v1",
            Self::Wenxin => "https://aip.baidubce.com/rpc/2.0/ai_custom/v1/wenxinworkshop",
            Self::Zhipu => "https://open.bigmodel.cn/api/paas/v4",
        }
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            Self::Gemini => "gemini-2.5-flash",
            Self::Qwen => "qwen-vl-plus",
            Self::Kimi => "moonshot-v1-8k",
            Self::Deepseek => "deepseek-chat",
            Self::Wenxin => "ernie-4.0-8k",
            Self::Zhipu => "glm-4-plus",
        }
    }

    /// Whether an analyzer implementation exists for this provider.
    pub fn is_supported(&self) -> bool {
        !matches!(self, Self::Wenxin)
    }
}

impl std::fmt::Display for VisionProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Vision analyzer configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisionConfig {
    #[serde(default)]
    pub provider: VisionProviderKind,

    #[serde(default)]
    pub api_key: Option<String>,

    /// Overrides the provider's default model.
    #[serde(default)]
    pub model: Option<String>,

    /// Overrides the provider's default base URL.
    #[serde(default)]
    pub base_url: Option<String>,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

impl Default for VisionConfig {
    fn default() -> Self {
        Self {
            provider: VisionProviderKind::default(),
            api_key: None,
            model: None,
            base_url: None,
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

impl VisionConfig {
    pub fn effective_model(&self) -> &str {
        self.model
            .as_deref()
            .unwrap_or_else(|| self.provider.default_model())
    }

    pub fn effective_base_url(&self) -> &str {
        self.base_url
            .as_deref()
            .unwrap_or_else(|| self.provider.default_base_url())
    }
}

fn default_temperature() -> f32 {
    0.2
}

fn default_max_tokens() -> u32 {
    8192
}

fn default_timeout_seconds() -> u64 {
    30
}
