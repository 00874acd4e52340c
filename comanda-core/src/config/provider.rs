//! # Provider Configuration
//!
//! | Type | Description | API Key Required |
//! |------|-------------|-----------------|
//! | `ollama` | Local Ollama server | No |
//! | `openai` | OpenAI-compatible APIs | Yes |
//!
//! Any other `type` is treated as OpenAI-compatible.

use serde::Deserialize;

pub const DEFAULT_PROVIDER_TYPE: &str = "ollama";
pub const DEFAULT_ENDPOINT: &str = "http://127.0.0.1:11434";

/// Connection to the hosted model that acts as reasoning engine.
///
/// ```toml
/// [provider]
/// type = "openai"
/// endpoint = "https://api.openai.com"
/// api_key = "OPENAI_API_KEY"
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelProviderConfig {
    /// The provider type determines API format: "ollama" or "openai"
    pub provider_type: String,
    /// API endpoint URL
    pub endpoint: String,
    /// Name of the environment variable holding the API key
    pub api_key: Option<String>,
    /// Custom API path override
    pub api_path: Option<String>,
}

impl Default for ModelProviderConfig {
    fn default() -> Self {
        Self {
            provider_type: DEFAULT_PROVIDER_TYPE.to_string(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            api_key: None,
            api_path: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub(super) struct RawProviderConfig {
    #[serde(rename = "type")]
    provider_type: Option<String>,
    endpoint: Option<String>,
    api_key: Option<String>,
    api_path: Option<String>,
}

impl From<RawProviderConfig> for ModelProviderConfig {
    fn from(raw: RawProviderConfig) -> Self {
        let defaults = Self::default();
        Self {
            provider_type: raw.provider_type.unwrap_or(defaults.provider_type),
            endpoint: raw.endpoint.unwrap_or(defaults.endpoint),
            api_key: raw.api_key,
            api_path: raw.api_path,
        }
    }
}
