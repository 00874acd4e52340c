//! Provider factory - creates clients from config

use super::clients::{OllamaClient, OpenAIClient};
use super::traits::ModelProvider;
use crate::config::ModelProviderConfig;
use std::sync::Arc;

/// Factory for creating model clients from provider config.
pub struct ProviderFactory;

impl ProviderFactory {
    /// Creates a model client based on provider type.
    ///
    /// Supported types:
    /// - `ollama`, `localai` → Ollama format
    /// - Others → OpenAI-compatible format (default)
    pub fn create(config: &ModelProviderConfig) -> Arc<dyn ModelProvider> {
        match config.provider_type.to_lowercase().as_str() {
            "ollama" | "localai" => Arc::new(OllamaClient::from_config(config)),
            _ => Arc::new(OpenAIClient::from_config(config)),
        }
    }
}
