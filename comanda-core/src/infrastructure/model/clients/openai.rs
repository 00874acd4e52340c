use async_trait::async_trait;
use serde::Deserialize;
use tracing::info;

use super::base::{Auth, HttpClientBase};
use crate::config::{ModelProviderConfig, resolve_secret};
use crate::infrastructure::model::traits::ModelProvider;
use crate::infrastructure::model::types::{ModelError, ModelRequest, ModelResponse};
use crate::infrastructure::model::wire::ChatPayload;

const DEFAULT_API_PATH: &str = "/v1/chat/completions";

/// Any OpenAI-compatible chat completions API (OpenAI, Groq, Mistral, ...).
#[derive(Clone)]
pub struct OpenAIClient {
    base: HttpClientBase,
}

impl OpenAIClient {
    pub fn from_config(config: &ModelProviderConfig) -> Self {
        let api_key = resolve_secret(&config.provider_type, config.api_key.as_deref());
        let api_path = config.api_path.as_deref().unwrap_or(DEFAULT_API_PATH);
        Self {
            base: HttpClientBase::new(
                config.provider_type.clone(),
                &config.endpoint,
                api_path,
                api_key,
            ),
        }
    }
}

#[async_trait]
impl ModelProvider for OpenAIClient {
    fn id(&self) -> &str {
        &self.base.id
    }

    async fn chat(&self, request: ModelRequest) -> Result<ModelResponse, ModelError> {
        info!(
            provider = %self.base.id,
            model = %request.model,
            messages = request.messages.len(),
            "Sending chat completion request"
        );
        let payload = ChatPayload::new(&request.model, &request.messages);
        let reply: Completion = self.base.post_json(&payload, Auth::Bearer).await?;

        reply
            .choices
            .into_iter()
            .find_map(|choice| choice.message.content)
            .map(|content| ModelResponse::from_text(content, request.session_id.clone()))
            .ok_or_else(|| ModelError::malformed(&self.base.id, "no choice carried content"))
    }
}

#[derive(Deserialize)]
struct Completion {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: CompletionMessage,
}

#[derive(Deserialize)]
struct CompletionMessage {
    content: Option<String>,
}
