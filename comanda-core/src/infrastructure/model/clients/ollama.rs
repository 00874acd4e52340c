use async_trait::async_trait;
use serde::Deserialize;
use tracing::info;

use super::base::{Auth, HttpClientBase};
use crate::config::ModelProviderConfig;
use crate::infrastructure::model::traits::ModelProvider;
use crate::infrastructure::model::types::{ModelError, ModelRequest, ModelResponse};
use crate::infrastructure::model::wire::ChatPayload;

const DEFAULT_API_PATH: &str = "/api/chat";

/// Local Ollama server (`/api/chat`, no authentication).
#[derive(Clone)]
pub struct OllamaClient {
    base: HttpClientBase,
}

impl OllamaClient {
    pub fn from_config(config: &ModelProviderConfig) -> Self {
        let api_path = config.api_path.as_deref().unwrap_or(DEFAULT_API_PATH);
        Self {
            base: HttpClientBase::new(
                config.provider_type.clone(),
                &config.endpoint,
                api_path,
                None,
            ),
        }
    }
}

#[async_trait]
impl ModelProvider for OllamaClient {
    fn id(&self) -> &str {
        &self.base.id
    }

    async fn chat(&self, request: ModelRequest) -> Result<ModelResponse, ModelError> {
        info!(
            provider = %self.base.id,
            model = %request.model,
            messages = request.messages.len(),
            "Sending chat to Ollama"
        );
        let payload = ChatPayload::new(&request.model, &request.messages);
        let reply: OllamaReply = self.base.post_json(&payload, Auth::None).await?;

        match reply.message {
            Some(message) => Ok(ModelResponse::from_text(message.content, request.session_id)),
            None => Err(ModelError::malformed(
                &self.base.id,
                reply.error.unwrap_or_else(|| "missing message".into()),
            )),
        }
    }
}

#[derive(Deserialize)]
struct OllamaReply {
    message: Option<OllamaMessage>,
    error: Option<String>,
}

#[derive(Deserialize)]
struct OllamaMessage {
    content: String,
}
