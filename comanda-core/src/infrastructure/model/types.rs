//! Chat request and reply exchanged with providers, and provider errors

use crate::types::ChatMessage;
use reqwest::StatusCode;
use thiserror::Error;

/// One round trip to the model: the full prompt for this step.
#[derive(Debug, Clone)]
pub struct ModelRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub session_id: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ModelResponse {
    pub message: ChatMessage,
    pub session_id: Option<String>,
}

impl ModelResponse {
    /// Wrap raw completion text as an assistant message.
    pub fn from_text(content: impl Into<String>, session_id: Option<String>) -> Self {
        Self {
            message: ChatMessage::assistant(content),
            session_id,
        }
    }
}

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("provider '{provider}' has no API key configured")]
    Credentials { provider: String },
    #[error("HTTP call to provider '{provider}' failed: {source}")]
    Http {
        provider: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("provider '{provider}' sent an unusable reply: {detail}")]
    Malformed { provider: String, detail: String },
}

impl ModelError {
    pub fn credentials(provider: impl Into<String>) -> Self {
        Self::Credentials {
            provider: provider.into(),
        }
    }

    pub fn http(provider: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Http {
            provider: provider.into(),
            source,
        }
    }

    pub fn malformed(provider: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::Malformed {
            provider: provider.into(),
            detail: detail.into(),
        }
    }

    /// Message shown to the customer when the turn cannot be completed.
    pub fn user_message(&self) -> String {
        match self {
            Self::Credentials { provider } => {
                format!("O provedor '{provider}' exige uma chave de API.")
            }
            Self::Http { provider, source } => http_message(provider, source),
            Self::Malformed { provider, .. } => format!("A resposta de '{provider}' é inválida."),
        }
    }
}

fn http_message(provider: &str, source: &reqwest::Error) -> String {
    if source.is_connect() {
        return format!("Não foi possível conectar ao provedor de modelo '{provider}'.");
    }
    if source.is_timeout() {
        return format!("A requisição para '{provider}' excedeu o tempo limite.");
    }
    let Some(status) = source.status() else {
        return format!("Erro de rede ao falar com '{provider}'.");
    };
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
            format!("A chave de API de '{provider}' foi recusada.")
        }
        StatusCode::NOT_FOUND => format!("Endpoint de '{provider}' não encontrado."),
        _ if status.is_server_error() => {
            format!("O provedor '{provider}' está indisponível (status {}).", status.as_u16())
        }
        _ => format!("A requisição para '{provider}' falhou com status {}.", status.as_u16()),
    }
}
