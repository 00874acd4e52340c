//! Chat payload shared by the Ollama and OpenAI-compatible APIs.

use crate::types::{ChatMessage, MessageRole};
use serde::Serialize;

#[derive(Debug, Serialize, PartialEq, Eq)]
pub(crate) struct WireMessage<'a> {
    pub role: &'static str,
    pub content: &'a str,
}

#[derive(Debug, Serialize)]
pub(crate) struct ChatPayload<'a> {
    pub model: &'a str,
    pub messages: Vec<WireMessage<'a>>,
    pub stream: bool,
}

impl<'a> ChatPayload<'a> {
    pub fn new(model: &'a str, messages: &'a [ChatMessage]) -> Self {
        Self {
            model,
            messages: messages.iter().map(WireMessage::from).collect(),
            stream: false,
        }
    }
}

impl<'a> From<&'a ChatMessage> for WireMessage<'a> {
    fn from(message: &'a ChatMessage) -> Self {
        // Neither API gets native tool messages: the action protocol lives in
        // the text, so tool results travel as user turns.
        let role = match message.role {
            MessageRole::Tool => MessageRole::User,
            other => other,
        };
        Self {
            role: role.as_str(),
            content: &message.content,
        }
    }
}
