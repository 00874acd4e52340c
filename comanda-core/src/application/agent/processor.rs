use super::directive::AgentDirective;
use super::errors::AgentError;
use super::instructions::compose_system_message;
use super::runtime::{ToolRuntime, parse_agent_action};
use crate::config::AgentConfig;
use crate::model::{ModelProvider, ModelRequest};
use crate::tooling::ToolServerInterface;
use crate::types::{ChatMessage, MessageRole, ToolDescriptor};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Turns the conversation so far into the messages that answer it.
///
/// The returned messages are appended to the history in order; the last one
/// is the reply shown to the user.
#[async_trait]
pub trait TurnProcessor: Send + Sync {
    async fn process(
        &self,
        history: &[ChatMessage],
        tools: &[ToolDescriptor],
    ) -> Result<Vec<ChatMessage>, AgentError>;
}

/// ReAct-style engine: asks the model for a JSON directive, runs the requested
/// tool, feeds the result back and repeats until the model answers.
pub struct Agent {
    provider: Arc<dyn ModelProvider>,
    model: String,
    config: AgentConfig,
    runtime: ToolRuntime,
    session_id: String,
}

impl Agent {
    pub fn new(
        provider: Arc<dyn ModelProvider>,
        model: impl Into<String>,
        config: AgentConfig,
        bridge: Arc<dyn ToolServerInterface>,
    ) -> Self {
        let session_id = Uuid::new_v4().to_string();
        let model = model.into();
        info!(
            session_id = %session_id,
            provider = provider.id(),
            model = %model,
            "Agent session created"
        );
        Self {
            provider,
            model,
            config,
            runtime: ToolRuntime::new(bridge),
            session_id,
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }
}

impl Agent {
    /// Run model and tool steps, appending to `produced` as they happen so a
    /// turn that stops early still reports the tool calls already executed.
    async fn run_steps(
        &self,
        history: &[ChatMessage],
        tools: &[ToolDescriptor],
        produced: &mut Vec<ChatMessage>,
    ) -> Result<(), AgentError> {
        let host_instructions = self.runtime.host_instructions().await;
        let system_message =
            compose_system_message(&self.config.system_prompt, host_instructions.as_deref(), tools);
        let mut steps = 0usize;

        loop {
            let mut messages = Vec::with_capacity(history.len() + produced.len() + 1);
            messages.push(ChatMessage::new(MessageRole::System, system_message.clone()));
            messages.extend(history.iter().cloned());
            messages.extend(produced.iter().cloned());

            debug!(
                session_id = %self.session_id,
                messages = messages.len(),
                steps,
                "Submitting agent turn to model provider"
            );
            let response = self
                .provider
                .chat(ModelRequest {
                    model: self.model.clone(),
                    messages,
                    session_id: Some(self.session_id.clone()),
                })
                .await?;
            let content = response.message.content;

            match parse_agent_action(&content)? {
                AgentDirective::Final { response } => {
                    info!(session_id = %self.session_id, steps, "Agent returned final response");
                    produced.push(ChatMessage::assistant(response));
                    return Ok(());
                }
                AgentDirective::CallTool { tool, input } => {
                    if steps >= self.config.max_steps {
                        warn!(
                            session_id = %self.session_id,
                            max_steps = self.config.max_steps,
                            "Agent exceeded max tool interactions"
                        );
                        return Err(AgentError::StepLimit(self.config.max_steps));
                    }
                    steps += 1;
                    info!(tool = %tool, "Agent requested tool execution");

                    produced.push(ChatMessage::assistant(content.trim()));
                    let execution = self.runtime.execute(tools, &tool, input).await?;
                    produced.push(ChatMessage::tool(execution.to_feedback()));
                }
            }
        }
    }
}

#[async_trait]
impl TurnProcessor for Agent {
    /// A turn cut short by bad model output still returns the tool exchange
    /// that already ran, closed by the notice shown to the user, so the
    /// history keeps matching the order held by the host.
    async fn process(
        &self,
        history: &[ChatMessage],
        tools: &[ToolDescriptor],
    ) -> Result<Vec<ChatMessage>, AgentError> {
        let mut produced = Vec::new();
        match self.run_steps(history, tools, &mut produced).await {
            Ok(()) => Ok(produced),
            Err(err) if err.is_fatal() => Err(err),
            Err(err) => {
                warn!(
                    session_id = %self.session_id,
                    %err,
                    kept = produced.len(),
                    "Turn ended early; closing it with a notice"
                );
                produced.push(ChatMessage::assistant(err.user_message()));
                Ok(produced)
            }
        }
    }
}
