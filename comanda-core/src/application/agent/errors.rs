use crate::model::ModelError;
use crate::tooling::ToolInvokeError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AgentError {
    #[error(transparent)]
    Model(#[from] ModelError),
    #[error(transparent)]
    Tool(#[from] ToolError),
    #[error("invalid agent response: {0}")]
    InvalidResponse(String),
    #[error("agent exceeded {0} tool calls in a single turn")]
    StepLimit(usize),
}

impl AgentError {
    pub fn user_message(&self) -> String {
        match self {
            AgentError::Model(err) => err.user_message(),
            AgentError::Tool(err) => err.user_message(),
            AgentError::InvalidResponse(_) => {
                "Não entendi a resposta do assistente. Pode repetir o pedido?".to_string()
            }
            AgentError::StepLimit(_) => {
                "Não consegui concluir o pedido agora. Tente reformular a mensagem.".to_string()
            }
        }
    }

    /// Transport failures end the session; bad model output only ends the turn.
    pub fn is_fatal(&self) -> bool {
        matches!(self, AgentError::Model(_) | AgentError::Tool(_))
    }
}

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("tool '{tool}' failed: {source}")]
    Execution {
        tool: String,
        #[source]
        source: ToolInvokeError,
    },
}

impl ToolError {
    pub fn user_message(&self) -> String {
        match self {
            ToolError::Execution { tool, .. } => {
                format!("A ferramenta \"{tool}\" não respondeu. O atendimento foi encerrado.")
            }
        }
    }
}
