use crate::agent::{AgentError, TurnProcessor};
use crate::constants::EXIT_PHRASES;
use crate::conversation::ConversationHistory;
use crate::tooling::{ToolInvokeError, ToolServerInterface};
use crate::types::{ChatMessage, ToolDescriptor};
use std::sync::Arc;
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, error, info, warn};

const PROMPT: &str = "Você: ";
const REPLY_PREFIX: &str = "Atendente: ";
const FAREWELL: &str = "Até logo!";

#[derive(Debug, Error)]
pub enum DriverError {
    #[error("tool host advertised no tools")]
    NoTools,
    #[error(transparent)]
    Tool(#[from] ToolInvokeError),
    #[error(transparent)]
    Agent(#[from] AgentError),
    #[error("stdin/stdout I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl DriverError {
    pub fn user_message(&self) -> String {
        match self {
            DriverError::NoTools => {
                "Nenhuma ferramenta disponível no servidor de pedidos. Encerrando.".to_string()
            }
            DriverError::Tool(_) => {
                "Não foi possível falar com o servidor de pedidos. Encerrando.".to_string()
            }
            DriverError::Agent(err) => err.user_message(),
            DriverError::Io(err) => format!("Erro de entrada/saída: {err}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverState {
    AwaitingInput,
    Processing,
    Terminated,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TurnOutcome {
    /// Blank input; nothing happened.
    Skipped,
    Exit,
    Reply(String),
}

/// `true` for `sair`, `exit` and `quit`, ignoring case and surrounding spaces.
pub fn is_exit_phrase(line: &str) -> bool {
    let line = line.trim();
    EXIT_PHRASES
        .iter()
        .any(|phrase| phrase.eq_ignore_ascii_case(line))
}

/// Interactive chat loop: one user line in, one assistant reply out.
pub struct Driver {
    tools: Vec<ToolDescriptor>,
    processor: Arc<dyn TurnProcessor>,
    history: ConversationHistory,
    state: DriverState,
}

impl Driver {
    /// Fetch the tool catalogue and get ready for the first line.
    pub async fn start(
        tools_source: &dyn ToolServerInterface,
        processor: Arc<dyn TurnProcessor>,
        history_window: usize,
    ) -> Result<Self, DriverError> {
        let tools = tools_source.list_tools().await?;
        if tools.is_empty() {
            error!("Tool host advertised no tools");
            return Err(DriverError::NoTools);
        }
        info!(
            tools = ?tools.iter().map(|tool| tool.name.as_str()).collect::<Vec<_>>(),
            "Chat session ready"
        );

        Ok(Self {
            tools,
            processor,
            history: ConversationHistory::new(history_window),
            state: DriverState::AwaitingInput,
        })
    }

    pub fn state(&self) -> DriverState {
        self.state
    }

    pub fn tools(&self) -> &[ToolDescriptor] {
        &self.tools
    }

    pub fn history(&self) -> &ConversationHistory {
        &self.history
    }

    /// Process one line of user input.
    ///
    /// Problems with the model's output are answered with a message and the
    /// session goes on; transport failures are returned and end it.
    pub async fn handle_line(&mut self, line: &str) -> Result<TurnOutcome, DriverError> {
        if self.state == DriverState::Terminated {
            return Ok(TurnOutcome::Exit);
        }
        let text = line.trim();
        if text.is_empty() {
            return Ok(TurnOutcome::Skipped);
        }
        if is_exit_phrase(text) {
            info!("Exit phrase received");
            self.state = DriverState::Terminated;
            return Ok(TurnOutcome::Exit);
        }

        self.state = DriverState::Processing;
        self.history.push(ChatMessage::user(text));
        debug!(
            history = self.history.len(),
            window = self.history.window().len(),
            "Processing turn"
        );

        let outcome = self
            .processor
            .process(self.history.window(), &self.tools)
            .await
            .and_then(|produced| {
                let reply = produced
                    .last()
                    .map(|message| message.content.clone())
                    .ok_or_else(|| {
                        AgentError::InvalidResponse("reasoning engine produced no messages".into())
                    })?;
                Ok((reply, produced))
            });

        match outcome {
            Ok((reply, produced)) => {
                self.history.extend(produced);
                self.state = DriverState::AwaitingInput;
                Ok(TurnOutcome::Reply(reply))
            }
            Err(err) if err.is_fatal() => {
                error!(%err, "Turn failed; ending session");
                self.state = DriverState::Terminated;
                Err(err.into())
            }
            Err(err) => {
                warn!(%err, "Turn failed; waiting for next input");
                // Keep user and assistant turns alternating for the next window.
                let notice = err.user_message();
                self.history.push(ChatMessage::assistant(notice.clone()));
                self.state = DriverState::AwaitingInput;
                Ok(TurnOutcome::Reply(notice))
            }
        }
    }

    /// Prompt, read and answer until an exit phrase or end of input.
    pub async fn run<R, W>(&mut self, reader: R, mut writer: W) -> Result<(), DriverError>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut lines = reader.lines();
        loop {
            writer.write_all(PROMPT.as_bytes()).await?;
            writer.flush().await?;

            let Some(line) = lines.next_line().await? else {
                writer.write_all(b"\n").await?;
                info!("Input closed; ending chat session");
                break;
            };

            match self.handle_line(&line).await? {
                TurnOutcome::Skipped => {}
                TurnOutcome::Exit => {
                    writer
                        .write_all(format!("{FAREWELL}\n").as_bytes())
                        .await?;
                    break;
                }
                TurnOutcome::Reply(reply) => {
                    writer
                        .write_all(format!("{REPLY_PREFIX}{reply}\n").as_bytes())
                        .await?;
                }
            }
        }

        self.state = DriverState::Terminated;
        writer.flush().await?;
        Ok(())
    }
}
