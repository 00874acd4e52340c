use super::error::ToolInvokeError;
use super::interface::ToolServerInterface;
use crate::config::ServerConfig;
use crate::constants::PROTOCOL_VERSION;
use crate::rpc::{RpcRequest, RpcResponse};
use crate::types::ToolDescriptor;
use async_trait::async_trait;
use serde::Serialize;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::process::Stdio;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::io::{AsyncBufReadExt, AsyncRead, AsyncWrite, AsyncWriteExt, BufReader, BufWriter};
use tokio::process::{Child, Command};
use tokio::sync::{Mutex as AsyncMutex, oneshot};
use tracing::{debug, info, warn};

type BoxedWriter = Box<dyn AsyncWrite + Send + Unpin>;
type Responder = oneshot::Sender<Result<Value, ToolInvokeError>>;

const LIST_CHANGED: &str = "notifications/tools/list_changed";

/// MCP session with the tool host.
///
/// Requests carry ids of the form `req-N`; a background task reads the host's
/// output and completes the matching pending request.
#[derive(Clone)]
pub struct ToolHostClient {
    session: Arc<Session>,
}

struct Session {
    server: String,
    child: AsyncMutex<Option<Child>>,
    writer: AsyncMutex<Option<BufWriter<BoxedWriter>>>,
    pending: AsyncMutex<HashMap<String, Responder>>,
    next_id: AtomicU64,
    catalogue: AsyncMutex<Catalogue>,
}

#[derive(Default)]
struct Catalogue {
    instructions: Option<String>,
    tools: Vec<ToolDescriptor>,
}

impl ToolHostClient {
    /// Launch the host process and complete the MCP handshake.
    pub async fn spawn(config: &ServerConfig) -> Result<Self, ToolInvokeError> {
        let mut command = Command::new(&config.command);
        command
            .args(&config.args)
            .envs(&config.env)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true);
        if let Some(dir) = &config.workdir {
            command.current_dir(dir);
        }

        let mut child = command.spawn().map_err(|source| ToolInvokeError::Spawn {
            server: config.name.clone(),
            source,
        })?;
        let (Some(stdin), Some(stdout)) = (child.stdin.take(), child.stdout.take()) else {
            return Err(ToolInvokeError::Transport {
                server: config.name.clone(),
                message: "host stdio was not captured".to_string(),
            });
        };

        info!(
            server = %config.name,
            command = %config.command.display(),
            pid = child.id(),
            "Spawned tool host"
        );
        Self::handshake(config.name.clone(), stdout, Box::new(stdin), Some(child)).await
    }

    /// Run the MCP handshake over already-connected streams.
    pub async fn connect<R, W>(
        server: impl Into<String>,
        reader: R,
        writer: W,
    ) -> Result<Self, ToolInvokeError>
    where
        R: AsyncRead + Send + Unpin + 'static,
        W: AsyncWrite + Send + Unpin + 'static,
    {
        Self::handshake(server.into(), reader, Box::new(writer), None).await
    }

    /// Close the channel and stop the host process. Pending calls fail with
    /// [`ToolInvokeError::Terminated`].
    pub async fn shutdown(&self) {
        self.session.close().await;
    }

    async fn handshake<R>(
        server: String,
        reader: R,
        writer: BoxedWriter,
        child: Option<Child>,
    ) -> Result<Self, ToolInvokeError>
    where
        R: AsyncRead + Send + Unpin + 'static,
    {
        let session = Arc::new(Session {
            server,
            child: AsyncMutex::new(child),
            writer: AsyncMutex::new(Some(BufWriter::new(writer))),
            pending: AsyncMutex::new(HashMap::new()),
            next_id: AtomicU64::new(1),
            catalogue: AsyncMutex::new(Catalogue::default()),
        });
        tokio::spawn(Arc::clone(&session).read_loop(reader));

        if let Err(err) = session.initialize().await {
            session.close().await;
            return Err(err);
        }
        Ok(Self { session })
    }
}

#[async_trait]
impl ToolServerInterface for ToolHostClient {
    async fn list_tools(&self) -> Result<Vec<ToolDescriptor>, ToolInvokeError> {
        self.session.refresh_tools().await
    }

    async fn invoke_tool(&self, tool: &str, arguments: Value) -> Result<Value, ToolInvokeError> {
        let arguments = if arguments.is_null() {
            json!({})
        } else {
            arguments
        };
        self.session
            .request("tools/call", json!({ "name": tool, "arguments": arguments }))
            .await
    }

    async fn instructions(&self) -> Option<String> {
        self.session.catalogue.lock().await.instructions.clone()
    }
}

impl Session {
    async fn initialize(&self) -> Result<(), ToolInvokeError> {
        let result = self
            .request(
                "initialize",
                json!({
                    "protocolVersion": PROTOCOL_VERSION,
                    "clientInfo": {
                        "name": env!("CARGO_PKG_NAME"),
                        "version": env!("CARGO_PKG_VERSION"),
                    },
                    "capabilities": {}
                }),
            )
            .await?;
        if let Some(version) = result.get("protocolVersion").and_then(Value::as_str) {
            if version != PROTOCOL_VERSION {
                warn!(server = %self.server, version, "Tool host negotiated a different protocol version");
            }
        }
        self.catalogue.lock().await.instructions = result
            .get("instructions")
            .and_then(Value::as_str)
            .map(str::to_string);

        self.write_frame(&RpcRequest::new(None, "notifications/initialized", json!({})))
            .await?;
        let tools = self.refresh_tools().await?;
        debug!(server = %self.server, tools = tools.len(), "MCP handshake complete");
        Ok(())
    }

    async fn refresh_tools(&self) -> Result<Vec<ToolDescriptor>, ToolInvokeError> {
        let result = self.request("tools/list", json!({})).await?;
        let entries = match result.get("tools") {
            Some(Value::Array(entries)) => entries.clone(),
            _ => Vec::new(),
        };

        let mut tools = Vec::with_capacity(entries.len());
        for entry in entries {
            match serde_json::from_value::<ToolDescriptor>(entry) {
                Ok(tool) => tools.push(tool),
                Err(err) => warn!(server = %self.server, %err, "Skipping malformed tool descriptor"),
            }
        }
        self.catalogue.lock().await.tools = tools.clone();
        Ok(tools)
    }

    async fn request(&self, method: &str, params: Value) -> Result<Value, ToolInvokeError> {
        let id = format!("req-{}", self.next_id.fetch_add(1, Ordering::SeqCst));
        let (tx, rx) = oneshot::channel();
        self.pending.lock().await.insert(id.clone(), tx);

        let frame = RpcRequest::new(Some(Value::String(id.clone())), method, params);
        if let Err(err) = self.write_frame(&frame).await {
            self.pending.lock().await.remove(&id);
            return Err(err);
        }
        debug!(server = %self.server, method, request_id = %id, "Request sent");

        rx.await.unwrap_or_else(|_| {
            Err(ToolInvokeError::Cancelled {
                server: self.server.clone(),
            })
        })
    }

    async fn write_frame<T: Serialize>(&self, frame: &T) -> Result<(), ToolInvokeError> {
        let mut line = serde_json::to_vec(frame).map_err(|source| ToolInvokeError::InvalidJson {
            server: self.server.clone(),
            source,
        })?;
        line.push(b'\n');

        let mut guard = self.writer.lock().await;
        let Some(writer) = guard.as_mut() else {
            return Err(ToolInvokeError::Terminated {
                server: self.server.clone(),
            });
        };
        let written = match writer.write_all(&line).await {
            Ok(()) => writer.flush().await,
            Err(err) => Err(err),
        };
        written.map_err(|err| ToolInvokeError::Transport {
            server: self.server.clone(),
            message: err.to_string(),
        })
    }

    async fn read_loop<R>(self: Arc<Self>, reader: R)
    where
        R: AsyncRead + Unpin,
    {
        let mut lines = BufReader::new(reader).lines();
        loop {
            let line = match lines.next_line().await {
                Ok(Some(line)) => line,
                Ok(None) => break,
                Err(err) => {
                    warn!(server = %self.server, %err, "Failed to read from tool host");
                    break;
                }
            };
            if line.trim().is_empty() {
                continue;
            }
            if let Err(err) = self.dispatch(&line).await {
                warn!(server = %self.server, %err, "Dropping message from tool host");
            }
        }

        debug!(server = %self.server, "Tool host output closed");
        self.close().await;
    }

    async fn dispatch(self: &Arc<Self>, line: &str) -> Result<(), ToolInvokeError> {
        let invalid = |source| ToolInvokeError::InvalidJson {
            server: self.server.clone(),
            source,
        };
        let value: Value = serde_json::from_str(line).map_err(invalid)?;

        if value.get("method").is_none() {
            let response: RpcResponse = serde_json::from_value(value).map_err(invalid)?;
            self.complete(response).await;
            return Ok(());
        }

        let request: RpcRequest = serde_json::from_value(value).map_err(invalid)?;
        match (request.id, request.method.as_str()) {
            (None, LIST_CHANGED) => {
                debug!(server = %self.server, "Tool list changed; refreshing");
                // The refresh waits on a reply that only this read loop can deliver.
                let session = Arc::clone(self);
                tokio::spawn(async move {
                    if let Err(err) = session.refresh_tools().await {
                        warn!(server = %session.server, %err, "Failed to refresh tool catalogue");
                    }
                });
                Ok(())
            }
            (None, method) => {
                debug!(server = %self.server, method, "Ignoring notification");
                Ok(())
            }
            (Some(id), "ping") => {
                self.write_frame(&RpcResponse::success(Some(id), json!({})))
                    .await
            }
            (Some(id), method) => {
                warn!(server = %self.server, method, "Tool host sent an unsupported request");
                self.write_frame(&RpcResponse::method_not_found(Some(id), method))
                    .await
            }
        }
    }

    async fn complete(&self, response: RpcResponse) {
        let key = match &response.id {
            Some(Value::String(id)) => id.clone(),
            Some(Value::Number(id)) => id.to_string(),
            _ => {
                debug!(server = %self.server, "Response without usable id");
                return;
            }
        };
        let Some(responder) = self.pending.lock().await.remove(&key) else {
            debug!(server = %self.server, response_id = %key, "Response for unknown request");
            return;
        };

        let outcome = response.into_outcome().map_err(|error| ToolInvokeError::Rpc {
            server: self.server.clone(),
            code: error.code,
            message: error.message,
        });
        let _ = responder.send(outcome);
    }

    /// Idempotent: drop the writer, stop the child, fail whatever is pending.
    async fn close(&self) {
        self.writer.lock().await.take();

        if let Some(mut child) = self.child.lock().await.take() {
            if let Err(err) = child.kill().await {
                debug!(server = %self.server, %err, "Tool host already exited");
            }
        }

        let pending: Vec<Responder> = self
            .pending
            .lock()
            .await
            .drain()
            .map(|(_, responder)| responder)
            .collect();
        for responder in pending {
            let _ = responder.send(Err(ToolInvokeError::Terminated {
                server: self.server.clone(),
            }));
        }

        *self.catalogue.lock().await = Catalogue::default();
    }
}
