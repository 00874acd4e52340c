use super::tools::{OrderTools, ToolCallError};
use crate::constants::{HOST_SERVER_NAME, PROTOCOL_VERSION};
use crate::rpc::types::{INTERNAL_ERROR, JSONRPC_VERSION, RpcRequest, RpcResponse};
use crate::store::StoreError;
use serde_json::{Value, json};
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, error, info, warn};

const HOST_INSTRUCTIONS: &str = "Ferramentas de pedido de uma lanchonete. Cada chamada de insert_order adiciona uma unidade; o valor total é sempre calculado por order_cost.";

#[derive(Debug, Error)]
pub enum HostError {
    #[error("stdin/stdout I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to serialize response: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error(transparent)]
    Store(#[from] StoreError),
}

enum Reply {
    Respond(RpcResponse),
    Silent,
    /// Answer the caller, then stop serving.
    Abort(RpcResponse, StoreError),
}

/// MCP server over a newline-delimited JSON-RPC stream.
pub struct ToolHost {
    tools: OrderTools,
}

impl ToolHost {
    pub fn new(tools: OrderTools) -> Self {
        Self { tools }
    }

    /// Serve requests one at a time until the reader is exhausted.
    ///
    /// Store failures are answered with an internal error and then returned,
    /// which ends the session.
    pub async fn serve<R, W>(&self, reader: R, mut writer: W) -> Result<(), HostError>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut lines = reader.lines();
        info!("Tool host ready");

        while let Some(line) = lines.next_line().await? {
            if line.trim().is_empty() {
                continue;
            }

            let request = match serde_json::from_str::<RpcRequest>(&line) {
                Ok(request) => request,
                Err(err) => {
                    warn!(%err, "Failed to parse JSON-RPC line");
                    write_response(&mut writer, &RpcResponse::parse_error(err.to_string()))
                        .await?;
                    continue;
                }
            };

            match self.handle(request).await {
                Reply::Respond(response) => write_response(&mut writer, &response).await?,
                Reply::Silent => {}
                Reply::Abort(response, err) => {
                    error!(%err, "Order store failed; stopping tool host");
                    write_response(&mut writer, &response).await?;
                    return Err(err.into());
                }
            }
        }

        info!("Input closed; tool host shutting down");
        Ok(())
    }

    async fn handle(&self, request: RpcRequest) -> Reply {
        debug!(method = %request.method, "Received JSON-RPC request");

        if request.jsonrpc != JSONRPC_VERSION {
            return Reply::Respond(RpcResponse::invalid_request(
                request.id,
                "Unsupported jsonrpc version (expected 2.0)",
            ));
        }

        if request.is_notification() {
            debug!(method = %request.method, "Notification acknowledged");
            return Reply::Silent;
        }

        let id = request.id.clone();
        match request.method.as_str() {
            "initialize" => Reply::Respond(RpcResponse::success(id, initialize_result())),
            "ping" => Reply::Respond(RpcResponse::success(id, json!({}))),
            "tools/list" => Reply::Respond(RpcResponse::success(
                id,
                json!({ "tools": OrderTools::descriptors() }),
            )),
            "tools/call" => self.handle_tool_call(id, request.params).await,
            other => {
                warn!(method = other, "Unknown JSON-RPC method");
                Reply::Respond(RpcResponse::method_not_found(id, other))
            }
        }
    }

    async fn handle_tool_call(&self, id: Option<Value>, params: Option<Value>) -> Reply {
        let Some(Value::Object(mut params)) = params else {
            return Reply::Respond(RpcResponse::invalid_params(
                id,
                "params must be an object with name",
            ));
        };
        let Some(name) = params
            .get("name")
            .and_then(Value::as_str)
            .map(ToOwned::to_owned)
        else {
            return Reply::Respond(RpcResponse::invalid_params(
                id,
                "params.name must be a string",
            ));
        };
        let arguments = params.remove("arguments").unwrap_or(Value::Null);

        match self.tools.call(&name, arguments).await {
            Ok(output) => {
                info!(tool = %name, "Tool call completed");
                Reply::Respond(RpcResponse::success(id, output.into_call_result()))
            }
            Err(ToolCallError::Store(err)) => Reply::Abort(
                RpcResponse::error(id, INTERNAL_ERROR, err.to_string()),
                err,
            ),
            Err(err) => {
                warn!(tool = %name, %err, "Rejected tool call");
                Reply::Respond(RpcResponse::invalid_params(id, err.to_string()))
            }
        }
    }
}

fn initialize_result() -> Value {
    json!({
        "protocolVersion": PROTOCOL_VERSION,
        "capabilities": {
            "tools": { "listChanged": false }
        },
        "serverInfo": {
            "name": HOST_SERVER_NAME,
            "version": env!("CARGO_PKG_VERSION"),
        },
        "instructions": HOST_INSTRUCTIONS,
    })
}

async fn write_response<W>(writer: &mut W, response: &RpcResponse) -> Result<(), HostError>
where
    W: AsyncWrite + Unpin,
{
    let mut payload = serde_json::to_vec(response)?;
    payload.push(b'\n');
    writer.write_all(&payload).await?;
    writer.flush().await?;
    Ok(())
}
