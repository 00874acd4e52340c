use thiserror::Error;

#[derive(Debug, Error)]
pub enum ToolInvokeError {
    #[error("failed to spawn tool host '{server}': {source}")]
    Spawn {
        server: String,
        #[source]
        source: std::io::Error,
    },
    #[error("tool host '{server}' transport error: {message}")]
    Transport { server: String, message: String },
    #[error("tool host '{server}' returned invalid JSON: {source}")]
    InvalidJson {
        server: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("tool host '{server}' returned JSON-RPC error {code}: {message}")]
    Rpc {
        server: String,
        code: i64,
        message: String,
    },
    #[error("tool host '{server}' terminated unexpectedly")]
    Terminated { server: String },
    #[error("tool host '{server}' request cancelled")]
    Cancelled { server: String },
}
