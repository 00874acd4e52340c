use async_trait::async_trait;
use serde_json::Value;

use super::error::ToolInvokeError;
use crate::types::ToolDescriptor;

#[async_trait]
pub trait ToolServerInterface: Send + Sync {
    /// Tool catalogue advertised by the host.
    async fn list_tools(&self) -> Result<Vec<ToolDescriptor>, ToolInvokeError>;

    /// Invoke `tool` and return the raw MCP `tools/call` result.
    async fn invoke_tool(&self, tool: &str, arguments: Value) -> Result<Value, ToolInvokeError>;

    /// Free-form guidance the host sent during `initialize`, if any.
    async fn instructions(&self) -> Option<String>;
}
