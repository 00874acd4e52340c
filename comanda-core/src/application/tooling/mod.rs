//! Client side of the tool-invocation channel.

mod client;
mod error;
mod interface;

pub use client::ToolHostClient;
pub use error::ToolInvokeError;
pub use interface::ToolServerInterface;
