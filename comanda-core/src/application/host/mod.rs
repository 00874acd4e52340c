//! The Tool Host: order operations exposed over MCP stdio.

mod server;
mod tools;

pub use server::{HostError, ToolHost};
pub use tools::{
    DELETE_ORDER, DELIVERY_ADDRESS, INSERT_ORDER, ORDER_COST, OrderTools, SEARCH_ORDER,
    ToolCallError, ToolOutput,
};
