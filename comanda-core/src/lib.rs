//! Order-taking chat agent wired to a small MCP tool host.
//!
//! The crate has two halves that only talk through JSON-RPC tool calls:
//!
//! - [`host`] owns the order store and answers `insert_order`, `delete_order`,
//!   `search_order`, `order_cost` and `delivery_address` over stdio.
//! - [`driver`] runs the interactive loop, handing each turn to a
//!   [`agent::TurnProcessor`] that decides which tools to call.

pub mod application;
pub mod config;
pub mod constants;
pub mod domain;
pub mod infrastructure;

pub use application::{agent, conversation, driver, host, tooling};
pub use config::{AppConfig, ConfigError};
pub use domain::types;
pub use infrastructure::{address, model, rpc, store};
