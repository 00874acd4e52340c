//! Application constants
//!
//! Single source of truth for paths and other constants.

/// Default configuration file path
pub const CONFIG_PATH: &str = "config/comanda.toml";

/// Default environment file path
pub const ENV_PATH: &str = "config/.env";

/// Flat price charged per order item
pub const UNIT_PRICE: u64 = 10;

/// Phrases that end the interactive session (compared case-insensitively)
pub const EXIT_PHRASES: [&str; 3] = ["sair", "exit", "quit"];

/// MCP protocol revision spoken by both the host and its client
pub const PROTOCOL_VERSION: &str = "2025-06-18";

/// Name the tool host reports in `initialize`
pub const HOST_SERVER_NAME: &str = "comanda-host";

/// Returned by `delivery_address` whenever the remote lookup does not succeed
pub const ADDRESS_LOOKUP_FAILURE: &str =
    "Não foi possível consultar o endereço para o CEP informado.";
