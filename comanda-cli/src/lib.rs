//! Command-line front ends for the chat agent and the tool host.

pub mod cli;

use tracing_subscriber::{EnvFilter, fmt};

/// Install the global subscriber once. Logs go to stderr because stdout
/// carries the MCP channel (host) or the chat transcript (agent).
pub fn init_tracing(default_level: &str) {
    static INIT: std::sync::Once = std::sync::Once::new();
    INIT.call_once(|| {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
        fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_level(true)
            .init();
    });
}
