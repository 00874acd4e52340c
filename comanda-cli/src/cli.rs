use clap::Parser;
use comanda_core::config::ServerConfig;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "comanda-host",
    version,
    about = "Servidor MCP com as ferramentas de pedido (stdio)"
)]
pub struct HostCli {
    /// Configuration file (default: config/comanda.toml)
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// SQLite database file, recreated on every start
    #[arg(long, conflicts_with = "memory")]
    pub database: Option<PathBuf>,
    /// Keep the order in memory instead of SQLite
    #[arg(long)]
    pub memory: bool,
}

#[derive(Parser, Debug)]
#[command(
    name = "comanda",
    version,
    about = "Atendente de pedidos por chat, com ferramentas via MCP"
)]
pub struct AgentCli {
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Model name passed to the provider
    #[arg(long)]
    pub model: Option<String>,
    /// Replace the configured system prompt
    #[arg(long)]
    pub system: Option<String>,
    /// Tool host executable to launch
    #[arg(long)]
    pub host_command: Option<PathBuf>,
}

impl AgentCli {
    /// Hand `--config` on to the tool host so it reads the same `[store]` and
    /// `[address]` sections, unless the host args already name a file.
    pub fn forward_config(&self, host: &mut ServerConfig) {
        let Some(path) = self.config.as_ref() else {
            return;
        };
        let already_set = host
            .args
            .iter()
            .any(|arg| arg == "--config" || arg.starts_with("--config="));
        if already_set {
            return;
        }
        // The host may run from another workdir.
        let path = std::fs::canonicalize(path).unwrap_or_else(|_| path.clone());
        host.args.push("--config".into());
        host.args.push(path.display().to_string());
    }
}
