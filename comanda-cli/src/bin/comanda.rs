use clap::Parser;
use comanda_cli::cli::AgentCli;
use comanda_cli::init_tracing;
use comanda_core::AppConfig;
use comanda_core::agent::Agent;
use comanda_core::config::ServerConfig;
use comanda_core::driver::Driver;
use comanda_core::model::ProviderFactory;
use comanda_core::tooling::ToolHostClient;
use std::error::Error;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::io::{self, BufReader};
use tracing::{debug, error, info};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    init_tracing("warn");
    let cli = AgentCli::parse();
    debug!(?cli, "CLI arguments parsed");

    let mut config = AppConfig::load(cli.config.as_deref())?;
    cli.forward_config(&mut config.host);
    if let Some(model) = cli.model {
        config.model = model;
    }
    if let Some(system) = cli.system {
        config.agent.system_prompt = system;
    }
    if let Some(command) = cli.host_command {
        config.host.command = command;
        config.host.explicit = true;
    }
    resolve_host_command(&mut config.host);

    info!(command = %config.host.command.display(), "Starting tool host");
    let client = Arc::new(ToolHostClient::spawn(&config.host).await?);

    let provider = ProviderFactory::create(&config.provider);
    let agent = Agent::new(
        provider,
        config.model.clone(),
        config.agent.clone(),
        client.clone(),
    );

    let outcome = async {
        let mut driver =
            Driver::start(client.as_ref(), Arc::new(agent), config.agent.history_window).await?;
        driver.run(BufReader::new(io::stdin()), io::stdout()).await
    }
    .await;

    client.shutdown().await;
    if let Err(err) = outcome {
        error!(%err, "Chat session failed");
        eprintln!("{}", err.user_message());
        return Err(err.into());
    }
    Ok(())
}

/// Prefer a `comanda-host` installed next to this executable when no host
/// command was configured.
fn resolve_host_command(host: &mut ServerConfig) {
    if host.explicit {
        return;
    }
    let sibling = std::env::current_exe().ok().and_then(|exe| {
        let candidate: PathBuf = exe
            .parent()?
            .join(format!("{}{}", host.command.display(), std::env::consts::EXE_SUFFIX));
        candidate.is_file().then_some(candidate)
    });
    if let Some(path) = sibling {
        debug!(path = %path.display(), "Using tool host next to the executable");
        host.command = path;
    }
}
