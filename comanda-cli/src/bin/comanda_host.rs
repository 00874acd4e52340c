use clap::Parser;
use comanda_cli::cli::HostCli;
use comanda_cli::init_tracing;
use comanda_core::AppConfig;
use comanda_core::address::{AddressLookup, HttpAddressLookup, UnconfiguredAddressLookup};
use comanda_core::config::StoreBackend;
use comanda_core::host::{OrderTools, ToolHost};
use comanda_core::store::open_store;
use std::error::Error;
use std::sync::Arc;
use tokio::io::{self, BufReader};
use tracing::{debug, error, info, warn};

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    init_tracing("info");
    let cli = HostCli::parse();
    debug!(?cli, "CLI arguments parsed");

    let mut config = AppConfig::load(cli.config.as_deref())?;
    if cli.memory {
        config.store.backend = StoreBackend::Memory;
    }
    if let Some(path) = cli.database {
        config.store.backend = StoreBackend::Sqlite;
        config.store.path = path;
    }

    let store = open_store(&config.store).await?;
    let address: Arc<dyn AddressLookup> = match config.address {
        Some(service) => {
            info!(url = %service.url, "Address lookup enabled");
            Arc::new(HttpAddressLookup::from_config(service))
        }
        None => {
            warn!("No [address] section configured; delivery_address will report failures");
            Arc::new(UnconfiguredAddressLookup)
        }
    };

    let host = ToolHost::new(OrderTools::new(store, address));
    if let Err(err) = host.serve(BufReader::new(io::stdin()), io::stdout()).await {
        error!(%err, "Tool host stopped");
        return Err(err.into());
    }
    info!("Tool host finished");
    Ok(())
}
