pub mod address;
pub mod agent;
pub mod error;
pub mod loader;
pub mod provider;
pub mod server;
pub mod store;

pub use crate::constants::CONFIG_PATH;
pub use address::AddressServiceConfig;
pub use agent::{AgentConfig, DEFAULT_SYSTEM_PROMPT};
pub use error::ConfigError;
pub use loader::{ensure_env_loaded, resolve_secret};
pub use provider::ModelProviderConfig;
pub use server::ServerConfig;
pub use store::{StoreBackend, StoreConfig};

use std::path::Path;

pub const DEFAULT_MODEL: &str = "llama3";

/// Settings shared by the agent driver and the tool host.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub model: String,
    pub provider: ModelProviderConfig,
    pub host: ServerConfig,
    pub store: StoreConfig,
    pub address: Option<AddressServiceConfig>,
    pub agent: AgentConfig,
}

impl AppConfig {
    /// Load configuration from `path`, or from [`CONFIG_PATH`] when `None`.
    ///
    /// An explicit path must exist. A missing default file yields
    /// [`AppConfig::default`].
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        loader::load_config(path)
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            provider: ModelProviderConfig::default(),
            host: ServerConfig::default(),
            store: StoreConfig::default(),
            address: None,
            agent: AgentConfig::default(),
        }
    }
}
