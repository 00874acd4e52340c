use super::address::{AddressServiceConfig, RawAddressConfig};
use super::agent::{AgentConfig, RawAgentConfig};
use super::error::ConfigError;
use super::provider::{ModelProviderConfig, RawProviderConfig};
use super::server::{RawServer, ServerConfig};
use super::store::{RawStoreConfig, StoreConfig};
use super::{AppConfig, CONFIG_PATH, DEFAULT_MODEL};
use crate::constants::ENV_PATH;
use dotenvy::from_filename;
use serde::Deserialize;
use std::env;
use std::fs;
use std::io;
use std::path::Path;
use std::sync::Once;
use tracing::{debug, info, warn};

static ENV_LOADER: Once = Once::new();

/// Raw configuration structure for deserialization from TOML
#[derive(Debug, Deserialize, Default)]
pub(super) struct RawConfig {
    pub model: Option<String>,
    pub provider: Option<RawProviderConfig>,
    pub host: Option<RawServer>,
    pub store: Option<RawStoreConfig>,
    pub address: Option<RawAddressConfig>,
    pub agent: Option<RawAgentConfig>,
}

/// Ensures environment variables are loaded from config/.env
pub fn ensure_env_loaded() {
    ENV_LOADER.call_once(|| {
        if from_filename(ENV_PATH).is_ok() {
            debug!(path = ENV_PATH, "Loaded environment file");
        }
    });
}

/// Resolve a secret whose configured value names an environment variable.
pub fn resolve_secret(owner: &str, var_name: Option<&str>) -> Option<String> {
    let raw = var_name.map(str::trim)?;
    if raw.is_empty() {
        return None;
    }
    ensure_env_loaded();
    match env::var(raw) {
        Ok(value) => Some(value),
        Err(err) => {
            warn!(owner, env_var = raw, %err, "Secret environment variable is not set");
            None
        }
    }
}

/// Load and validate configuration from a file path
pub fn load_config(path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    ensure_env_loaded();
    if let Some(path) = path {
        return read_config(path);
    }
    match read_config(Path::new(CONFIG_PATH)) {
        Err(ConfigError::NotFound { .. }) => {
            info!("Configuration file not found; using defaults");
            Ok(AppConfig::default())
        }
        other => other,
    }
}

fn read_config(path: &Path) -> Result<AppConfig, ConfigError> {
    debug!(path = %path.display(), "Reading configuration file");

    let content = fs::read_to_string(path).map_err(|source| {
        if source.kind() == io::ErrorKind::NotFound {
            ConfigError::NotFound {
                path: path.to_path_buf(),
            }
        } else {
            ConfigError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    })?;

    let parsed: RawConfig = toml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    validate_and_build(parsed)
}

fn validate_and_build(parsed: RawConfig) -> Result<AppConfig, ConfigError> {
    let host = match parsed.host {
        Some(raw) => {
            let host = ServerConfig::from(raw);
            if host.command.as_os_str().is_empty() {
                return Err(ConfigError::EmptyHostCommand);
            }
            host
        }
        None => ServerConfig::default(),
    };

    let address = match parsed.address {
        Some(raw) => {
            let address = AddressServiceConfig::from(raw);
            if address.url.trim().is_empty() {
                return Err(ConfigError::EmptyAddressUrl);
            }
            Some(address)
        }
        None => None,
    };

    Ok(AppConfig {
        model: parsed
            .model
            .filter(|model| !model.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
        provider: parsed
            .provider
            .map(ModelProviderConfig::from)
            .unwrap_or_default(),
        host,
        store: parsed
            .store
            .map(StoreConfig::try_from)
            .transpose()?
            .unwrap_or_default(),
        address,
        agent: parsed.agent.map(AgentConfig::from).unwrap_or_default(),
    })
}
