use super::error::ConfigError;
use serde::Deserialize;
use std::path::PathBuf;

pub const DEFAULT_DATABASE_PATH: &str = "orders.db";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Sqlite,
    Memory,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    pub path: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::Sqlite,
            path: PathBuf::from(DEFAULT_DATABASE_PATH),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub(super) struct RawStoreConfig {
    backend: Option<String>,
    path: Option<String>,
}

impl TryFrom<RawStoreConfig> for StoreConfig {
    type Error = ConfigError;

    fn try_from(raw: RawStoreConfig) -> Result<Self, Self::Error> {
        let normalized = raw.backend.as_deref().map(str::to_lowercase);
        let backend = match normalized.as_deref() {
            None | Some("sqlite") => StoreBackend::Sqlite,
            Some("memory") => StoreBackend::Memory,
            Some(_) => {
                return Err(ConfigError::InvalidStoreBackend {
                    backend: raw.backend.unwrap_or_default(),
                });
            }
        };
        let path = raw
            .path
            .map(|path| {
                shellexpand::full(&path)
                    .map(|cow| cow.into_owned())
                    .unwrap_or(path)
            })
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATABASE_PATH));
        Ok(Self { backend, path })
    }
}
