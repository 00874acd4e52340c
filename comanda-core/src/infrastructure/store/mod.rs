//! Order persistence.
//!
//! The tool host only ever sees [`OrderStore`]; the backend is picked from
//! [`StoreConfig`] at startup and always starts empty.

mod memory;
mod sqlite;

pub use memory::MemoryOrderStore;
pub use sqlite::SqliteOrderStore;

use crate::config::{StoreBackend, StoreConfig};
use async_trait::async_trait;
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("order database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("failed to prepare order database at {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Multiset of order item names, kept in insertion order.
#[async_trait]
pub trait OrderStore: Send + Sync {
    async fn insert(&self, item: &str) -> Result<(), StoreError>;

    /// Removes the earliest entry equal to `item`. Returns whether one was found.
    async fn delete_one(&self, item: &str) -> Result<bool, StoreError>;

    async fn list(&self) -> Result<Vec<String>, StoreError>;

    async fn count(&self) -> Result<u64, StoreError> {
        Ok(self.list().await?.len() as u64)
    }
}

/// Open a fresh, empty store for the configured backend.
pub async fn open_store(config: &StoreConfig) -> Result<Arc<dyn OrderStore>, StoreError> {
    match config.backend {
        StoreBackend::Memory => {
            info!("Using in-memory order store");
            Ok(Arc::new(MemoryOrderStore::new()))
        }
        StoreBackend::Sqlite => {
            let store = SqliteOrderStore::open_fresh(&config.path).await?;
            info!(path = %config.path.display(), "Using SQLite order store");
            Ok(Arc::new(store))
        }
    }
}
