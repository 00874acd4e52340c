use super::{OrderStore, StoreError};
use async_trait::async_trait;
use tokio::sync::Mutex;

#[derive(Debug, Default)]
pub struct MemoryOrderStore {
    items: Mutex<Vec<String>>,
}

impl MemoryOrderStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl OrderStore for MemoryOrderStore {
    async fn insert(&self, item: &str) -> Result<(), StoreError> {
        self.items.lock().await.push(item.to_string());
        Ok(())
    }

    async fn delete_one(&self, item: &str) -> Result<bool, StoreError> {
        let mut items = self.items.lock().await;
        match items.iter().position(|existing| existing == item) {
            Some(index) => {
                items.remove(index);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn list(&self) -> Result<Vec<String>, StoreError> {
        Ok(self.items.lock().await.clone())
    }

    async fn count(&self) -> Result<u64, StoreError> {
        Ok(self.items.lock().await.len() as u64)
    }
}
