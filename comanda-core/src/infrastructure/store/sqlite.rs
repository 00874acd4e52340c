use super::{OrderStore, StoreError};
use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Drops any previous session's orders before recreating the table.
const RESET_SCHEMA: &str = r#"
DROP TABLE IF EXISTS orders;

CREATE TABLE orders (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    item TEXT NOT NULL
);
"#;

/// SQLite-backed order table.
#[derive(Debug, Clone)]
pub struct SqliteOrderStore {
    pool: SqlitePool,
    path: PathBuf,
}

impl SqliteOrderStore {
    /// Open the database at `path`, discarding whatever orders it held.
    ///
    /// Creates the file and parent directories if they don't exist.
    pub async fn open_fresh(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| StoreError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);

        // Access is serialized by the host's single transport channel.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await?;

        sqlx::raw_sql(RESET_SCHEMA).execute(&pool).await?;
        debug!(path = %path.display(), "Order table recreated");

        Ok(Self {
            pool,
            path: path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[async_trait]
impl OrderStore for SqliteOrderStore {
    async fn insert(&self, item: &str) -> Result<(), StoreError> {
        sqlx::query("INSERT INTO orders (item) VALUES (?)")
            .bind(item)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn delete_one(&self, item: &str) -> Result<bool, StoreError> {
        let result = sqlx::query(
            "DELETE FROM orders WHERE id = (SELECT id FROM orders WHERE item = ? ORDER BY id LIMIT 1)",
        )
        .bind(item)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list(&self) -> Result<Vec<String>, StoreError> {
        let items = sqlx::query_scalar::<_, String>("SELECT item FROM orders ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        Ok(items)
    }

    async fn count(&self) -> Result<u64, StoreError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM orders")
            .fetch_one(&self.pool)
            .await?;
        Ok(count.max(0) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn reopening_discards_previous_orders() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("data").join("orders.db");

        let first = SqliteOrderStore::open_fresh(&path).await.expect("open");
        first.insert("pastel").await.expect("insert");
        first.insert("caldo de cana").await.expect("insert");
        assert_eq!(first.count().await.expect("count"), 2);
        first.close().await;

        let second = SqliteOrderStore::open_fresh(&path).await.expect("reopen");
        assert!(second.list().await.expect("list").is_empty());
        assert_eq!(second.path(), path.as_path());
    }

    #[tokio::test]
    async fn delete_targets_oldest_matching_row() {
        let dir = tempfile::tempdir().expect("tempdir");
        let store = SqliteOrderStore::open_fresh(&dir.path().join("orders.db"))
            .await
            .expect("open");
        for item in ["coxinha", "refrigerante", "coxinha"] {
            store.insert(item).await.expect("insert");
        }

        assert!(store.delete_one("coxinha").await.expect("delete"));
        assert!(!store.delete_one("esfiha").await.expect("delete"));
        assert_eq!(
            store.list().await.expect("list"),
            vec!["refrigerante", "coxinha"]
        );
    }
}
