//! SQLite key-value store implementation.
//!
//! Implements `KvStore` from `zeny-core` using sqlx with split read/write
//! pools. Values are stored verbatim as text.

use chrono::Utc;
use sqlx::Row;

use zeny_core::storage::kv_store::KvStore;
use zeny_types::error::StorageError;

use super::pool::DatabasePool;

/// SQLite-backed implementation of `KvStore`.
#[derive(Clone)]
pub struct SqliteKvStore {
    pool: DatabasePool,
}

impl SqliteKvStore {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

fn query_error(e: sqlx::Error) -> StorageError {
    match e {
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
            StorageError::Unavailable(e.to_string())
        }
        other => StorageError::Query(other.to_string()),
    }
}

impl KvStore for SqliteKvStore {
    async fn get(&self, namespace: &str, key: &str) -> Result<Option<String>, StorageError> {
        let row = sqlx::query("SELECT value FROM client_kv WHERE namespace = ? AND key = ?")
            .bind(namespace)
            .bind(key)
            .fetch_optional(&self.pool.reader)
            .await
            .map_err(query_error)?;

        row.map(|row| {
            row.try_get::<String, _>("value")
                .map_err(|e| StorageError::InvalidValue(e.to_string()))
        })
        .transpose()
    }

    async fn set(&self, namespace: &str, key: &str, value: &str) -> Result<(), StorageError> {
        let now = Utc::now().to_rfc3339();

        sqlx::query(
            r#"INSERT INTO client_kv (namespace, key, value, created_at, updated_at)
               VALUES (?, ?, ?, ?, ?)
               ON CONFLICT (namespace, key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at"#,
        )
        .bind(namespace)
        .bind(key)
        .bind(value)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool.writer)
        .await
        .map_err(query_error)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sqlite::pool::default_database_url;

    async fn test_store(dir: &tempfile::TempDir) -> SqliteKvStore {
        let pool = DatabasePool::new(&default_database_url(dir.path()))
            .await
            .unwrap();
        SqliteKvStore::new(pool)
    }

    #[tokio::test]
    async fn test_get_missing_key() {
        let dir = tempfile::tempdir().unwrap();
        let store = test_store(&dir).await;
        assert_eq!(store.get("zeny.widget", "visitor_id").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_set_then_get_and_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let store = test_store(&dir).await;

        store.set("zeny.widget", "visitor_id", "visitor_a").await.unwrap();
        store.set("zeny.widget", "visitor_id", "visitor_b").await.unwrap();

        assert_eq!(
            store.get("zeny.widget", "visitor_id").await.unwrap().as_deref(),
            Some("visitor_b")
        );
    }

    #[tokio::test]
    async fn test_namespaces_are_isolated() {
        let dir = tempfile::tempdir().unwrap();
        let store = test_store(&dir).await;

        store.set("site-a", "visitor_id", "visitor_a").await.unwrap();

        assert_eq!(store.get("site-b", "visitor_id").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_value_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        {
            let store = test_store(&dir).await;
            store.set("zeny.widget", "visitor_id", "visitor_keep").await.unwrap();
        }

        let reopened = test_store(&dir).await;
        assert_eq!(
            reopened.get("zeny.widget", "visitor_id").await.unwrap().as_deref(),
            Some("visitor_keep")
        );
    }
}
