//! The client's local store: SQLite when the data directory is usable,
//! otherwise process memory.

use std::path::Path;

use tracing::warn;

use zeny_core::storage::kv_store::KvStore;
use zeny_types::error::StorageError;

use super::memory::MemoryKvStore;
use crate::sqlite::kv::SqliteKvStore;
use crate::sqlite::pool::{DatabasePool, default_database_url};

pub enum LocalKvStore {
    Sqlite(SqliteKvStore),
    Memory(MemoryKvStore),
}

impl LocalKvStore {
    /// Open `{data_dir}/zeny.db`, falling back to memory if the directory
    /// or database cannot be opened. Never fails.
    pub async fn open(data_dir: &Path) -> Self {
        if let Err(e) = tokio::fs::create_dir_all(data_dir).await {
            warn!(path = %data_dir.display(), error = %e, "Data directory unavailable, identity will not persist");
            return Self::Memory(MemoryKvStore::new());
        }

        match DatabasePool::new(&default_database_url(data_dir)).await {
            Ok(pool) => Self::Sqlite(SqliteKvStore::new(pool)),
            Err(e) => {
                warn!(error = %e, "Local database unavailable, identity will not persist");
                Self::Memory(MemoryKvStore::new())
            }
        }
    }

    pub fn is_persistent(&self) -> bool {
        matches!(self, Self::Sqlite(_))
    }
}

impl KvStore for LocalKvStore {
    async fn get(&self, namespace: &str, key: &str) -> Result<Option<String>, StorageError> {
        match self {
            Self::Sqlite(store) => store.get(namespace, key).await,
            Self::Memory(store) => store.get(namespace, key).await,
        }
    }

    async fn set(&self, namespace: &str, key: &str, value: &str) -> Result<(), StorageError> {
        match self {
            Self::Sqlite(store) => store.set(namespace, key, value).await,
            Self::Memory(store) => store.set(namespace, key, value).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_open_uses_sqlite_in_writable_dir() {
        let dir = tempfile::tempdir().unwrap();
        let store = LocalKvStore::open(&dir.path().join("nested")).await;
        assert!(store.is_persistent());
        store.set("ns", "k", "v").await.unwrap();
        assert_eq!(store.get("ns", "k").await.unwrap().as_deref(), Some("v"));
    }

    #[tokio::test]
    async fn test_open_falls_back_to_memory() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("not-a-dir");
        std::fs::write(&blocker, "file").unwrap();

        let store = LocalKvStore::open(&blocker).await;

        assert!(!store.is_persistent());
        store.set("ns", "k", "v").await.unwrap();
        assert_eq!(store.get("ns", "k").await.unwrap().as_deref(), Some("v"));
    }
}
