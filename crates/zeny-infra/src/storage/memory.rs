//! In-process key-value store.
//!
//! Used when the on-disk database cannot be opened, and in tests. Values
//! live for the lifetime of the process only.

use dashmap::DashMap;

use zeny_core::storage::kv_store::KvStore;
use zeny_types::error::StorageError;

#[derive(Debug, Default)]
pub struct MemoryKvStore {
    entries: DashMap<(String, String), String>,
}

impl MemoryKvStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KvStore for MemoryKvStore {
    async fn get(&self, namespace: &str, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self
            .entries
            .get(&(namespace.to_string(), key.to_string()))
            .map(|v| v.value().clone()))
    }

    async fn set(&self, namespace: &str, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries
            .insert((namespace.to_string(), key.to_string()), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_get_by_namespace() {
        let store = MemoryKvStore::new();
        store.set("a", "visitor_id", "visitor_1").await.unwrap();

        assert_eq!(store.get("a", "visitor_id").await.unwrap().as_deref(), Some("visitor_1"));
        assert_eq!(store.get("b", "visitor_id").await.unwrap(), None);
    }
}
