//! Key-value store trait.
//!
//! Durable client-side storage, the equivalent of a browser's local storage.
//! Implementations live in zeny-infra.

use zeny_types::error::StorageError;

/// Trait for namespaced, durable string storage.
///
/// Values are plain strings keyed by `(namespace, key)`.
/// Uses RPITIT (native async fn in traits, Rust 2024 edition).
pub trait KvStore: Send + Sync {
    /// Get a value by key. Returns None if the key does not exist.
    fn get(
        &self,
        namespace: &str,
        key: &str,
    ) -> impl std::future::Future<Output = Result<Option<String>, StorageError>> + Send;

    /// Set a value for a key (upsert).
    fn set(
        &self,
        namespace: &str,
        key: &str,
        value: &str,
    ) -> impl std::future::Future<Output = Result<(), StorageError>> + Send;
}
