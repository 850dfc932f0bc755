//! Visitor identity store.
//!
//! Produces the stable pseudonymous id that correlates a device's
//! conversations. The id is read from durable storage, generated and
//! written once if absent, and cached in memory for the life of the store.

use tokio::sync::Mutex;
use tracing::{debug, warn};

use zeny_types::identity::VisitorId;

use crate::storage::kv_store::KvStore;

/// Key of the visitor identity within the store namespace.
pub const VISITOR_ID_KEY: &str = "visitor_id";

/// Get-or-create wrapper around a [`KvStore`].
///
/// Storage failures are never fatal: if reading or writing fails, the
/// generated token is still returned and reused for the lifetime of this
/// store instance.
pub struct VisitorIdentityStore<K: KvStore> {
    kv: K,
    namespace: String,
    /// Resolved identity. The lock also serializes first-time resolution so
    /// concurrent callers cannot both generate and write a token.
    cached: Mutex<Option<VisitorId>>,
}

impl<K: KvStore> VisitorIdentityStore<K> {
    pub fn new(kv: K, namespace: impl Into<String>) -> Self {
        Self {
            kv,
            namespace: namespace.into(),
            cached: Mutex::new(None),
        }
    }

    /// Return the persisted visitor id, creating and persisting one on
    /// first use.
    pub async fn get_or_create(&self) -> VisitorId {
        let mut cached = self.cached.lock().await;
        if let Some(id) = cached.as_ref() {
            return id.clone();
        }

        let id = match self.kv.get(&self.namespace, VISITOR_ID_KEY).await {
            Ok(Some(stored)) if !stored.trim().is_empty() => {
                debug!(namespace = %self.namespace, "Loaded stored visitor id");
                VisitorId(stored)
            }
            Ok(_) => {
                let id = VisitorId::generate();
                match self.kv.set(&self.namespace, VISITOR_ID_KEY, id.as_str()).await {
                    Ok(()) => debug!(namespace = %self.namespace, "Persisted new visitor id"),
                    Err(e) => warn!(
                        namespace = %self.namespace,
                        "Could not persist visitor id, using in-memory id: {e}"
                    ),
                }
                id
            }
            Err(e) => {
                warn!(
                    namespace = %self.namespace,
                    "Visitor id storage unavailable, using in-memory id: {e}"
                );
                VisitorId::generate()
            }
        };

        *cached = Some(id.clone());
        id
    }

    /// Access the underlying store.
    pub fn kv(&self) -> &K {
        &self.kv
    }
}
