//! Application state wiring the client together.
//!
//! AppState pins the generic core components to the concrete infra
//! implementations: the HTTP backend client and the local key-value store.

use std::path::PathBuf;
use std::sync::Arc;

use zeny_core::identity::store::VisitorIdentityStore;
use zeny_core::registry::view::RegistryView;
use zeny_core::review::surface::ReviewSurface;
use zeny_infra::config::{load_client_config, resolve_data_dir};
use zeny_infra::http::client::HttpApiClient;
use zeny_infra::storage::local::LocalKvStore;
use zeny_types::config::ClientConfig;

pub type ConcreteIdentityStore = VisitorIdentityStore<LocalKvStore>;

pub struct AppState {
    pub config: ClientConfig,
    pub data_dir: PathBuf,
    pub api: Arc<HttpApiClient>,
    pub identity: ConcreteIdentityStore,
}

impl AppState {
    /// Load config, build the backend client, and open local storage.
    ///
    /// `api_url` (from `--api-url` or `ZENY_API_URL`) overrides the
    /// configured backend.
    pub async fn init(api_url: Option<String>) -> anyhow::Result<Self> {
        let data_dir = resolve_data_dir();
        let mut config = load_client_config(&data_dir).await;
        if let Some(url) = api_url {
            config.api_base_url = url;
        }

        let api = Arc::new(HttpApiClient::new(&config)?);
        let kv = LocalKvStore::open(&data_dir).await;
        let identity = VisitorIdentityStore::new(kv, config.storage_namespace.clone());

        tracing::debug!(
            api_base_url = %api.base_url(),
            data_dir = %data_dir.display(),
            "Client state initialized"
        );

        Ok(Self {
            config,
            data_dir,
            api,
            identity,
        })
    }

    /// A fresh registry view over the backend.
    pub fn registry(&self) -> RegistryView<HttpApiClient> {
        RegistryView::new(self.api.clone())
    }

    /// A fresh conversation review surface over the backend.
    pub fn review(&self) -> ReviewSurface<HttpApiClient> {
        ReviewSurface::new(self.api.clone())
    }
}
