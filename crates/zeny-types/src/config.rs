//! Client configuration types.
//!
//! `ClientConfig` represents `config.toml` in the client data directory.
//! All fields have sensible defaults so an empty or missing file is valid.

use serde::{Deserialize, Serialize};

/// Backend the client talks to when nothing else is configured.
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8001/api";

/// Namespace of the durable key-value entries written by the chat widget.
pub const DEFAULT_STORAGE_NAMESPACE: &str = "zeny.widget";

/// Top-level client configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Base URL of the backend API, including the `/api` prefix.
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Per-request timeout. Chat turns wait on language generation, so this
    /// is generous.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Namespace under which the visitor identity is stored.
    #[serde(default = "default_storage_namespace")]
    pub storage_namespace: String,
}

fn default_api_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_storage_namespace() -> String {
    DEFAULT_STORAGE_NAMESPACE.to_string()
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            request_timeout_secs: default_request_timeout_secs(),
            storage_namespace: default_storage_namespace(),
        }
    }
}
