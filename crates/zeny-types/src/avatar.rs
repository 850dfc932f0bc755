//! Avatar personas and their training documents.
//!
//! Both are owned by the backend registry; the client reads them and
//! issues create/update/delete requests, but never invents them locally.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::id::{AvatarId, DocumentId};

/// An AI persona that visitors chat with.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Avatar {
    pub id: AvatarId,
    pub name: String,
    pub personality_description: String,
    /// Inactive avatars are rejected by the chat endpoint.
    #[serde(default = "default_active")]
    pub is_active: bool,
    /// Owning operator account (fixed to a default user by the backend today).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(
        default,
        with = "crate::timestamp::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(
        default,
        with = "crate::timestamp::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub updated_at: Option<DateTime<Utc>>,
}

fn default_active() -> bool {
    true
}

/// Request body for creating an avatar.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAvatarRequest {
    pub name: String,
    pub personality_description: String,
}

/// Partial update of an avatar. `None` fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateAvatarRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub personality_description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

impl UpdateAvatarRequest {
    /// Whether the update would change nothing.
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.personality_description.is_none() && self.is_active.is_none()
    }
}

/// A document uploaded to train an avatar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingDocument {
    pub id: DocumentId,
    pub avatar_id: AvatarId,
    pub filename: String,
    pub content_type: String,
    /// Base64-encoded file content. Listing endpoints return it too, so it
    /// can be large; front-ends should not print it.
    #[serde(default)]
    pub content_base64: String,
    #[serde(
        default,
        with = "crate::timestamp::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub uploaded_at: Option<DateTime<Utc>>,
}

/// Request body for uploading a training document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadDocumentRequest {
    pub filename: String,
    pub content_base64: String,
    pub content_type: String,
}

/// Generic `{success, message}` acknowledgement returned by delete endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Acknowledgement {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
}
