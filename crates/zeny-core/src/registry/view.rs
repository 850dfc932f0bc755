//! Dashboard view over the avatar registry.
//!
//! Keeps the last fetched avatar list, the selected avatar and its
//! documents. Local state changes only after the backend confirms a
//! mutation; nothing is applied optimistically.

use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use tracing::{debug, info};

use zeny_types::avatar::{
    Avatar, CreateAvatarRequest, TrainingDocument, UpdateAvatarRequest, UploadDocumentRequest,
};
use zeny_types::error::RegistryError;
use zeny_types::id::{AvatarId, DocumentId};

use super::repository::AvatarRegistry;

/// Fallback MIME type for unrecognized extensions.
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// Guess a document's content type from its file extension.
pub fn content_type_for(filename: &str) -> &'static str {
    let extension = Path::new(filename)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match extension.as_deref() {
        Some("txt") => "text/plain",
        Some("md" | "markdown") => "text/markdown",
        Some("csv") => "text/csv",
        Some("html" | "htm") => "text/html",
        Some("json") => "application/json",
        Some("pdf") => "application/pdf",
        Some("docx") => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        _ => DEFAULT_CONTENT_TYPE,
    }
}

#[derive(Debug, Default)]
struct RegistryState {
    avatars: Vec<Avatar>,
    selected: Option<AvatarId>,
    documents: Vec<TrainingDocument>,
}

pub struct RegistryView<R> {
    backend: Arc<R>,
    state: Mutex<RegistryState>,
}

impl<R: AvatarRegistry> RegistryView<R> {
    pub fn new(backend: Arc<R>) -> Self {
        Self {
            backend,
            state: Mutex::new(RegistryState::default()),
        }
    }

    /// Re-fetch the avatar list. A selection that no longer exists is cleared.
    pub async fn refresh_avatars(&self) -> Result<usize, RegistryError> {
        let avatars = self.backend.list_avatars().await?;

        let mut state = self.state();
        let still_listed = state
            .selected
            .as_ref()
            .is_none_or(|id| avatars.iter().any(|a| a.id == *id));
        if !still_listed {
            state.selected = None;
            state.documents.clear();
        }
        state.avatars = avatars;
        debug!(count = state.avatars.len(), "Loaded avatars");
        Ok(state.avatars.len())
    }

    pub fn avatars(&self) -> Vec<Avatar> {
        self.state().avatars.clone()
    }

    pub fn avatar(&self, avatar_id: &AvatarId) -> Option<Avatar> {
        self.state().avatars.iter().find(|a| a.id == *avatar_id).cloned()
    }

    /// Select a listed avatar and load its documents.
    pub async fn select(&self, avatar_id: &AvatarId) -> Result<usize, RegistryError> {
        {
            let mut state = self.state();
            if !state.avatars.iter().any(|a| a.id == *avatar_id) {
                return Err(RegistryError::UnknownAvatar(avatar_id.to_string()));
            }
            state.selected = Some(avatar_id.clone());
            state.documents.clear();
        }

        let documents = self.backend.list_documents(avatar_id).await?;

        let mut state = self.state();
        if state.selected.as_ref() != Some(avatar_id) {
            debug!(avatar_id = %avatar_id, "Dropping documents for a stale selection");
            return Ok(0);
        }
        state.documents = documents;
        Ok(state.documents.len())
    }

    pub fn selected(&self) -> Option<Avatar> {
        let state = self.state();
        let id = state.selected.as_ref()?;
        state.avatars.iter().find(|a| a.id == *id).cloned()
    }

    pub fn documents(&self) -> Vec<TrainingDocument> {
        self.state().documents.clone()
    }

    pub async fn create_avatar(
        &self,
        name: &str,
        personality_description: &str,
    ) -> Result<Avatar, RegistryError> {
        let request = CreateAvatarRequest {
            name: required("name", name)?,
            personality_description: required("personality", personality_description)?,
        };

        let avatar = self.backend.create_avatar(&request).await?;
        info!(avatar_id = %avatar.id, name = %avatar.name, "Created avatar");
        self.state().avatars.push(avatar.clone());
        Ok(avatar)
    }

    pub async fn update_avatar(
        &self,
        avatar_id: &AvatarId,
        mut request: UpdateAvatarRequest,
    ) -> Result<Avatar, RegistryError> {
        if request.is_empty() {
            return Err(RegistryError::Validation("nothing to update".to_string()));
        }
        if let Some(name) = request.name.take() {
            request.name = Some(required("name", &name)?);
        }
        if let Some(personality) = request.personality_description.take() {
            request.personality_description = Some(required("personality", &personality)?);
        }

        let updated = self.backend.update_avatar(avatar_id, &request).await?;
        info!(avatar_id = %updated.id, "Updated avatar");

        let mut state = self.state();
        match state.avatars.iter_mut().find(|a| a.id == updated.id) {
            Some(slot) => *slot = updated.clone(),
            None => state.avatars.push(updated.clone()),
        }
        Ok(updated)
    }

    pub async fn delete_avatar(&self, avatar_id: &AvatarId) -> Result<(), RegistryError> {
        self.backend.delete_avatar(avatar_id).await?;
        info!(avatar_id = %avatar_id, "Deleted avatar");

        let mut state = self.state();
        state.avatars.retain(|a| a.id != *avatar_id);
        if state.selected.as_ref() == Some(avatar_id) {
            state.selected = None;
            state.documents.clear();
        }
        Ok(())
    }

    /// Upload a training document for the selected avatar.
    pub async fn upload_document(
        &self,
        filename: &str,
        content: &[u8],
    ) -> Result<TrainingDocument, RegistryError> {
        let avatar_id = self
            .state()
            .selected
            .clone()
            .ok_or_else(|| RegistryError::Validation("no avatar selected".to_string()))?;
        let filename = required("filename", filename)?;
        if content.is_empty() {
            return Err(RegistryError::Validation(format!("{filename} is empty")));
        }

        let request = UploadDocumentRequest {
            content_type: content_type_for(&filename).to_string(),
            content_base64: STANDARD.encode(content),
            filename,
        };
        let document = self.backend.upload_document(&avatar_id, &request).await?;
        info!(
            avatar_id = %avatar_id,
            document_id = %document.id,
            filename = %document.filename,
            "Uploaded training document"
        );

        let mut state = self.state();
        if state.selected.as_ref() == Some(&avatar_id) {
            state.documents.push(document.clone());
        }
        Ok(document)
    }

    pub async fn delete_document(&self, document_id: &DocumentId) -> Result<(), RegistryError> {
        self.backend.delete_document(document_id).await?;
        info!(document_id = %document_id, "Deleted training document");
        self.state().documents.retain(|d| d.id != *document_id);
        Ok(())
    }

    fn state(&self) -> MutexGuard<'_, RegistryState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

fn required(field: &str, value: &str) -> Result<String, RegistryError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(RegistryError::Validation(format!("{field} must not be empty")));
    }
    Ok(trimmed.to_string())
}
