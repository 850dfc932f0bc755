//! AvatarRegistry trait definition.
//!
//! The avatar/document registry is owned by the backend. This port covers
//! the dashboard's management calls; chat only needs [`AvatarSource`].
//!
//! [`AvatarSource`]: crate::chat::backend::AvatarSource

use zeny_types::avatar::{
    Avatar, CreateAvatarRequest, TrainingDocument, UpdateAvatarRequest, UploadDocumentRequest,
};
use zeny_types::error::ApiError;
use zeny_types::id::{AvatarId, DocumentId};

/// Management operations on avatars and their training documents.
pub trait AvatarRegistry: Send + Sync {
    fn list_avatars(&self)
    -> impl std::future::Future<Output = Result<Vec<Avatar>, ApiError>> + Send;

    fn create_avatar(
        &self,
        request: &CreateAvatarRequest,
    ) -> impl std::future::Future<Output = Result<Avatar, ApiError>> + Send;

    /// Apply a partial update and return the stored avatar.
    fn update_avatar(
        &self,
        avatar_id: &AvatarId,
        request: &UpdateAvatarRequest,
    ) -> impl std::future::Future<Output = Result<Avatar, ApiError>> + Send;

    /// Delete an avatar. Returns `ApiError::NotFound` if it does not exist.
    fn delete_avatar(
        &self,
        avatar_id: &AvatarId,
    ) -> impl std::future::Future<Output = Result<(), ApiError>> + Send;

    fn list_documents(
        &self,
        avatar_id: &AvatarId,
    ) -> impl std::future::Future<Output = Result<Vec<TrainingDocument>, ApiError>> + Send;

    fn upload_document(
        &self,
        avatar_id: &AvatarId,
        request: &UploadDocumentRequest,
    ) -> impl std::future::Future<Output = Result<TrainingDocument, ApiError>> + Send;

    fn delete_document(
        &self,
        document_id: &DocumentId,
    ) -> impl std::future::Future<Output = Result<(), ApiError>> + Send;
}
