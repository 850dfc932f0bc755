//! ConversationReview trait definition.
//!
//! Read access to stored conversations plus the summarization trigger.
//! Follows the same RPITIT pattern as the chat ports.

use zeny_types::chat::ConversationRecord;
use zeny_types::error::ApiError;
use zeny_types::id::{AvatarId, ConversationId};

/// Backend operations behind the dashboard's conversation review.
///
/// Implementations live in zeny-infra (e.g., `HttpApiClient`).
pub trait ConversationReview: Send + Sync {
    /// List an avatar's conversations in backend order.
    fn list_conversations(
        &self,
        avatar_id: &AvatarId,
    ) -> impl std::future::Future<Output = Result<Vec<ConversationRecord>, ApiError>> + Send;

    /// Generate and store a summary, returning its text.
    fn summarize(
        &self,
        conversation_id: &ConversationId,
    ) -> impl std::future::Future<Output = Result<String, ApiError>> + Send;
}
