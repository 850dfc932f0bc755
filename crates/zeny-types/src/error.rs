use thiserror::Error;

use crate::id::ConversationId;

/// Errors from calls to the backend API.
///
/// The chat widget treats every variant of this enum the same way (one
/// synthesized system message); the distinction matters for logs and for
/// the dashboard's notices.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Transport(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("HTTP {status}: {detail}")]
    Status { status: u16, detail: String },

    #[error("failed to decode response: {0}")]
    Decode(String),

    #[error("backend rejected the request: {0}")]
    Rejected(String),
}

impl ApiError {
    /// Whether the backend reported that the addressed record does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::NotFound(_))
    }
}

/// Errors from the durable client-side key-value store.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StorageError {
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    #[error("query error: {0}")]
    Query(String),

    #[error("invalid stored value: {0}")]
    InvalidValue(String),
}

/// Errors from the conversation review surface.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ReviewError {
    #[error("no avatar selected")]
    NoSelection,

    #[error("conversation '{0}' is not in the current list")]
    UnknownConversation(ConversationId),

    #[error("conversation '{0}' already has a summary")]
    AlreadySummarized(ConversationId),

    #[error("conversation '{0}' is already being summarized")]
    SummaryInFlight(ConversationId),

    #[error("selection changed before the response arrived")]
    StaleSelection,

    #[error("backend returned an empty summary")]
    EmptySummary,

    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Errors from avatar/document registry operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("invalid input: {0}")]
    Validation(String),

    #[error("avatar '{0}' is not in the current list")]
    UnknownAvatar(String),

    #[error(transparent)]
    Api(#[from] ApiError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_error_display() {
        let err = ApiError::Status {
            status: 500,
            detail: "Failed to generate response".to_string(),
        };
        assert_eq!(err.to_string(), "HTTP 500: Failed to generate response");
        assert!(!err.is_not_found());
        assert!(ApiError::NotFound("Avatar not found".into()).is_not_found());
    }

    #[test]
    fn test_review_error_wraps_api_error() {
        let err: ReviewError = ApiError::Transport("connection refused".into()).into();
        assert_eq!(err.to_string(), "request failed: connection refused");
    }

    #[test]
    fn test_review_error_display_mentions_conversation() {
        let err = ReviewError::AlreadySummarized(ConversationId::new("conv-7"));
        assert!(err.to_string().contains("conv-7"));
    }
}
