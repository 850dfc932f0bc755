//! Wire types for the chat turn and summarization endpoints.

use serde::{Deserialize, Serialize};

use crate::id::{AvatarId, ConversationId};
use crate::identity::VisitorId;

/// Body of `POST /chat/avatar`.
///
/// `conversation_id` is serialized as `null` on the first turn so the
/// backend opens a new thread; later turns carry the adopted id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SendTurnRequest {
    pub avatar_id: AvatarId,
    pub visitor_id: VisitorId,
    pub message: String,
    pub conversation_id: Option<ConversationId>,
}

/// Raw response of `POST /chat/avatar`.
///
/// All fields are optional on the wire so that a body lacking the success
/// indicator decodes and can be rejected explicitly.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SendTurnResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub conversation_id: Option<ConversationId>,
    #[serde(default)]
    pub response: Option<String>,
}

/// A validated avatar reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnReply {
    pub response_text: String,
    pub conversation_id: ConversationId,
}

/// Raw response of `POST /conversations/{id}/summarize`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SummaryResponse {
    #[serde(default = "default_true")]
    pub success: bool,
    #[serde(default)]
    pub summary: Option<String>,
}

fn default_true() -> bool {
    true
}

/// FastAPI-style error envelope (`{"detail": "..."}`).
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorBody {
    pub detail: serde_json::Value,
}

impl ErrorBody {
    /// Human-readable detail; validation errors arrive as arrays.
    pub fn detail_text(&self) -> String {
        match &self.detail {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

/// Response of the health endpoint `GET /`.
#[derive(Debug, Clone, Deserialize)]
pub struct HealthResponse {
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_turn_sends_null_conversation() {
        let req = SendTurnRequest {
            avatar_id: AvatarId::new("av-1"),
            visitor_id: VisitorId("visitor_x".to_string()),
            message: "hello".to_string(),
            conversation_id: None,
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["conversation_id"], serde_json::Value::Null);
        assert_eq!(json["avatar_id"], "av-1");
        assert_eq!(json["visitor_id"], "visitor_x");
    }

    #[test]
    fn test_response_without_success_decodes_as_failure() {
        let resp: SendTurnResponse = serde_json::from_str(r#"{"response": "hi"}"#).unwrap();
        assert!(!resp.success);
    }

    #[test]
    fn test_error_body_detail_text() {
        let body: ErrorBody = serde_json::from_str(r#"{"detail": "Avatar not found"}"#).unwrap();
        assert_eq!(body.detail_text(), "Avatar not found");

        let body: ErrorBody = serde_json::from_str(r#"{"detail": [{"msg": "field required"}]}"#).unwrap();
        assert!(body.detail_text().contains("field required"));
    }
}
