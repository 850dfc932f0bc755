//! Chat messages and reviewable conversation records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use std::fmt;
use std::str::FromStr;

use crate::id::{AvatarId, ConversationId};
use crate::identity::VisitorId;

/// Author of a message in a conversation log.
///
/// `System` messages are synthesized by the client (errors, unavailability)
/// and are never sent to the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    Visitor,
    Avatar,
    System,
}

impl fmt::Display for MessageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MessageRole::Visitor => write!(f, "visitor"),
            MessageRole::Avatar => write!(f, "avatar"),
            MessageRole::System => write!(f, "system"),
        }
    }
}

impl FromStr for MessageRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "visitor" => Ok(MessageRole::Visitor),
            "avatar" => Ok(MessageRole::Avatar),
            "system" => Ok(MessageRole::System),
            other => Err(format!("invalid message role: '{other}'")),
        }
    }
}

/// A single entry in a message log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: MessageRole,
    pub content: String,
    #[serde(with = "crate::timestamp")]
    pub timestamp: DateTime<Utc>,
}

impl Message {
    pub fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn visitor(content: impl Into<String>) -> Self {
        Self::new(MessageRole::Visitor, content)
    }

    pub fn avatar(content: impl Into<String>) -> Self {
        Self::new(MessageRole::Avatar, content)
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(MessageRole::System, content)
    }
}

/// A stored conversation as returned by the backend for review.
///
/// `summary` stays `None` until summarization is explicitly requested;
/// once set, front-ends treat it as immutable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationRecord {
    pub id: ConversationId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_id: Option<AvatarId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visitor_id: Option<VisitorId>,
    #[serde(with = "crate::timestamp")]
    pub started_at: DateTime<Utc>,
    #[serde(default, with = "crate::timestamp::option")]
    pub ended_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub messages: Vec<Message>,
    #[serde(default)]
    pub summary: Option<String>,
}

impl ConversationRecord {
    pub fn has_summary(&self) -> bool {
        self.summary.is_some()
    }

    /// Render the log as `role: content` lines.
    pub fn transcript(&self) -> String {
        self.messages
            .iter()
            .map(|m| format!("{}: {}", m.role, m.content))
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Text of the first visitor message, if any, for list previews.
    pub fn opening_line(&self) -> Option<&str> {
        self.messages
            .iter()
            .find(|m| m.role == MessageRole::Visitor)
            .map(|m| m.content.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_message_role_roundtrip() {
        for role in [MessageRole::Visitor, MessageRole::Avatar, MessageRole::System] {
            let parsed: MessageRole = role.to_string().parse().unwrap();
            assert_eq!(parsed, role);
        }
        assert!("assistant".parse::<MessageRole>().is_err());
    }

    #[test]
    fn test_message_role_serde_lowercase() {
        assert_eq!(serde_json::to_string(&MessageRole::Avatar).unwrap(), "\"avatar\"");
    }

    #[test]
    fn test_conversation_record_from_backend() {
        let json = r#"{
            "id": "conv-1",
            "avatar_id": "av-1",
            "visitor_id": "visitor_abc",
            "messages": [
                {"role": "visitor", "content": "hello", "timestamp": "2025-03-01T10:00:00.000001+00:00"},
                {"role": "avatar", "content": "Hi there!", "timestamp": "2025-03-01T10:00:00.000001+00:00"}
            ],
            "started_at": "2025-03-01T09:59:58.120000",
            "ended_at": null,
            "summary": null
        }"#;
        let record: ConversationRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.id.as_str(), "conv-1");
        assert_eq!(record.messages.len(), 2);
        assert!(!record.has_summary());
        assert_eq!(record.opening_line(), Some("hello"));
        assert_eq!(record.transcript(), "visitor: hello\navatar: Hi there!");
    }

    #[test]
    fn test_conversation_record_missing_optional_fields() {
        let json = r#"{"id": "conv-2", "started_at": "2025-03-01T09:59:58Z"}"#;
        let record: ConversationRecord = serde_json::from_str(json).unwrap();
        assert!(record.messages.is_empty());
        assert!(record.ended_at.is_none());
        assert!(record.opening_line().is_none());
    }
}
