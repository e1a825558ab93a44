//! HTTP DTOs for conversation endpoints.

use serde::{Deserialize, Serialize};

use crate::domain::conversation::{Conversation, Message};

// ════════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// Body of `POST /api/conversations`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateConversationRequest {
    #[serde(default)]
    pub title: Option<String>,
}

// ════════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// Conversation without its message log, for listings.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationSummary {
    pub id: String,
    pub title: String,
    pub user_id: String,
    pub message_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_message: Option<Message>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<&Conversation> for ConversationSummary {
    fn from(conversation: &Conversation) -> Self {
        Self {
            id: conversation.id().to_string(),
            title: conversation.title().to_string(),
            user_id: conversation.owner().to_string(),
            message_count: conversation.messages().len(),
            last_message: conversation.last_message().cloned(),
            created_at: conversation.created_at().to_string(),
            updated_at: conversation.updated_at().to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ConversationListResponse {
    pub conversations: Vec<ConversationSummary>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::conversation::MessageContent;
    use crate::domain::foundation::UserId;

    #[test]
    fn create_request_title_is_optional() {
        let req: CreateConversationRequest = serde_json::from_str("{}").unwrap();
        assert!(req.title.is_none());

        let req: CreateConversationRequest = serde_json::from_str(r#"{"title":"Trip"}"#).unwrap();
        assert_eq!(req.title.as_deref(), Some("Trip"));
    }

    #[test]
    fn summary_carries_count_and_last_message() {
        let mut conversation = Conversation::new(UserId::new("u").unwrap(), None).unwrap();
        conversation
            .append(Message::user(MessageContent::new("first").unwrap()))
            .unwrap();
        conversation
            .append(Message::user(MessageContent::new("second").unwrap()))
            .unwrap();

        let json = serde_json::to_value(ConversationSummary::from(&conversation)).unwrap();
        assert_eq!(json["messageCount"], 2);
        assert_eq!(json["lastMessage"]["content"], "second");
        assert_eq!(json["userId"], "u");
    }

    #[test]
    fn empty_conversation_summary_omits_last_message() {
        let conversation = Conversation::new(UserId::new("u").unwrap(), None).unwrap();
        let json = serde_json::to_value(ConversationSummary::from(&conversation)).unwrap();
        assert!(json.get("lastMessage").is_none());
    }
}
