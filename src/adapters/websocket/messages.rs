//! WebSocket message types for the chat protocol.
//!
//! Frames are JSON text of the form `{"event": "<name>", "data": <payload>}`.
//! Client → Server events are decoded into [`ClientEvent`]; Server → Client
//! events are [`ChatEvent`](crate::domain::conversation::ChatEvent).

use serde::{Deserialize, Serialize};

// ============================================
// Client → Server Messages
// ============================================

/// All events a client may send.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum ClientEvent {
    /// Subscribe to a conversation's room. Payload is the conversation ID.
    JoinConversation(String),

    /// Post a message to a conversation.
    SendMessage(SendMessagePayload),

    /// Typing indicator; relayed, never stored.
    Typing(TypingPayload),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendMessagePayload {
    pub conversation_id: String,
    pub message: String,
    /// Client-asserted sender; the authenticated identity takes precedence.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypingPayload {
    pub conversation_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    pub is_typing: bool,
}

impl ClientEvent {
    /// Decodes one text frame.
    pub fn parse(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    pub fn name(&self) -> &'static str {
        match self {
            ClientEvent::JoinConversation(_) => "join-conversation",
            ClientEvent::SendMessage(_) => "send-message",
            ClientEvent::Typing(_) => "typing",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn join_conversation_data_is_a_plain_string() {
        let event = ClientEvent::parse(r#"{"event":"join-conversation","data":"abc"}"#).unwrap();
        assert_eq!(event, ClientEvent::JoinConversation("abc".to_string()));
        assert_eq!(event.name(), "join-conversation");
    }

    #[test]
    fn send_message_decodes_camel_case_fields() {
        let event = ClientEvent::parse(
            r#"{"event":"send-message","data":{"conversationId":"c1","message":"hi","userId":"u1"}}"#,
        )
        .unwrap();

        assert_eq!(
            event,
            ClientEvent::SendMessage(SendMessagePayload {
                conversation_id: "c1".to_string(),
                message: "hi".to_string(),
                user_id: Some("u1".to_string()),
            })
        );
    }

    #[test]
    fn send_message_user_id_is_optional() {
        let event = ClientEvent::parse(
            r#"{"event":"send-message","data":{"conversationId":"c1","message":"hi"}}"#,
        )
        .unwrap();
        assert!(matches!(event, ClientEvent::SendMessage(p) if p.user_id.is_none()));
    }

    #[test]
    fn typing_decodes() {
        let event = ClientEvent::parse(
            r#"{"event":"typing","data":{"conversationId":"c1","userId":"u1","isTyping":true}}"#,
        )
        .unwrap();
        assert!(matches!(event, ClientEvent::Typing(p) if p.is_typing && p.conversation_id == "c1"));
    }

    #[test]
    fn unknown_event_is_an_error() {
        assert!(ClientEvent::parse(r#"{"event":"delete-everything","data":{}}"#).is_err());
        assert!(ClientEvent::parse("not json").is_err());
    }
}
