//! Outbound events pushed to connected clients.
//!
//! Encoded as `{"event": "<name>", "data": <payload>}`. Event names and
//! payload field names match what existing chat clients listen for:
//! `new-message`, `message-error`, `user-typing`.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::UserId;

use super::Message;

/// Event delivered to one or more connections.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "kebab-case")]
pub enum ChatEvent {
    /// A message was appended to a conversation the connection has joined.
    NewMessage(Message),

    /// A message sent by this connection was not accepted.
    MessageError(MessageErrorPayload),

    /// Another participant started or stopped typing.
    UserTyping(UserTypingPayload),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageErrorPayload {
    pub error: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserTypingPayload {
    pub user_id: UserId,
    pub is_typing: bool,
}

impl ChatEvent {
    pub fn message_error(error: impl Into<String>) -> Self {
        ChatEvent::MessageError(MessageErrorPayload {
            error: error.into(),
        })
    }

    pub fn user_typing(user_id: UserId, is_typing: bool) -> Self {
        ChatEvent::UserTyping(UserTypingPayload { user_id, is_typing })
    }

    /// Wire name of the event.
    pub fn name(&self) -> &'static str {
        match self {
            ChatEvent::NewMessage(_) => "new-message",
            ChatEvent::MessageError(_) => "message-error",
            ChatEvent::UserTyping(_) => "user-typing",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::conversation::MessageContent;

    #[test]
    fn new_message_uses_kebab_case_event_name() {
        let event = ChatEvent::NewMessage(Message::user(MessageContent::new("hi").unwrap()));
        let json = serde_json::to_value(&event).unwrap();

        assert_eq!(json["event"], "new-message");
        assert_eq!(json["data"]["content"], "hi");
        assert_eq!(event.name(), "new-message");
    }

    #[test]
    fn message_error_payload_shape() {
        let json = serde_json::to_value(ChatEvent::message_error("nope")).unwrap();
        assert_eq!(json, serde_json::json!({"event": "message-error", "data": {"error": "nope"}}));
    }

    #[test]
    fn user_typing_payload_shape() {
        let event = ChatEvent::user_typing(UserId::new("u1").unwrap(), true);
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"event": "user-typing", "data": {"userId": "u1", "isTyping": true}})
        );
    }
}
