//! Conversation aggregate.
//!
//! A conversation is an append-only, ordered log of messages owned by one
//! user. It is only ever mutated through [`Conversation::append`].

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{
    ConversationId, DomainError, ErrorCode, Timestamp, UserId, ValidationError,
};

use super::Message;

/// Title used when a conversation is created without one.
pub const DEFAULT_TITLE: &str = "New conversation";

/// Maximum title length, in code points.
pub const MAX_TITLE_CHARS: usize = 200;

/// An ordered, append-only sequence of messages.
///
/// # Invariants
///
/// - message IDs are unique within the conversation
/// - `messages` is in append order
/// - `updated_at >= created_at`, strictly advancing on every append
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Conversation {
    id: ConversationId,
    #[serde(rename = "userId")]
    owner: UserId,
    title: String,
    messages: Vec<Message>,
    created_at: Timestamp,
    updated_at: Timestamp,
}

impl Conversation {
    /// Starts an empty conversation for `owner`.
    ///
    /// A blank title falls back to [`DEFAULT_TITLE`].
    ///
    /// # Errors
    ///
    /// - `TooLong` if the title exceeds [`MAX_TITLE_CHARS`]
    pub fn new(owner: UserId, title: Option<String>) -> Result<Self, ValidationError> {
        let title = match title.map(|t| t.trim().to_string()) {
            Some(t) if !t.is_empty() => t,
            _ => DEFAULT_TITLE.to_string(),
        };
        let chars = title.chars().count();
        if chars > MAX_TITLE_CHARS {
            return Err(ValidationError::too_long("title", MAX_TITLE_CHARS, chars));
        }

        let now = Timestamp::now();
        Ok(Self {
            id: ConversationId::new(),
            owner,
            title,
            messages: Vec::new(),
            created_at: now,
            updated_at: now,
        })
    }

    /// Appends a message to the end of the log.
    ///
    /// # Errors
    ///
    /// - `DuplicateMessage` if a message with the same ID is already present
    pub fn append(&mut self, message: Message) -> Result<(), DomainError> {
        if self.messages.iter().any(|m| m.id() == message.id()) {
            return Err(DomainError::new(
                ErrorCode::DuplicateMessage,
                "Message already appended",
            )
            .with_detail("message_id", message.id().to_string()));
        }

        self.messages.push(message);
        self.updated_at = Timestamp::now_after(&self.updated_at);
        Ok(())
    }

    /// Returns up to `n` most recent messages, oldest first.
    pub fn recent_messages(&self, n: usize) -> Vec<Message> {
        let start = self.messages.len().saturating_sub(n);
        self.messages[start..].to_vec()
    }

    pub fn id(&self) -> ConversationId {
        self.id
    }

    pub fn owner(&self) -> &UserId {
        &self.owner
    }

    pub fn is_owned_by(&self, user: &UserId) -> bool {
        &self.owner == user
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn last_message(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    pub fn updated_at(&self) -> Timestamp {
        self.updated_at
    }
}
