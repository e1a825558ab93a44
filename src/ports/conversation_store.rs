//! Conversation store port.
//!
//! Durable access to conversation records. The store must support concurrent
//! calls for different conversation IDs; atomicity of read-modify-write on a
//! single ID is the session's job, not the store's.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::conversation::{Conversation, Message};
use crate::domain::foundation::{ConversationId, UserId};

/// Errors surfaced by a conversation store.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum StoreError {
    #[error("Conversation not found: {0}")]
    NotFound(ConversationId),

    #[error("Message {message_id} already present in conversation {conversation_id}")]
    DuplicateMessage {
        conversation_id: ConversationId,
        message_id: String,
    },

    #[error("Invalid conversation: {0}")]
    Invalid(String),

    #[error("Failed to serialize conversation: {0}")]
    SerializationFailed(String),

    #[error("IO error: {0}")]
    IoError(String),
}

impl StoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound(_))
    }
}

/// Port for loading and appending to conversations.
#[async_trait]
pub trait ConversationStore: Send + Sync {
    /// Creates and persists an empty conversation for `owner`.
    ///
    /// # Errors
    ///
    /// - `Invalid` if the title is too long
    async fn create(
        &self,
        owner: &UserId,
        title: Option<String>,
    ) -> Result<Conversation, StoreError>;

    /// Loads a conversation with its full message log.
    ///
    /// # Errors
    ///
    /// - `NotFound` if no conversation has this ID
    async fn load(&self, id: &ConversationId) -> Result<Conversation, StoreError>;

    /// Appends `message` and returns the updated conversation.
    ///
    /// # Errors
    ///
    /// - `NotFound` if no conversation has this ID
    /// - `DuplicateMessage` if the message ID is already present
    /// - `IoError` / `SerializationFailed` on persistence failure
    async fn append(
        &self,
        id: &ConversationId,
        message: &Message,
    ) -> Result<Conversation, StoreError>;

    /// Lists conversations owned by `owner`, most recently updated first.
    async fn list_for_owner(&self, owner: &UserId) -> Result<Vec<Conversation>, StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn conversation_store_is_object_safe() {
        fn _accepts_dyn(_store: &dyn ConversationStore) {}
    }

    #[test]
    fn not_found_helper() {
        assert!(StoreError::NotFound(ConversationId::new()).is_not_found());
        assert!(!StoreError::IoError("disk".to_string()).is_not_found());
    }
}
