//! In-Memory Conversation Store
//!
//! Keeps conversations in a map. Used for tests and the `memory` backend.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::conversation::{Conversation, Message};
use crate::domain::foundation::{ConversationId, UserId};
use crate::ports::{ConversationStore, StoreError};

/// In-memory storage for conversations
#[derive(Debug, Clone, Default)]
pub struct InMemoryConversationStore {
    conversations: Arc<RwLock<HashMap<ConversationId, Conversation>>>,
    fail_appends: Arc<AtomicBool>,
}

impl InMemoryConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every subsequent `append` fail with an IO error (for tests).
    pub fn fail_appends(&self, fail: bool) {
        self.fail_appends.store(fail, Ordering::SeqCst);
    }

    /// Inserts a conversation as-is, replacing any with the same ID.
    pub async fn insert(&self, conversation: Conversation) {
        self.conversations
            .write()
            .await
            .insert(conversation.id(), conversation);
    }

    pub async fn conversation_count(&self) -> usize {
        self.conversations.read().await.len()
    }

    pub async fn clear(&self) {
        self.conversations.write().await.clear();
    }
}

#[async_trait]
impl ConversationStore for InMemoryConversationStore {
    async fn create(
        &self,
        owner: &UserId,
        title: Option<String>,
    ) -> Result<Conversation, StoreError> {
        let conversation = Conversation::new(owner.clone(), title)
            .map_err(|e| StoreError::Invalid(e.to_string()))?;
        self.insert(conversation.clone()).await;
        Ok(conversation)
    }

    async fn load(&self, id: &ConversationId) -> Result<Conversation, StoreError> {
        self.conversations
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or(StoreError::NotFound(*id))
    }

    async fn append(
        &self,
        id: &ConversationId,
        message: &Message,
    ) -> Result<Conversation, StoreError> {
        if self.fail_appends.load(Ordering::SeqCst) {
            return Err(StoreError::IoError("append disabled".to_string()));
        }

        let mut conversations = self.conversations.write().await;
        let conversation = conversations.get_mut(id).ok_or(StoreError::NotFound(*id))?;
        conversation
            .append(message.clone())
            .map_err(|_| StoreError::DuplicateMessage {
                conversation_id: *id,
                message_id: message.id().to_string(),
            })?;
        Ok(conversation.clone())
    }

    async fn list_for_owner(&self, owner: &UserId) -> Result<Vec<Conversation>, StoreError> {
        let conversations = self.conversations.read().await;
        let mut owned: Vec<_> = conversations
            .values()
            .filter(|c| c.is_owned_by(owner))
            .cloned()
            .collect();
        owned.sort_by(|a, b| b.updated_at().cmp(&a.updated_at()));
        Ok(owned)
    }
}
